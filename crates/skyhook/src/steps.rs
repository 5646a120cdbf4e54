//! Step grammar for `skyhook run --steps`.
//!
//! A step is `name` or `name:argument`. Simulator steps change the world,
//! screen steps become `ScreenAction`s, `wait` only lets time pass.

use std::str::FromStr;
use std::time::Duration;

use skyhook_core::{ScreenAction, ScreenKind};
use skyhook_sdk::DroneModel;
use skyhook_sdk::model::{CameraMode, ThermalMode, WhiteBalanceMode};

use crate::error::CliError;

/// Changes applied to the simulated world, outside any screen.
#[derive(Debug, Clone, PartialEq)]
pub enum SimStep {
    /// Default drone from the profile, or a fresh one of the given model.
    ConnectDrone(Option<DroneModel>),
    DisconnectDrone,
    RemoveDrone,
    ConnectRemote,
    DisconnectRemote,
    RemoveRemote,
    DroneBattery(u8),
    RemoteBattery(u8),
    Piloting(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Sim(SimStep),
    Action(ScreenAction),
    /// Relative seek by the profile's seek step.
    Nudge { forward: bool },
    Wait(Duration),
}

/// One documented step, for `skyhook screens`.
pub struct StepHelp {
    pub syntax: &'static str,
    pub about: &'static str,
}

const fn help(syntax: &'static str, about: &'static str) -> StepHelp {
    StepHelp { syntax, about }
}

pub const SIM_STEPS: &[StepHelp] = &[
    help("connect-drone[:MODEL]", "connect the profile drone, or one of MODEL"),
    help("disconnect-drone", "disconnect the drone, keep it selected"),
    help("remove-drone", "disconnect the drone and clear the selection"),
    help("connect-remote", "connect the profile remote control"),
    help("disconnect-remote", "disconnect the remote control"),
    help("remove-remote", "disconnect the remote and clear the selection"),
    help("battery:N", "set the drone battery level"),
    help("remote-battery:N", "set the remote battery level"),
    help("piloting:on|off", "make manual piloting available or not"),
    help("wait:DURATION", "let time pass (e.g. 500ms, 2s)"),
];

/// Screen steps accepted by `kind`.
pub fn screen_steps(kind: ScreenKind) -> &'static [StepHelp] {
    match kind {
        ScreenKind::HelloDrone => const { &[help("take-off-land", "press the take off / land button")] },
        ScreenKind::Camera => const {
            &[
                help("capture", "press the capture button"),
                help("mode:MODE", "pick a camera mode (photo, recording)"),
                help("wb:MODE", "pick a white balance mode"),
            ]
        },
        ScreenKind::Thermal => const {
            &[
                help("thermal-mode:MODE", "pick a thermal mode"),
                help("palette", "cycle to the next palette preset"),
                help("stream", "press the live stream play / pause button"),
            ]
        },
        ScreenKind::Replay => const {
            &[
                help("open:SOURCE", "open a local media file"),
                help("close", "close the open file"),
                help("play", "press the play / pause button"),
                help("seek:DURATION", "seek to an absolute position"),
                help("seek-by:SECS", "seek relative to the position, negative goes back"),
                help("forward", "seek forward by the profile seek step"),
                help("back", "seek back by the profile seek step"),
            ]
        },
    }
}

fn invalid(step: &str, reason: impl Into<String>) -> CliError {
    CliError::InvalidStep {
        step: step.to_owned(),
        reason: reason.into(),
    }
}

fn required<'a>(step: &str, arg: Option<&'a str>, what: &str) -> Result<&'a str, CliError> {
    match arg {
        Some(arg) if !arg.is_empty() => Ok(arg),
        _ => Err(invalid(step, format!("expects {what}"))),
    }
}

fn parse_arg<T: FromStr>(step: &str, arg: Option<&str>, what: &str) -> Result<T, CliError> {
    let arg = required(step, arg, what)?;
    arg.parse()
        .map_err(|_| invalid(step, format!("'{arg}' is not {what}")))
}

fn parse_level(step: &str, arg: Option<&str>) -> Result<u8, CliError> {
    let level: u8 = parse_arg(step, arg, "a battery level")?;
    if level > 100 {
        return Err(invalid(step, "battery level is above 100"));
    }
    Ok(level)
}

/// Bare seconds, or a humantime duration.
fn parse_duration(step: &str, arg: Option<&str>) -> Result<Duration, CliError> {
    let arg = required(step, arg, "a duration")?;
    if let Ok(secs) = arg.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(arg).map_err(|e| invalid(step, e.to_string()))
}

impl FromStr for Step {
    type Err = CliError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let (name, arg) = match raw.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (raw, None),
        };

        let step = match name {
            // ── Simulator ──
            "connect-drone" => Step::Sim(SimStep::ConnectDrone(match arg {
                Some(_) => Some(parse_arg(raw, arg, "a drone model")?),
                None => None,
            })),
            "disconnect-drone" => Step::Sim(SimStep::DisconnectDrone),
            "remove-drone" => Step::Sim(SimStep::RemoveDrone),
            "connect-remote" => Step::Sim(SimStep::ConnectRemote),
            "disconnect-remote" => Step::Sim(SimStep::DisconnectRemote),
            "remove-remote" => Step::Sim(SimStep::RemoveRemote),
            "battery" => Step::Sim(SimStep::DroneBattery(parse_level(raw, arg)?)),
            "remote-battery" => Step::Sim(SimStep::RemoteBattery(parse_level(raw, arg)?)),
            "piloting" => Step::Sim(SimStep::Piloting(match required(raw, arg, "on or off")? {
                "on" => true,
                "off" => false,
                other => return Err(invalid(raw, format!("'{other}' is not on or off"))),
            })),
            "wait" => Step::Wait(parse_duration(raw, arg)?),

            // ── Screens ──
            "take-off-land" => Step::Action(ScreenAction::TakeOffOrLand),
            "capture" => Step::Action(ScreenAction::Capture),
            "mode" => Step::Action(ScreenAction::SetCameraMode(parse_arg::<CameraMode>(
                raw,
                arg,
                "a camera mode",
            )?)),
            "wb" => Step::Action(ScreenAction::SetWhiteBalance(
                parse_arg::<WhiteBalanceMode>(raw, arg, "a white balance mode")?,
            )),
            "thermal-mode" => Step::Action(ScreenAction::SetThermalMode(
                parse_arg::<ThermalMode>(raw, arg, "a thermal mode")?,
            )),
            "palette" => Step::Action(ScreenAction::NextPalette),
            "stream" => Step::Action(ScreenAction::ToggleStream),
            "open" => Step::Action(ScreenAction::OpenReplay(
                required(raw, arg, "a media source")?.to_owned(),
            )),
            "close" => Step::Action(ScreenAction::CloseReplay),
            "play" => Step::Action(ScreenAction::TogglePlayback),
            "seek" => Step::Action(ScreenAction::SeekTo(parse_duration(raw, arg)?)),
            "seek-by" => Step::Action(ScreenAction::SeekBy(parse_arg(raw, arg, "a number of seconds")?)),
            "forward" => Step::Nudge { forward: true },
            "back" => Step::Nudge { forward: false },

            other => return Err(invalid(raw, format!("unknown step '{other}'"))),
        };
        Ok(step)
    }
}

/// Parse every step up front so a typo fails before anything runs.
pub fn parse_steps(raw: &[String]) -> Result<Vec<(String, Step)>, CliError> {
    raw.iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| Ok((s.to_owned(), s.parse()?)))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(raw: &str) -> Step {
        raw.parse().unwrap()
    }

    #[test]
    fn simulator_steps() {
        assert_eq!(parse("connect-drone"), Step::Sim(SimStep::ConnectDrone(None)));
        assert_eq!(
            parse("connect-drone:voyager"),
            Step::Sim(SimStep::ConnectDrone(Some(DroneModel::Voyager)))
        );
        assert_eq!(parse("battery:15"), Step::Sim(SimStep::DroneBattery(15)));
        assert_eq!(parse("piloting:off"), Step::Sim(SimStep::Piloting(false)));
        assert_eq!(parse("wait:250ms"), Step::Wait(Duration::from_millis(250)));
    }

    #[test]
    fn screen_steps_become_actions() {
        assert_eq!(
            parse("wb:cloudy"),
            Step::Action(ScreenAction::SetWhiteBalance(WhiteBalanceMode::Cloudy))
        );
        assert_eq!(
            parse("thermal-mode:blended"),
            Step::Action(ScreenAction::SetThermalMode(ThermalMode::Blended))
        );
        assert_eq!(
            parse("open:clips/flight.mp4"),
            Step::Action(ScreenAction::OpenReplay("clips/flight.mp4".into()))
        );
        assert_eq!(parse("seek:90"), Step::Action(ScreenAction::SeekTo(Duration::from_secs(90))));
        assert_eq!(parse("seek:1m30s"), Step::Action(ScreenAction::SeekTo(Duration::from_secs(90))));
        assert_eq!(parse("seek-by:-10"), Step::Action(ScreenAction::SeekBy(-10)));
        assert_eq!(parse("back"), Step::Nudge { forward: false });
    }

    #[test]
    fn bad_steps_are_rejected_with_the_step() {
        for raw in ["fly", "battery:150", "battery", "mode:panorama", "open:", "piloting:maybe"] {
            match raw.parse::<Step>().unwrap_err() {
                CliError::InvalidStep { step, .. } => assert_eq!(step, raw),
                other => panic!("unexpected error for {raw}: {other}"),
            }
        }
    }

    #[test]
    fn blank_entries_are_skipped() {
        let raw = vec!["capture".to_owned(), " ".to_owned(), "mode:recording".to_owned()];
        let steps = parse_steps(&raw).unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].0, "mode:recording");
    }
}
