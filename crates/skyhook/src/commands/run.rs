//! `skyhook run`: open a screen on a fresh simulator, apply steps, and
//! print the view after each one.

use std::time::Duration;

use serde::Serialize;
use tabled::Tabled;
use tracing::{debug, warn};

use skyhook_core::projection::ViewRow;
use skyhook_core::{ActiveScreen, Outcome, ScreenAction, ScreenConfig, ScreenKind, ScreenView};
use skyhook_sdk::{Entity, GroundSdk, SimController, Uid};

use crate::cli::{GlobalOpts, OutputFormat, RunArgs, ScreenArg};
use crate::config;
use crate::error::CliError;
use crate::output;
use crate::steps::{SimStep, Step, parse_steps};

pub fn screen_kind(arg: ScreenArg) -> ScreenKind {
    match arg {
        ScreenArg::HelloDrone => ScreenKind::HelloDrone,
        ScreenArg::Camera => ScreenKind::Camera,
        ScreenArg::Thermal => ScreenKind::Thermal,
        ScreenArg::Replay => ScreenKind::Replay,
    }
}

/// The view after one step.
#[derive(Debug, Serialize)]
pub struct Frame {
    pub step: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    pub view: ScreenView,
}

#[derive(Tabled)]
struct RowDisplay {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

impl From<ViewRow> for RowDisplay {
    fn from(row: ViewRow) -> Self {
        Self {
            field: row.field,
            value: row.value,
        }
    }
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Sent { command } => format!("sent {}", command.name()),
        Outcome::Opened { uid } => format!("opened {uid}"),
        Outcome::Closed { uid } => format!("closed {uid}"),
        Outcome::Skipped { what } => format!("skipped: {what} unsupported"),
        Outcome::Unavailable => "unavailable".into(),
    }
}

// ── Simulator steps ─────────────────────────────────────────────────

fn current_uid(sim: &SimController, remote: bool) -> Option<Uid> {
    if remote {
        sim.remote().map(|remote| remote.uid().clone())
    } else {
        sim.drone().map(|drone| drone.uid().clone())
    }
}

fn apply_sim(sim: &SimController, step: &SimStep) {
    let applied = match step {
        SimStep::ConnectDrone(None) => {
            sim.connect_default_drone();
            true
        }
        SimStep::ConnectDrone(Some(model)) => {
            sim.connect_drone(&format!("{model}-1"), &model.to_string(), *model);
            true
        }
        SimStep::DisconnectDrone => sim.disconnect_drone(),
        SimStep::RemoveDrone => sim.remove_drone(),
        SimStep::ConnectRemote => {
            sim.connect_default_remote();
            true
        }
        SimStep::DisconnectRemote => sim.disconnect_remote(),
        SimStep::RemoveRemote => sim.remove_remote(),
        SimStep::DroneBattery(level) => {
            current_uid(sim, false).is_some_and(|uid| sim.set_battery(&uid, *level))
        }
        SimStep::RemoteBattery(level) => {
            current_uid(sim, true).is_some_and(|uid| sim.set_battery(&uid, *level))
        }
        SimStep::Piloting(available) => current_uid(sim, false)
            .is_some_and(|uid| sim.set_piloting_available(&uid, *available)),
    };
    if !applied {
        warn!(?step, "simulator step had nothing to act on");
    }
}

// ── Runner ──────────────────────────────────────────────────────────

async fn settle(screen: &ActiveScreen, delay: Duration) -> Result<(), CliError> {
    tokio::time::sleep(delay).await;
    screen.flush().await?;
    Ok(())
}

/// Run `steps` on a fresh simulator and collect one frame per step, plus
/// the frame right after opening.
pub async fn run_steps(
    kind: ScreenKind,
    sdk: &GroundSdk,
    sim: &SimController,
    screen_config: &ScreenConfig,
    steps: Vec<(String, Step)>,
    delay: Duration,
) -> Result<Vec<Frame>, CliError> {
    let screen = ActiveScreen::open(kind, sdk, screen_config).await?;
    settle(&screen, delay).await?;

    let mut frames = vec![Frame {
        step: "open".into(),
        outcome: None,
        view: screen.current(),
    }];

    for (raw, step) in steps {
        debug!(step = %raw, "applying step");
        let outcome = match step {
            Step::Sim(step) => {
                apply_sim(sim, &step);
                None
            }
            Step::Action(action) => Some(perform(&screen, action).await?),
            Step::Nudge { forward } => {
                let secs = screen_config.seek_step_secs();
                let delta = if forward { secs } else { -secs };
                Some(perform(&screen, ScreenAction::SeekBy(delta)).await?)
            }
            Step::Wait(duration) => {
                tokio::time::sleep(duration).await;
                None
            }
        };
        settle(&screen, delay).await?;
        frames.push(Frame {
            step: raw,
            outcome,
            view: screen.current(),
        });
    }

    screen.close().await?;
    Ok(frames)
}

async fn perform(screen: &ActiveScreen, action: ScreenAction) -> Result<Outcome, CliError> {
    let outcome = screen.perform(action).await?;
    debug!(outcome = %describe(&outcome), "step performed");
    Ok(outcome)
}

// ── Rendering ───────────────────────────────────────────────────────

fn render_frames(frames: &[Frame], global: &GlobalOpts) -> Result<String, CliError> {
    let color = output::should_color(global.color);
    match global.output {
        OutputFormat::Table => Ok(frames
            .iter()
            .map(|frame| {
                let title = match &frame.outcome {
                    Some(outcome) => format!("── {} ({}) ──", frame.step, describe(outcome)),
                    None => format!("── {} ──", frame.step),
                };
                let rows: Vec<RowDisplay> =
                    frame.view.rows().into_iter().map(RowDisplay::from).collect();
                format!("{}\n{}", output::heading(&title, color), output::render_table(&rows))
            })
            .collect::<Vec<_>>()
            .join("\n\n")),
        OutputFormat::Plain => Ok(frames
            .last()
            .map(|frame| {
                frame
                    .view
                    .rows()
                    .iter()
                    .map(|row| format!("{}={}", row.field, row.value))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default()),
        format => output::render_single(format, &frames, |_| String::new(), |_| String::new()),
    }
}

pub async fn handle(args: RunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let delay = humantime::parse_duration(&args.settle).map_err(|e| CliError::Validation {
        field: "settle".into(),
        reason: e.to_string(),
    })?;
    let steps = parse_steps(&args.steps)?;
    let (profile, sim_config, screen_config) = config::resolve(global)?;
    let kind = screen_kind(args.screen);
    debug!(%profile, screen = %kind, steps = steps.len(), "starting run");

    let (sdk, sim) = GroundSdk::simulated(sim_config);
    let result = run_steps(kind, &sdk, &sim, &screen_config, steps, delay).await;
    sdk.close();

    let mut frames = result?;
    if args.last {
        frames.drain(..frames.len().saturating_sub(1));
    }
    let out = render_frames(&frames, global)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use skyhook_sdk::SimConfig;

    use super::*;

    const DELAY: Duration = Duration::from_millis(40);

    async fn run(kind: ScreenKind, raw: &[&str]) -> Vec<Frame> {
        let raw: Vec<String> = raw.iter().map(|s| (*s).to_owned()).collect();
        let (sdk, sim) = GroundSdk::simulated(SimConfig::default());
        let frames = run_steps(
            kind,
            &sdk,
            &sim,
            &ScreenConfig::default(),
            parse_steps(&raw).unwrap(),
            DELAY,
        )
        .await
        .unwrap();
        sdk.close();
        frames
    }

    fn row(frame: &Frame, field: &str) -> String {
        frame
            .view
            .rows()
            .into_iter()
            .find(|row| row.field == field)
            .map(|row| row.value)
            .unwrap()
    }

    #[tokio::test]
    async fn hello_drone_script() {
        let frames = run(ScreenKind::HelloDrone, &["take-off-land", "battery:30", "remove-drone"]).await;

        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0].step, "open");
        assert_eq!(row(&frames[0], "drone state"), "connected");
        assert!(matches!(frames[1].outcome, Some(Outcome::Sent { .. })));
        assert_eq!(row(&frames[2], "drone battery"), "30%");
        assert_eq!(row(&frames[3], "drone state"), "");
        assert_eq!(row(&frames[3], "remote state"), "connected");
    }

    #[tokio::test]
    async fn unsupported_step_fails_the_run() {
        let raw = vec!["palette".to_owned()];
        let (sdk, sim) = GroundSdk::simulated(SimConfig::default());
        let result = run_steps(
            ScreenKind::HelloDrone,
            &sdk,
            &sim,
            &ScreenConfig::default(),
            parse_steps(&raw).unwrap(),
            DELAY,
        )
        .await;
        assert!(matches!(result, Err(CliError::UnsupportedStep { .. })));
    }

    #[tokio::test]
    async fn replay_nudges_use_the_seek_step() {
        let frames = run(ScreenKind::Replay, &["open:flight.mp4", "forward", "forward", "back"]).await;
        let last = frames.last().unwrap();
        assert_eq!(row(last, "position"), "00:05 / 01:00");
    }
}
