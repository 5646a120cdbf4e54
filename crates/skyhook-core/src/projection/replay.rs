use std::time::Duration;

use serde::Serialize;
use skyhook_sdk::Command;
use skyhook_sdk::model::{PlaybackState, ReplayStream};

use super::{ABSENT, ButtonView, ViewRow, ViewRows, button_row};

#[derive(Debug, Clone, Default)]
pub struct ReplayInputs {
    pub stream: Option<ReplayStream>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayView {
    pub source: String,
    pub state: String,
    pub position: String,
    pub play_pause: ButtonView,
    pub seek_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlaybackAction {
    Play,
    Pause,
}

impl PlaybackAction {
    pub fn command(self) -> Command {
        match self {
            Self::Play => Command::Play,
            Self::Pause => Command::Pause,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Play => "Play",
            Self::Pause => "Pause",
        }
    }
}

impl ReplayInputs {
    pub fn playback_action(&self) -> Option<PlaybackAction> {
        self.stream.as_ref().map(|stream| match stream.state {
            PlaybackState::Playing => PlaybackAction::Pause,
            PlaybackState::Paused | PlaybackState::Stopped => PlaybackAction::Play,
        })
    }
}

/// `mm:ss`, minutes not wrapped at the hour.
pub fn format_clock(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Position `delta_secs` away from the current one, clamped to the stream.
pub fn seek_target(stream: &ReplayStream, delta_secs: i64) -> Duration {
    let delta = Duration::from_secs(delta_secs.unsigned_abs());
    let target = if delta_secs >= 0 {
        stream.position.saturating_add(delta)
    } else {
        stream.position.saturating_sub(delta)
    };
    target.min(stream.duration)
}

pub fn project(inputs: &ReplayInputs) -> ReplayView {
    let Some(stream) = &inputs.stream else {
        return ReplayView {
            source: ABSENT.to_owned(),
            state: ABSENT.to_owned(),
            position: ABSENT.to_owned(),
            play_pause: ButtonView::disabled(PlaybackAction::Play.label()),
            seek_enabled: false,
        };
    };

    let play_pause = inputs.playback_action().map_or_else(
        || ButtonView::disabled(PlaybackAction::Play.label()),
        |action| ButtonView::enabled(action.label()),
    );
    ReplayView {
        source: stream.source.clone(),
        state: stream.state.to_string(),
        position: format!(
            "{} / {}",
            format_clock(stream.position),
            format_clock(stream.duration)
        ),
        play_pause,
        seek_enabled: !stream.duration.is_zero(),
    }
}

impl ViewRows for ReplayView {
    fn rows(&self) -> Vec<ViewRow> {
        vec![
            ViewRow::new("source", &self.source),
            ViewRow::new("state", &self.state),
            ViewRow::new("position", &self.position),
            button_row("play / pause", &self.play_pause),
            ViewRow::new("seek", if self.seek_enabled { "enabled" } else { "disabled" }),
        ]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn stream(state: PlaybackState, position: u64) -> ReplayStream {
        ReplayStream {
            source: "flight.mp4".into(),
            state,
            position: Duration::from_secs(position),
            duration: Duration::from_secs(90),
        }
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(Duration::from_secs(0)), "00:00");
        assert_eq!(format_clock(Duration::from_millis(61_900)), "01:01");
        assert_eq!(format_clock(Duration::from_secs(3725)), "62:05");
    }

    #[test]
    fn seek_is_clamped_both_ways() {
        let s = stream(PlaybackState::Paused, 10);
        assert_eq!(seek_target(&s, 5), Duration::from_secs(15));
        assert_eq!(seek_target(&s, -30), Duration::ZERO);
        assert_eq!(seek_target(&s, 600), Duration::from_secs(90));
    }

    #[test]
    fn playing_stream_offers_pause() {
        let view = project(&ReplayInputs {
            stream: Some(stream(PlaybackState::Playing, 30)),
        });
        assert_eq!(view.play_pause, ButtonView::enabled("Pause"));
        assert_eq!(view.position, "00:30 / 01:30");
        assert_eq!(view.state, "playing");
        assert!(view.seek_enabled);
    }

    #[test]
    fn absent_stream_is_cleared() {
        let view = project(&ReplayInputs::default());
        assert_eq!(view.play_pause, ButtonView::disabled("Play"));
        assert_eq!(view.source, "");
        assert!(!view.seek_enabled);
    }
}
