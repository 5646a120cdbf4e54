use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::component::component;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Stopped,
    Paused,
    Playing,
}

/// Live video stream of a drone camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveStream {
    pub state: PlaybackState,
}

component!(LiveStream, Peripheral, "live_stream");

/// Playback of a local media file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayStream {
    pub source: String,
    pub state: PlaybackState,
    pub position: Duration,
    pub duration: Duration,
}

impl ReplayStream {
    pub fn is_at_end(&self) -> bool {
        self.position >= self.duration
    }
}

component!(ReplayStream, Peripheral, "replay_stream");
