use serde::{Deserialize, Serialize};

use crate::camera_config::CameraConfig;
use crate::component::component;

// ── Camera settings ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    Photo,
    Recording,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PhotoMode {
    Single,
    Burst,
    Timelapse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RecordingMode {
    Standard,
    Hyperlapse,
    HighFramerate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WhiteBalanceMode {
    Automatic,
    Candle,
    Sunset,
    Incandescent,
    Fluorescent,
    Daylight,
    Cloudy,
    Shaded,
    Custom,
}

/// State of a capture function (photo or recording).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
    /// Not usable in the current camera mode.
    Unavailable,
    Ready,
    Started,
    Stopping,
}

// ── Legacy camera API ───────────────────────────────────────────────

/// White balance as exposed by the legacy camera API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhiteBalanceSetting {
    pub mode: WhiteBalanceMode,
    pub supported_modes: Vec<WhiteBalanceMode>,
}

/// Camera peripheral of drones using the legacy, setter-based camera API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyCamera {
    pub active: bool,
    pub mode: CameraMode,
    pub supported_modes: Vec<CameraMode>,
    pub photo: CaptureState,
    pub recording: CaptureState,
    pub white_balance: WhiteBalanceSetting,
}

impl LegacyCamera {
    pub fn can_start_photo_capture(&self) -> bool {
        self.active && self.mode == CameraMode::Photo && self.photo == CaptureState::Ready
    }

    pub fn can_stop_photo_capture(&self) -> bool {
        self.active && self.photo == CaptureState::Started
    }

    pub fn can_start_recording(&self) -> bool {
        self.active && self.mode == CameraMode::Recording && self.recording == CaptureState::Ready
    }

    pub fn can_stop_recording(&self) -> bool {
        self.active && self.recording == CaptureState::Started
    }
}

component!(LegacyCamera, Peripheral, "legacy_camera");

// ── Current camera API ──────────────────────────────────────────────

/// Camera peripheral of drones using the configuration-draft camera API.
///
/// `photo_capture` only exists in photo mode and `recording` only in
/// recording mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MainCamera {
    pub active: bool,
    pub config: CameraConfig,
    pub photo_capture: Option<CaptureState>,
    pub recording: Option<CaptureState>,
}

impl MainCamera {
    pub fn can_start_photo_capture(&self) -> bool {
        self.active && self.photo_capture == Some(CaptureState::Ready)
    }

    pub fn can_stop_photo_capture(&self) -> bool {
        self.active && self.photo_capture == Some(CaptureState::Started)
    }

    pub fn can_start_recording(&self) -> bool {
        self.active && self.recording == Some(CaptureState::Ready)
    }

    pub fn can_stop_recording(&self) -> bool {
        self.active && self.recording == Some(CaptureState::Started)
    }
}

component!(MainCamera, Peripheral, "main_camera");

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy(mode: CameraMode, photo: CaptureState, recording: CaptureState) -> LegacyCamera {
        LegacyCamera {
            active: true,
            mode,
            supported_modes: vec![CameraMode::Photo, CameraMode::Recording],
            photo,
            recording,
            white_balance: WhiteBalanceSetting {
                mode: WhiteBalanceMode::Automatic,
                supported_modes: vec![WhiteBalanceMode::Automatic],
            },
        }
    }

    #[test]
    fn legacy_capture_flags_follow_mode() {
        let photo = legacy(CameraMode::Photo, CaptureState::Ready, CaptureState::Unavailable);
        assert!(photo.can_start_photo_capture());
        assert!(!photo.can_start_recording());

        let recording = legacy(CameraMode::Recording, CaptureState::Unavailable, CaptureState::Started);
        assert!(recording.can_stop_recording());
        assert!(!recording.can_start_recording());
    }

    #[test]
    fn inactive_camera_cannot_capture() {
        let mut camera = legacy(CameraMode::Photo, CaptureState::Ready, CaptureState::Unavailable);
        camera.active = false;
        assert!(!camera.can_start_photo_capture());
    }

    #[test]
    fn mode_names_parse() {
        assert_eq!("recording".parse::<CameraMode>().ok(), Some(CameraMode::Recording));
        assert_eq!(WhiteBalanceMode::Daylight.to_string(), "daylight");
    }
}
