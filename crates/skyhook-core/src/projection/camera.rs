use serde::Serialize;
use skyhook_sdk::model::{CameraMode, LegacyCamera, MainCamera, WhiteBalanceMode};
use skyhook_sdk::{CameraApi, Command};

use super::{
    ABSENT, ButtonView, PickerView, ViewRow, ViewRows, button_row, picker_row, select_first,
};

/// The camera peripheral of whichever API the bound drone exposes. The
/// variant is chosen once per binding.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraFacet {
    Legacy(LegacyCamera),
    Current(MainCamera),
}

impl CameraFacet {
    pub fn api(&self) -> CameraApi {
        match self {
            Self::Legacy(_) => CameraApi::Legacy,
            Self::Current(_) => CameraApi::Current,
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Self::Legacy(camera) => camera.active,
            Self::Current(camera) => camera.active,
        }
    }

    pub fn capture_flags(&self) -> CaptureFlags {
        match self {
            Self::Legacy(camera) => CaptureFlags {
                can_start_photo: camera.can_start_photo_capture(),
                can_stop_photo: camera.can_stop_photo_capture(),
                can_start_recording: camera.can_start_recording(),
                can_stop_recording: camera.can_stop_recording(),
            },
            Self::Current(camera) => CaptureFlags {
                can_start_photo: camera.can_start_photo_capture(),
                can_stop_photo: camera.can_stop_photo_capture(),
                can_start_recording: camera.can_start_recording(),
                can_stop_recording: camera.can_stop_recording(),
            },
        }
    }

    fn mode_picker(&self) -> PickerView {
        match self {
            Self::Legacy(camera) => PickerView::new(&camera.supported_modes, Some(&camera.mode)),
            Self::Current(camera) => {
                let mode: Option<CameraMode> = camera.config.mode();
                PickerView::new(&camera.config.supported_modes(), mode.as_ref())
            }
        }
    }

    fn white_balance_picker(&self) -> PickerView {
        match self {
            Self::Legacy(camera) => PickerView::new(
                &camera.white_balance.supported_modes,
                Some(&camera.white_balance.mode),
            ),
            Self::Current(camera) => {
                let mode: Option<WhiteBalanceMode> = camera.config.white_balance_mode();
                PickerView::new(&camera.config.supported_white_balance_modes(), mode.as_ref())
            }
        }
    }
}

/// Capture capabilities in the order the capture button checks them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureFlags {
    pub can_start_photo: bool,
    pub can_stop_photo: bool,
    pub can_start_recording: bool,
    pub can_stop_recording: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CaptureAction {
    StartPhoto,
    StopPhoto,
    StartRecording,
    StopRecording,
}

impl CaptureAction {
    pub fn command(self) -> Command {
        match self {
            Self::StartPhoto => Command::StartPhotoCapture,
            Self::StopPhoto => Command::StopPhotoCapture,
            Self::StartRecording => Command::StartRecording,
            Self::StopRecording => Command::StopRecording,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::StartPhoto => "Take photo",
            Self::StopPhoto => "Stop photo",
            Self::StartRecording => "Record",
            Self::StopRecording => "Stop recording",
        }
    }
}

/// Label shown on the disabled capture button.
pub const CAPTURE_IDLE_LABEL: &str = "Capture";

impl CaptureFlags {
    pub fn action(self) -> Option<CaptureAction> {
        select_first(&[
            (self.can_start_photo, CaptureAction::StartPhoto),
            (self.can_stop_photo, CaptureAction::StopPhoto),
            (self.can_start_recording, CaptureAction::StartRecording),
            (self.can_stop_recording, CaptureAction::StopRecording),
        ])
    }

    pub fn button(self) -> ButtonView {
        self.action().map_or_else(
            || ButtonView::disabled(CAPTURE_IDLE_LABEL),
            |action| ButtonView::enabled(action.label()),
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct CameraInputs {
    /// Set at bind time, before any camera value arrives.
    pub api: Option<CameraApi>,
    pub camera: Option<CameraFacet>,
}

impl CameraInputs {
    pub fn capture_action(&self) -> Option<CaptureAction> {
        self.camera
            .as_ref()
            .and_then(|camera| camera.capture_flags().action())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CameraView {
    pub api: String,
    pub active: String,
    pub capture: ButtonView,
    pub mode: PickerView,
    pub white_balance: PickerView,
}

pub fn project(inputs: &CameraInputs) -> CameraView {
    let api = inputs
        .api
        .map_or_else(|| ABSENT.to_owned(), |api| api.to_string());

    let Some(camera) = &inputs.camera else {
        return CameraView {
            api,
            active: ABSENT.to_owned(),
            capture: ButtonView::disabled(CAPTURE_IDLE_LABEL),
            mode: PickerView::cleared(),
            white_balance: PickerView::cleared(),
        };
    };

    let active = camera.is_active();
    let mut mode = camera.mode_picker();
    let mut white_balance = camera.white_balance_picker();
    mode.enabled &= active;
    white_balance.enabled &= active;

    CameraView {
        api,
        active: if active { "active" } else { "inactive" }.to_owned(),
        capture: camera.capture_flags().button(),
        mode,
        white_balance,
    }
}

impl ViewRows for CameraView {
    fn rows(&self) -> Vec<ViewRow> {
        vec![
            ViewRow::new("camera api", &self.api),
            ViewRow::new("camera", &self.active),
            button_row("capture", &self.capture),
            picker_row("mode", &self.mode),
            picker_row("white balance", &self.white_balance),
        ]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use skyhook_sdk::model::{CaptureState, WhiteBalanceSetting};

    use super::*;

    #[test]
    fn capture_truth_table() {
        let order = [
            CaptureAction::StartPhoto,
            CaptureAction::StopPhoto,
            CaptureAction::StartRecording,
            CaptureAction::StopRecording,
        ];
        for bits in 0u8..16 {
            let flags = CaptureFlags {
                can_start_photo: bits & 0b0001 != 0,
                can_stop_photo: bits & 0b0010 != 0,
                can_start_recording: bits & 0b0100 != 0,
                can_stop_recording: bits & 0b1000 != 0,
            };
            let expected = (0..4)
                .find(|i| bits & (1 << i) != 0)
                .map(|i| order[i]);

            assert_eq!(flags.action(), expected, "flags {bits:04b}");
            let button = flags.button();
            match expected {
                Some(action) => assert_eq!(button, ButtonView::enabled(action.label())),
                None => assert_eq!(button, ButtonView::disabled(CAPTURE_IDLE_LABEL)),
            }
        }
    }

    #[test]
    fn stop_wins_over_later_start() {
        let flags = CaptureFlags {
            can_start_photo: false,
            can_stop_photo: true,
            can_start_recording: true,
            can_stop_recording: false,
        };
        assert_eq!(flags.action(), Some(CaptureAction::StopPhoto));
    }

    fn legacy(active: bool) -> LegacyCamera {
        LegacyCamera {
            active,
            mode: CameraMode::Recording,
            supported_modes: vec![CameraMode::Photo, CameraMode::Recording],
            photo: CaptureState::Unavailable,
            recording: CaptureState::Ready,
            white_balance: WhiteBalanceSetting {
                mode: WhiteBalanceMode::Cloudy,
                supported_modes: vec![WhiteBalanceMode::Automatic, WhiteBalanceMode::Cloudy],
            },
        }
    }

    #[test]
    fn legacy_camera_view() {
        let inputs = CameraInputs {
            api: Some(CameraApi::Legacy),
            camera: Some(CameraFacet::Legacy(legacy(true))),
        };
        let view = project(&inputs);
        assert_eq!(view.api, "legacy");
        assert_eq!(view.active, "active");
        assert_eq!(view.capture, ButtonView::enabled("Record"));
        assert_eq!(view.mode.selected.as_deref(), Some("recording"));
        assert_eq!(view.white_balance.options, vec!["automatic", "cloudy"]);
        assert_eq!(inputs.capture_action(), Some(CaptureAction::StartRecording));
    }

    #[test]
    fn inactive_camera_disables_everything() {
        let view = project(&CameraInputs {
            api: Some(CameraApi::Legacy),
            camera: Some(CameraFacet::Legacy(legacy(false))),
        });
        assert_eq!(view.active, "inactive");
        assert!(!view.capture.enabled);
        assert!(!view.mode.enabled);
        assert!(!view.white_balance.enabled);
    }

    #[test]
    fn absent_camera_keeps_bound_api() {
        let view = project(&CameraInputs {
            api: Some(CameraApi::Current),
            camera: None,
        });
        assert_eq!(view.api, "current");
        assert_eq!(view.active, "");
        assert_eq!(view.mode, PickerView::cleared());
    }
}
