//! Initial component values published when a simulated entity connects.

use crate::camera_config::{CameraConfig, Param, ParamValue};
use crate::device::{CameraApi, DroneModel};
use crate::facet::ComponentStore;
use crate::model::{
    BatteryInfo, CameraMode, CaptureState, DeviceState, LegacyCamera, LiveStream, MainCamera,
    ManualCopterPiloting, PhotoMode, PlaybackState, RecordingMode, RenderingMode, ThermalControl,
    ThermalMode, ThermalRendering, ThermalSensitivity, WhiteBalanceMode, WhiteBalanceSetting,
};

const FRAMERATES: [u32; 6] = [24, 25, 30, 48, 60, 120];
const WHITE_BALANCE_TEMPERATURES: [u32; 6] = [2500, 3500, 4500, 5000, 6500, 8000];

pub(super) fn populate_drone(store: &ComponentStore, model: DroneModel, battery: u8) {
    store.publish(DeviceState::connected());
    store.publish(BatteryInfo::new(battery));
    store.publish(ManualCopterPiloting::landed());
    store.publish(LiveStream {
        state: PlaybackState::Stopped,
    });
    match model.camera_api() {
        CameraApi::Legacy => store.publish(legacy_camera()),
        CameraApi::Current => store.publish(main_camera()),
    }
    if model.has_thermal() {
        store.publish(thermal_control());
    }
}

pub(super) fn populate_remote(store: &ComponentStore, battery: u8) {
    store.publish(DeviceState::connected());
    store.publish(BatteryInfo::new(battery));
}

fn legacy_camera() -> LegacyCamera {
    LegacyCamera {
        active: true,
        mode: CameraMode::Photo,
        supported_modes: vec![CameraMode::Photo, CameraMode::Recording],
        photo: CaptureState::Ready,
        recording: CaptureState::Unavailable,
        white_balance: WhiteBalanceSetting {
            mode: WhiteBalanceMode::Automatic,
            supported_modes: vec![
                WhiteBalanceMode::Automatic,
                WhiteBalanceMode::Sunset,
                WhiteBalanceMode::Daylight,
                WhiteBalanceMode::Cloudy,
                WhiteBalanceMode::Shaded,
            ],
        },
    }
}

pub(super) fn main_camera_config() -> CameraConfig {
    CameraConfig::default()
        .with_entry(
            Param::Mode,
            vec![
                ParamValue::Mode(CameraMode::Photo),
                ParamValue::Mode(CameraMode::Recording),
            ],
            Some(ParamValue::Mode(CameraMode::Photo)),
        )
        .with_entry(
            Param::PhotoMode,
            vec![
                ParamValue::PhotoMode(PhotoMode::Single),
                ParamValue::PhotoMode(PhotoMode::Burst),
                ParamValue::PhotoMode(PhotoMode::Timelapse),
            ],
            Some(ParamValue::PhotoMode(PhotoMode::Single)),
        )
        .with_entry(
            Param::RecordingMode,
            vec![
                ParamValue::RecordingMode(RecordingMode::Standard),
                ParamValue::RecordingMode(RecordingMode::Hyperlapse),
                ParamValue::RecordingMode(RecordingMode::HighFramerate),
            ],
            None,
        )
        .with_entry(
            Param::RecordingFramerate,
            FRAMERATES.into_iter().map(ParamValue::RecordingFramerate).collect(),
            None,
        )
        .with_entry(
            Param::WhiteBalanceMode,
            vec![
                ParamValue::WhiteBalanceMode(WhiteBalanceMode::Automatic),
                ParamValue::WhiteBalanceMode(WhiteBalanceMode::Daylight),
                ParamValue::WhiteBalanceMode(WhiteBalanceMode::Cloudy),
                ParamValue::WhiteBalanceMode(WhiteBalanceMode::Shaded),
                ParamValue::WhiteBalanceMode(WhiteBalanceMode::Custom),
            ],
            Some(ParamValue::WhiteBalanceMode(WhiteBalanceMode::Automatic)),
        )
        .with_entry(
            Param::WhiteBalanceTemperature,
            WHITE_BALANCE_TEMPERATURES
                .into_iter()
                .map(ParamValue::WhiteBalanceTemperature)
                .collect(),
            None,
        )
}

fn main_camera() -> MainCamera {
    MainCamera {
        active: true,
        config: main_camera_config(),
        photo_capture: Some(CaptureState::Ready),
        recording: None,
    }
}

fn thermal_control() -> ThermalControl {
    ThermalControl {
        mode: ThermalMode::Disabled,
        supported_modes: vec![
            ThermalMode::Disabled,
            ThermalMode::Standard,
            ThermalMode::Blended,
            ThermalMode::Embedded,
        ],
        sensitivity: ThermalSensitivity::HighRange,
        emissivity: 0.95,
        background_temperature: 293.15,
        palette: None,
        rendering: ThermalRendering {
            mode: RenderingMode::Visible,
            blending_rate: 0.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_main_camera_config_is_complete() {
        assert!(main_camera_config().is_complete());
    }

    #[test]
    fn thermal_drone_publishes_thermal_control() {
        let store = ComponentStore::new();
        populate_drone(&store, DroneModel::ExplorerThermal, 70);
        assert!(store.get::<ThermalControl>().is_some());
        assert!(store.get::<LegacyCamera>().is_some());
        assert!(store.get::<MainCamera>().is_none());
    }

    #[test]
    fn voyager_uses_main_camera() {
        let store = ComponentStore::new();
        populate_drone(&store, DroneModel::Voyager, 70);
        assert!(store.get::<MainCamera>().is_some());
        assert!(store.get::<ThermalControl>().is_none());
    }
}
