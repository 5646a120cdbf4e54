//! Fire-and-forget mutation requests. Sending only reports an immediate
//! rejection; the effect shows up later on the entity's facets.

use std::time::Duration;

use serde::Serialize;

use crate::camera_config::CameraConfig;
use crate::error::SdkError;
use crate::id::Uid;
use crate::model::{CameraMode, ThermalMode, ThermalPalette, ThermalRendering, WhiteBalanceMode};

#[derive(Debug, Clone, PartialEq, Serialize, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum Command {
    // ── Piloting ────────────────────────────────────────────────────
    ActivatePiloting,
    TakeOff,
    Land,

    // ── Camera ──────────────────────────────────────────────────────
    StartPhotoCapture,
    StopPhotoCapture,
    StartRecording,
    StopRecording,
    ApplyCameraConfig(CameraConfig),
    SetLegacyCameraMode(CameraMode),
    SetLegacyWhiteBalance(WhiteBalanceMode),

    // ── Thermal ─────────────────────────────────────────────────────
    SetThermalMode(ThermalMode),
    SetThermalPalette(ThermalPalette),
    SetThermalRendering(ThermalRendering),
    SetEmissivity(f64),
    SetBackgroundTemperature(f64),

    // ── Streaming ───────────────────────────────────────────────────
    Play,
    Pause,
    Stop,
    SeekTo(Duration),
}

impl Command {
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Checks that can be made without asking the entity.
    pub(crate) fn validate(&self, target: &Uid) -> Result<(), SdkError> {
        let reject = |reason: String| SdkError::Rejected {
            target: target.clone(),
            command: self.name(),
            reason,
        };
        match self {
            Self::SetThermalPalette(palette) => palette.validate(),
            Self::SetThermalRendering(rendering) if !(0.0..=1.0).contains(&rendering.blending_rate) => {
                Err(reject(format!(
                    "blending rate {} is outside [0, 1]",
                    rendering.blending_rate
                )))
            }
            Self::SetEmissivity(value) if !(0.0..=1.0).contains(value) => {
                Err(reject(format!("emissivity {value} is outside [0, 1]")))
            }
            Self::SetBackgroundTemperature(kelvin) if *kelvin < 0.0 => {
                Err(reject(format!("{kelvin} K is below absolute zero")))
            }
            _ => Ok(()),
        }
    }
}

/// A command addressed to one entity.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub target: Uid,
    pub command: Command,
}
