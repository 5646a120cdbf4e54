use std::time::Duration;

use serde::{Deserialize, Serialize};
use skyhook_sdk::model::{
    OutsideColorization, RenderingMode, SpotType, ThermalColor, ThermalMode, ThermalPalette,
    ThermalRendering,
};

/// Screen behavior, independent of how it is stored on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenConfig {
    /// Activate an idle manual piloting interface as soon as it is seen.
    pub auto_activate_piloting: bool,
    /// Start auto connection when the facility reports it stopped.
    pub auto_start_connection: bool,
    /// Step used by relative seeks on the replay screen.
    pub seek_step: Duration,
    pub thermal: ThermalSetup,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            auto_activate_piloting: true,
            auto_start_connection: true,
            seek_step: Duration::from_secs(5),
            thermal: ThermalSetup::default(),
        }
    }
}

impl ScreenConfig {
    /// Relative seek step in whole seconds, as taken by `SeekBy`.
    pub fn seek_step_secs(&self) -> i64 {
        i64::try_from(self.seek_step.as_secs()).unwrap_or(i64::MAX)
    }
}

/// Thermal settings sent once each time a thermal-capable drone is bound.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermalSetup {
    pub mode: ThermalMode,
    pub emissivity: f64,
    /// Kelvin.
    pub background_temperature: f64,
    pub rendering: ThermalRendering,
    pub palette: PalettePreset,
}

impl Default for ThermalSetup {
    fn default() -> Self {
        Self {
            mode: ThermalMode::Standard,
            emissivity: 1.0,
            background_temperature: 273.15,
            rendering: ThermalRendering {
                mode: RenderingMode::Blended,
                blending_rate: 0.5,
            },
            palette: PalettePreset::Relative,
        }
    }
}

/// Built-in palettes the thermal screen cycles through.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PalettePreset {
    #[default]
    Relative,
    Absolute,
    Spot,
}

fn ramp(stops: &[(f64, f64, f64, f64)]) -> Vec<ThermalColor> {
    stops
        .iter()
        .map(|&(red, green, blue, position)| ThermalColor {
            red,
            green,
            blue,
            position,
        })
        .collect()
}

impl PalettePreset {
    pub fn build(self) -> ThermalPalette {
        match self {
            Self::Relative => ThermalPalette::Relative {
                colors: ramp(&[
                    (0.0, 0.0, 1.0, 0.0),
                    (0.0, 1.0, 0.0, 0.5),
                    (1.0, 0.0, 0.0, 1.0),
                ]),
                locked: false,
                lowest: 0.0,
                highest: 1.0,
            },
            Self::Absolute => ThermalPalette::Absolute {
                colors: ramp(&[
                    (0.0, 0.0, 0.0, 0.0),
                    (1.0, 1.0, 1.0, 1.0),
                ]),
                lowest_temperature: 300.0,
                highest_temperature: 310.0,
                colorization: OutsideColorization::Limited,
            },
            Self::Spot => ThermalPalette::Spot {
                colors: ramp(&[
                    (1.0, 1.0, 0.0, 0.0),
                    (1.0, 0.0, 0.0, 1.0),
                ]),
                threshold: 0.5,
                spot: SpotType::Hot,
            },
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Relative => Self::Absolute,
            Self::Absolute => Self::Spot,
            Self::Spot => Self::Relative,
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_preset_builds_a_valid_palette() {
        for preset in PalettePreset::iter() {
            let palette = preset.build();
            assert!(palette.validate().is_ok(), "{preset}");
            assert_eq!(palette.kind(), preset.to_string());
        }
    }

    #[test]
    fn presets_cycle() {
        let start = PalettePreset::default();
        assert_eq!(start.next().next().next(), start);
    }
}
