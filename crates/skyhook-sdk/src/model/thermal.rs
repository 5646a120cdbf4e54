use serde::{Deserialize, Serialize};

use crate::component::component;
use crate::error::SdkError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ThermalMode {
    Disabled,
    Standard,
    Blended,
    Embedded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ThermalSensitivity {
    HighRange,
    LowRange,
}

/// One stop of a palette color ramp. All components lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalColor {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub position: f64,
}

impl ThermalColor {
    pub fn new(red: f64, green: f64, blue: f64, position: f64) -> Result<Self, SdkError> {
        let color = Self {
            red,
            green,
            blue,
            position,
        };
        color.validate()?;
        Ok(color)
    }

    pub fn validate(&self) -> Result<(), SdkError> {
        let parts = [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("position", self.position),
        ];
        for (name, value) in parts {
            if !(0.0..=1.0).contains(&value) {
                return Err(SdkError::InvalidColor(format!(
                    "{name} = {value} is outside [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// How temperatures outside an absolute palette range are colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OutsideColorization {
    Extended,
    Limited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SpotType {
    Hot,
    Cold,
}

/// Color palette applied to thermal imagery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ThermalPalette {
    /// Ramp spread over the scene's own temperature range.
    Relative {
        colors: Vec<ThermalColor>,
        locked: bool,
        lowest: f64,
        highest: f64,
    },
    /// Ramp pinned to a fixed temperature range, in kelvin.
    Absolute {
        colors: Vec<ThermalColor>,
        lowest_temperature: f64,
        highest_temperature: f64,
        colorization: OutsideColorization,
    },
    /// Highlights only the hottest or coldest spots past a threshold.
    Spot {
        colors: Vec<ThermalColor>,
        threshold: f64,
        spot: SpotType,
    },
}

impl ThermalPalette {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Relative { .. } => "relative",
            Self::Absolute { .. } => "absolute",
            Self::Spot { .. } => "spot",
        }
    }

    pub fn colors(&self) -> &[ThermalColor] {
        match self {
            Self::Relative { colors, .. } | Self::Absolute { colors, .. } | Self::Spot { colors, .. } => {
                colors
            }
        }
    }

    pub fn validate(&self) -> Result<(), SdkError> {
        if self.colors().is_empty() {
            return Err(SdkError::InvalidColor("palette has no colors".into()));
        }
        for color in self.colors() {
            color.validate()?;
        }
        match self {
            Self::Relative { lowest, highest, .. } if lowest > highest => Err(SdkError::InvalidColor(
                format!("relative range {lowest}..{highest} is inverted"),
            )),
            Self::Absolute {
                lowest_temperature,
                highest_temperature,
                ..
            } if lowest_temperature > highest_temperature => Err(SdkError::InvalidColor(format!(
                "absolute range {lowest_temperature}..{highest_temperature} is inverted"
            ))),
            Self::Spot { threshold, .. } if !(0.0..=1.0).contains(threshold) => Err(
                SdkError::InvalidColor(format!("spot threshold {threshold} is outside [0, 1]")),
            ),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RenderingMode {
    Visible,
    Thermal,
    Blended,
    Monochrome,
}

/// How thermal and visible imagery are combined on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalRendering {
    pub mode: RenderingMode,
    /// Share of thermal imagery in `[0, 1]`, only meaningful when blended.
    pub blending_rate: f64,
}

/// Thermal camera control peripheral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalControl {
    pub mode: ThermalMode,
    pub supported_modes: Vec<ThermalMode>,
    pub sensitivity: ThermalSensitivity,
    pub emissivity: f64,
    /// Background temperature in kelvin.
    pub background_temperature: f64,
    pub palette: Option<ThermalPalette>,
    pub rendering: ThermalRendering,
}

impl ThermalControl {
    pub fn supports(&self, mode: ThermalMode) -> bool {
        self.supported_modes.contains(&mode)
    }
}

component!(ThermalControl, Peripheral, "thermal_control");

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn color_components_are_range_checked() {
        assert!(ThermalColor::new(0.0, 0.5, 1.0, 0.25).is_ok());
        assert!(ThermalColor::new(1.2, 0.0, 0.0, 0.0).is_err());
        assert!(ThermalColor::new(0.0, 0.0, 0.0, -0.1).is_err());
    }

    #[test]
    fn empty_palette_is_invalid() {
        let palette = ThermalPalette::Spot {
            colors: vec![],
            threshold: 0.5,
            spot: SpotType::Hot,
        };
        assert!(palette.validate().is_err());
    }

    #[test]
    fn inverted_absolute_range_is_invalid() {
        let palette = ThermalPalette::Absolute {
            colors: vec![ThermalColor::new(0.0, 0.0, 0.0, 0.0).unwrap()],
            lowest_temperature: 310.0,
            highest_temperature: 300.0,
            colorization: OutsideColorization::Limited,
        };
        assert!(palette.validate().is_err());
        assert_eq!(palette.kind(), "absolute");
    }
}
