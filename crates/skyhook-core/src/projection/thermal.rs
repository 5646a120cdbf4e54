use serde::Serialize;
use skyhook_sdk::Command;
use skyhook_sdk::model::{
    DeviceState, LiveStream, PlaybackState, RenderingMode, ThermalControl, ThermalPalette,
};

use super::{ABSENT, ButtonView, PickerView, ViewRow, ViewRows, button_row, picker_row};

#[derive(Debug, Clone, Default)]
pub struct ThermalInputs {
    pub drone_state: Option<DeviceState>,
    pub thermal: Option<ThermalControl>,
    pub stream: Option<LiveStream>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThermalView {
    pub drone_state: String,
    pub mode: PickerView,
    pub palette: String,
    pub rendering: String,
    pub stream: ButtonView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StreamAction {
    Play,
    Pause,
}

impl StreamAction {
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

impl ThermalInputs {
    /// Toggle for the live stream button; `None` while the stream is absent.
    pub fn stream_action(&self) -> Option<StreamAction> {
        self.stream.map(|stream| match stream.state {
            PlaybackState::Playing => StreamAction::Pause,
            PlaybackState::Paused | PlaybackState::Stopped => StreamAction::Play,
        })
    }
}

fn describe_palette(palette: &ThermalPalette) -> String {
    let colors = palette.colors().len();
    match palette {
        ThermalPalette::Relative { locked, .. } => {
            let lock = if *locked { ", locked" } else { "" };
            format!("relative, {colors} colors{lock}")
        }
        ThermalPalette::Absolute {
            lowest_temperature,
            highest_temperature,
            ..
        } => format!("absolute {lowest_temperature:.1}-{highest_temperature:.1} K, {colors} colors"),
        ThermalPalette::Spot { spot, threshold, .. } => {
            format!("{spot} spot above {threshold:.2}, {colors} colors")
        }
    }
}

fn describe_rendering(thermal: &ThermalControl) -> String {
    let rendering = thermal.rendering;
    match rendering.mode {
        RenderingMode::Blended => {
            format!("blended {:.0}%", rendering.blending_rate * 100.0)
        }
        mode => mode.to_string(),
    }
}

pub fn project(inputs: &ThermalInputs) -> ThermalView {
    let drone_state = inputs
        .drone_state
        .map_or_else(|| ABSENT.to_owned(), |state| state.connection.to_string());

    let (mode, palette, rendering) = match &inputs.thermal {
        Some(thermal) => (
            PickerView::new(&thermal.supported_modes, Some(&thermal.mode)),
            thermal
                .palette
                .as_ref()
                .map_or_else(|| ABSENT.to_owned(), describe_palette),
            describe_rendering(thermal),
        ),
        None => (PickerView::cleared(), ABSENT.to_owned(), ABSENT.to_owned()),
    };

    let stream = inputs.stream_action().map_or_else(
        || ButtonView::disabled(StreamAction::Play.label()),
        |action| ButtonView::enabled(action.label()),
    );

    ThermalView {
        drone_state,
        mode,
        palette,
        rendering,
        stream,
    }
}

impl ViewRows for ThermalView {
    fn rows(&self) -> Vec<ViewRow> {
        vec![
            ViewRow::new("drone state", &self.drone_state),
            picker_row("thermal mode", &self.mode),
            ViewRow::new("palette", &self.palette),
            ViewRow::new("rendering", &self.rendering),
            button_row("live stream", &self.stream),
        ]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use skyhook_sdk::model::{
        SpotType, ThermalColor, ThermalMode, ThermalRendering, ThermalSensitivity,
    };

    use super::*;

    fn thermal(palette: Option<ThermalPalette>) -> ThermalControl {
        ThermalControl {
            mode: ThermalMode::Blended,
            supported_modes: vec![ThermalMode::Disabled, ThermalMode::Blended],
            sensitivity: ThermalSensitivity::HighRange,
            emissivity: 1.0,
            background_temperature: 273.15,
            palette,
            rendering: ThermalRendering {
                mode: RenderingMode::Blended,
                blending_rate: 0.5,
            },
        }
    }

    #[test]
    fn absent_thermal_control_is_cleared() {
        let view = project(&ThermalInputs::default());
        assert_eq!(view.mode, PickerView::cleared());
        assert_eq!(view.palette, "");
        assert_eq!(view.stream, ButtonView::disabled("Play"));
    }

    #[test]
    fn thermal_control_view() {
        let spot = ThermalPalette::Spot {
            colors: vec![ThermalColor {
                red: 1.0,
                green: 0.0,
                blue: 0.0,
                position: 1.0,
            }],
            threshold: 0.5,
            spot: SpotType::Hot,
        };
        let inputs = ThermalInputs {
            drone_state: Some(DeviceState::connected()),
            thermal: Some(thermal(Some(spot))),
            stream: Some(LiveStream {
                state: PlaybackState::Playing,
            }),
        };
        let view = project(&inputs);
        assert_eq!(view.drone_state, "connected");
        assert_eq!(view.mode.selected.as_deref(), Some("blended"));
        assert_eq!(view.palette, "hot spot above 0.50, 1 colors");
        assert_eq!(view.rendering, "blended 50%");
        assert_eq!(view.stream, ButtonView::enabled("Pause"));
        assert_eq!(inputs.stream_action(), Some(StreamAction::Pause));
    }

    #[test]
    fn missing_palette_is_blank() {
        let view = project(&ThermalInputs {
            thermal: Some(thermal(None)),
            ..ThermalInputs::default()
        });
        assert_eq!(view.palette, "");
        assert!(view.mode.enabled);
    }
}
