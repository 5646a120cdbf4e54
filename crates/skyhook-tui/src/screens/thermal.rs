//! Thermal: mode picker, palette and rendering, live stream button.

use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{Frame, layout::Rect};
use skyhook_core::projection::ThermalView;
use skyhook_core::{ScreenAction, ScreenView};
use skyhook_sdk::model::ThermalMode;

use super::{button_row, next_option, picker_row, render_panel, state_row, text_row};
use crate::action::Action;
use crate::component::Component;

const HINTS: &[(&str, &str)] = &[
    ("m", "next thermal mode"),
    ("p", "next palette"),
    ("s", "start / stop stream"),
];

pub struct ThermalScreen {
    view: ThermalView,
}

impl ThermalScreen {
    pub fn new(view: ThermalView) -> Self {
        Self { view }
    }
}

impl Component for ThermalScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Option<Action> {
        let action = match key.code {
            KeyCode::Char('m') => next_option(&self.view.mode)
                .and_then(|mode| ThermalMode::from_str(mode).ok())
                .map(ScreenAction::SetThermalMode),
            KeyCode::Char('p') => Some(ScreenAction::NextPalette),
            KeyCode::Char('s') => Some(ScreenAction::ToggleStream),
            _ => None,
        };
        action.map(Action::Perform)
    }

    fn update(&mut self, action: &Action) -> Option<Action> {
        if let Action::ViewChanged(ScreenView::Thermal(view)) = action {
            self.view = view.clone();
        }
        None
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let view = &self.view;
        let rows = vec![
            state_row("Drone", &view.drone_state),
            picker_row("Thermal mode", "m", &view.mode),
            text_row("Palette", &view.palette),
            text_row("Rendering", &view.rendering),
            button_row("Stream", "s", &view.stream),
        ];
        render_panel(frame, area, "Thermal", rows, HINTS);
    }

    fn key_hints(&self) -> &'static [(&'static str, &'static str)] {
        HINTS
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;
    use skyhook_core::projection::{ButtonView, PickerView};

    use super::*;

    #[test]
    fn mode_key_selects_next_supported_mode() {
        let mut screen = ThermalScreen::new(ThermalView {
            drone_state: "connected".into(),
            mode: PickerView::new(
                &[ThermalMode::Disabled, ThermalMode::Standard],
                Some(&ThermalMode::Standard),
            ),
            palette: String::new(),
            rendering: String::new(),
            stream: ButtonView::disabled("Start stream"),
        });
        let action = screen.handle_key_event(KeyEvent::new(KeyCode::Char('m'), KeyModifiers::NONE));
        assert!(matches!(
            action,
            Some(Action::Perform(ScreenAction::SetThermalMode(ThermalMode::Disabled)))
        ));
    }
}
