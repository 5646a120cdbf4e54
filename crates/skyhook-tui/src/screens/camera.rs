//! Camera: capture button plus mode and white-balance pickers.

use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{Frame, layout::Rect};
use skyhook_core::projection::CameraView;
use skyhook_core::{ScreenAction, ScreenView};
use skyhook_sdk::model::{CameraMode, WhiteBalanceMode};

use super::{button_row, next_option, picker_row, render_panel, text_row};
use crate::action::Action;
use crate::component::Component;

const HINTS: &[(&str, &str)] = &[
    ("c", "capture"),
    ("m", "next mode"),
    ("w", "next white balance"),
];

pub struct CameraScreen {
    view: CameraView,
}

impl CameraScreen {
    pub fn new(view: CameraView) -> Self {
        Self { view }
    }

    fn next_mode(&self) -> Option<ScreenAction> {
        let mode = next_option(&self.view.mode)?;
        CameraMode::from_str(mode).ok().map(ScreenAction::SetCameraMode)
    }

    fn next_white_balance(&self) -> Option<ScreenAction> {
        let mode = next_option(&self.view.white_balance)?;
        WhiteBalanceMode::from_str(mode)
            .ok()
            .map(ScreenAction::SetWhiteBalance)
    }
}

impl Component for CameraScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Option<Action> {
        let action = match key.code {
            KeyCode::Char('c') | KeyCode::Enter => Some(ScreenAction::Capture),
            KeyCode::Char('m') => self.next_mode(),
            KeyCode::Char('w') => self.next_white_balance(),
            _ => None,
        };
        action.map(Action::Perform)
    }

    fn update(&mut self, action: &Action) -> Option<Action> {
        if let Action::ViewChanged(ScreenView::Camera(view)) = action {
            self.view = view.clone();
        }
        None
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let view = &self.view;
        let rows = vec![
            text_row("API", &view.api),
            text_row("Active", &view.active),
            button_row("Capture", "c", &view.capture),
            picker_row("Mode", "m", &view.mode),
            picker_row("White balance", "w", &view.white_balance),
        ];
        render_panel(frame, area, "Camera", rows, HINTS);
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
    use crate::screens::testing::render_text;

    fn press(screen: &mut CameraScreen, c: char) -> Option<Action> {
        screen.handle_key_event(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    fn legacy() -> CameraView {
        CameraView {
            api: "legacy".into(),
            active: "yes".into(),
            capture: ButtonView::enabled("Take photo"),
            mode: PickerView::new(&[CameraMode::Photo, CameraMode::Recording], Some(&CameraMode::Photo)),
            white_balance: PickerView::new(
                &[WhiteBalanceMode::Automatic, WhiteBalanceMode::Candle],
                Some(&WhiteBalanceMode::Candle),
            ),
        }
    }

    #[test]
    fn pickers_cycle_to_the_next_option() {
        let mut screen = CameraScreen::new(legacy());
        assert!(matches!(
            press(&mut screen, 'm'),
            Some(Action::Perform(ScreenAction::SetCameraMode(CameraMode::Recording)))
        ));
        assert!(matches!(
            press(&mut screen, 'w'),
            Some(Action::Perform(ScreenAction::SetWhiteBalance(WhiteBalanceMode::Automatic)))
        ));
        assert!(matches!(press(&mut screen, 'c'), Some(Action::Perform(ScreenAction::Capture))));
    }

    #[test]
    fn cleared_pickers_send_nothing() {
        let mut view = legacy();
        view.mode = PickerView::cleared();
        let mut screen = CameraScreen::new(view);
        assert!(press(&mut screen, 'm').is_none());
    }

    #[test]
    fn renders_selected_options() {
        let text = render_text(&CameraScreen::new(legacy()));
        assert!(text.contains("Take photo"), "{text}");
        assert!(text.contains("recording"), "{text}");
        assert!(text.contains("candle"), "{text}");
    }
}
