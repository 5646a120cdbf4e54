//! Hello drone: connection states, battery levels and take off / land.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{Frame, layout::Rect};
use skyhook_core::projection::HelloDroneView;
use skyhook_core::{ScreenAction, ScreenView};

use super::{button_row, render_panel, state_row, text_row};
use crate::action::Action;
use crate::component::Component;

const HINTS: &[(&str, &str)] = &[("t", "take off / land")];

pub struct HelloDroneScreen {
    view: HelloDroneView,
}

impl HelloDroneScreen {
    pub fn new(view: HelloDroneView) -> Self {
        Self { view }
    }
}

impl Component for HelloDroneScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('t') | KeyCode::Enter => Some(Action::Perform(ScreenAction::TakeOffOrLand)),
            _ => None,
        }
    }

    fn update(&mut self, action: &Action) -> Option<Action> {
        if let Action::ViewChanged(ScreenView::HelloDrone(view)) = action {
            self.view = view.clone();
        }
        None
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let view = &self.view;
        let rows = vec![
            state_row("Drone", &view.drone_state),
            text_row("Drone battery", &view.drone_battery),
            state_row("Remote", &view.remote_state),
            text_row("Remote battery", &view.remote_battery),
            button_row("Piloting", "t", &view.take_off_land),
        ];
        render_panel(frame, area, "Hello Drone", rows, HINTS);
    }

    fn key_hints(&self) -> &'static [(&'static str, &'static str)] {
        HINTS
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;
    use skyhook_core::projection::ButtonView;

    use super::*;
    use crate::screens::testing::render_text;

    fn connected() -> HelloDroneView {
        HelloDroneView {
            drone_state: "connected".into(),
            drone_battery: "80%".into(),
            remote_state: String::new(),
            remote_battery: String::new(),
            take_off_land: ButtonView::enabled("Take off"),
        }
    }

    #[test]
    fn renders_states_and_button() {
        let text = render_text(&HelloDroneScreen::new(connected()));
        assert!(text.contains("connected"), "{text}");
        assert!(text.contains("80%"), "{text}");
        assert!(text.contains("Take off"), "{text}");
        assert!(text.contains("Remote"), "{text}");
    }

    #[test]
    fn view_changes_replace_the_view() {
        let mut screen = HelloDroneScreen::new(connected());
        let mut next = connected();
        next.take_off_land = ButtonView::enabled("Land");
        assert!(screen.update(&Action::ViewChanged(ScreenView::HelloDrone(next))).is_none());
        assert!(render_text(&screen).contains("Land"));
    }

    #[test]
    fn t_takes_off_or_lands() {
        let mut screen = HelloDroneScreen::new(connected());
        let action = screen.handle_key_event(KeyEvent::new(KeyCode::Char('t'), KeyModifiers::NONE));
        assert!(matches!(action, Some(Action::Perform(ScreenAction::TakeOffOrLand))));
        let action = screen.handle_key_event(KeyEvent::new(KeyCode::Char('z'), KeyModifiers::NONE));
        assert!(action.is_none());
    }
}
