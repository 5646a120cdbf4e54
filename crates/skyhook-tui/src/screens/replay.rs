//! Replay: open a local file, play / pause and seek.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{Frame, layout::Rect};
use skyhook_core::projection::ReplayView;
use skyhook_core::{ScreenAction, ScreenView};

use super::{ScreenOptions, button_row, render_panel, text_row};
use crate::action::Action;
use crate::component::Component;

const HINTS: &[(&str, &str)] = &[
    ("o", "open"),
    ("x", "close"),
    ("space", "play / pause"),
    ("←/→", "seek"),
    ("home", "rewind"),
];

pub struct ReplayScreen {
    view: ReplayView,
    source: String,
    seek_step: i64,
}

impl ReplayScreen {
    pub fn new(view: ReplayView, options: &ScreenOptions) -> Self {
        Self {
            view,
            source: options.replay_source.clone(),
            seek_step: options.seek_step,
        }
    }
}

impl Component for ReplayScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Option<Action> {
        let action = match key.code {
            KeyCode::Char('o') => ScreenAction::OpenReplay(self.source.clone()),
            KeyCode::Char('x') => ScreenAction::CloseReplay,
            KeyCode::Char(' ') => ScreenAction::TogglePlayback,
            KeyCode::Left => ScreenAction::SeekBy(-self.seek_step),
            KeyCode::Right => ScreenAction::SeekBy(self.seek_step),
            KeyCode::Home => ScreenAction::SeekTo(Duration::ZERO),
            _ => return None,
        };
        Some(Action::Perform(action))
    }

    fn update(&mut self, action: &Action) -> Option<Action> {
        if let Action::ViewChanged(ScreenView::Replay(view)) = action {
            self.view = view.clone();
        }
        None
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let view = &self.view;
        let seek = if view.seek_enabled { "←/→" } else { "" };
        let rows = vec![
            text_row("Source", &view.source),
            text_row("State", &view.state),
            text_row("Position", &view.position),
            button_row("Playback", "space", &view.play_pause),
            text_row("Seek", seek),
        ];
        render_panel(frame, area, "Replay", rows, HINTS);
    }

    fn key_hints(&self) -> &'static [(&'static str, &'static str)] {
        HINTS
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use skyhook_core::projection::ButtonView;

    use super::*;
    use crate::screens::testing::render_text;

    fn screen() -> ReplayScreen {
        let view = ReplayView {
            source: "flight.mp4".into(),
            state: "paused".into(),
            position: "00:10 / 01:00".into(),
            play_pause: ButtonView::enabled("Play"),
            seek_enabled: true,
        };
        let options = ScreenOptions {
            replay_source: "flight.mp4".into(),
            seek_step: 5,
        };
        ReplayScreen::new(view, &options)
    }

    fn press(screen: &mut ReplayScreen, code: KeyCode) -> Option<ScreenAction> {
        match screen.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE)) {
            Some(Action::Perform(action)) => Some(action),
            _ => None,
        }
    }

    #[test]
    fn keys_map_to_replay_actions() {
        let mut screen = screen();
        assert_eq!(
            press(&mut screen, KeyCode::Char('o')),
            Some(ScreenAction::OpenReplay("flight.mp4".into()))
        );
        assert_eq!(press(&mut screen, KeyCode::Left), Some(ScreenAction::SeekBy(-5)));
        assert_eq!(press(&mut screen, KeyCode::Right), Some(ScreenAction::SeekBy(5)));
        assert_eq!(
            press(&mut screen, KeyCode::Home),
            Some(ScreenAction::SeekTo(Duration::ZERO))
        );
        assert_eq!(press(&mut screen, KeyCode::Char(' ')), Some(ScreenAction::TogglePlayback));
        assert_eq!(press(&mut screen, KeyCode::Char('q')), None);
    }

    #[test]
    fn renders_position() {
        let text = render_text(&screen());
        assert!(text.contains("00:10 / 01:00"), "{text}");
        assert!(text.contains("flight.mp4"), "{text}");
    }
}
