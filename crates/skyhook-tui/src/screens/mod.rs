//! Screen components. Each renders one [`ScreenView`] variant and maps
//! its keys to [`ScreenAction`](skyhook_core::ScreenAction)s.

mod camera;
mod hello_drone;
mod replay;
mod thermal;

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table},
};
use skyhook_core::ScreenView;
use skyhook_core::projection::{ButtonView, PickerView};

use crate::component::Component;
use crate::theme;

pub use camera::CameraScreen;
pub use hello_drone::HelloDroneScreen;
pub use replay::ReplayScreen;
pub use thermal::ThermalScreen;

/// Settings screens need beyond their view.
#[derive(Debug, Clone)]
pub struct ScreenOptions {
    /// File opened by the replay screen.
    pub replay_source: String,
    /// Seconds moved by one seek key press.
    pub seek_step: i64,
}

/// Build the component for a freshly opened screen from its first view.
pub fn create_component(view: ScreenView, options: &ScreenOptions) -> Box<dyn Component> {
    match view {
        ScreenView::HelloDrone(view) => Box::new(HelloDroneScreen::new(view)),
        ScreenView::Camera(view) => Box::new(CameraScreen::new(view)),
        ScreenView::Thermal(view) => Box::new(ThermalScreen::new(view)),
        ScreenView::Replay(view) => Box::new(ReplayScreen::new(view, options)),
    }
}

/// Option after the selected one, wrapping. None while the picker is
/// disabled.
pub fn next_option(picker: &PickerView) -> Option<&str> {
    if !picker.enabled || picker.options.is_empty() {
        return None;
    }
    let next = picker
        .selected
        .as_ref()
        .and_then(|selected| picker.options.iter().position(|o| o == selected))
        .map_or(0, |idx| (idx + 1) % picker.options.len());
    picker.options.get(next).map(String::as_str)
}

// ── Rows ────────────────────────────────────────────────────────────

const ABSENT: &str = "-";

pub(crate) fn text_row(label: &'static str, value: &str) -> Row<'static> {
    let value = if value.is_empty() {
        Span::styled(ABSENT, theme::absent())
    } else {
        Span::styled(value.to_owned(), theme::value())
    };
    Row::new(vec![
        Cell::from(Span::styled(label, theme::label())),
        Cell::from(value),
    ])
}

pub(crate) fn state_row(label: &'static str, state: &str) -> Row<'static> {
    let shown = if state.is_empty() { ABSENT } else { state };
    Row::new(vec![
        Cell::from(Span::styled(label, theme::label())),
        Cell::from(Span::styled(shown.to_owned(), theme::connection(state))),
    ])
}

pub(crate) fn button_row(label: &'static str, key: &'static str, button: &ButtonView) -> Row<'static> {
    let style = if button.enabled {
        theme::button_enabled()
    } else {
        theme::button_disabled()
    };
    Row::new(vec![
        Cell::from(Span::styled(label, theme::label())),
        Cell::from(Line::from(vec![
            Span::styled(format!(" {} ", button.label), style),
            Span::raw(" "),
            Span::styled(key, theme::key_hint_key()),
        ])),
    ])
}

pub(crate) fn picker_row(label: &'static str, key: &'static str, picker: &PickerView) -> Row<'static> {
    if !picker.enabled {
        return text_row(label, "");
    }
    let mut spans = Vec::with_capacity(picker.options.len() * 2 + 2);
    for option in &picker.options {
        let style = if picker.selected.as_ref() == Some(option) {
            theme::picker_selected()
        } else {
            theme::value()
        };
        spans.push(Span::styled(option.clone(), style));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled(key, theme::key_hint_key()));
    Row::new(vec![
        Cell::from(Span::styled(label, theme::label())),
        Cell::from(Line::from(spans)),
    ])
}

/// Bordered panel with a two-column table of rows and a key hint line.
pub(crate) fn render_panel(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    rows: Vec<Row<'static>>,
    hints: &[(&'static str, &'static str)],
) {
    let block = Block::default()
        .title(format!(" {title} "))
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [table_area, hint_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

    let table = Table::new(rows, [Constraint::Length(18), Constraint::Fill(1)]).column_spacing(1);
    frame.render_widget(table, table_area);

    let spans: Vec<Span> = hints
        .iter()
        .flat_map(|&(key, about)| {
            [
                Span::styled(key, theme::key_hint_key()),
                Span::styled(format!(" {about}  "), theme::key_hint()),
            ]
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), hint_area);
}

#[cfg(test)]
pub(crate) mod testing {
    use ratatui::{Terminal, backend::TestBackend};

    use crate::component::Component;

    /// Render a component on a test terminal and return its text.
    #[allow(clippy::unwrap_used)]
    pub(crate) fn render_text(component: &dyn Component) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 14)).unwrap();
        terminal
            .draw(|frame| component.render(frame, frame.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_option_wraps_and_starts_at_first() {
        let picker = PickerView::new(&["photo", "recording"], Some(&"recording"));
        assert_eq!(next_option(&picker), Some("photo"));

        let picker = PickerView::new(&["photo", "recording"], None);
        assert_eq!(next_option(&picker), Some("photo"));

        assert_eq!(next_option(&PickerView::cleared()), None);
    }
}
