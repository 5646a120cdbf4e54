//! Palette and semantic styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

// ── Core Palette ──────────────────────────────────────────────────────

pub const SKY_BLUE: Color = Color::Rgb(110, 190, 255); // #6ebeff
pub const NEON_CYAN: Color = Color::Rgb(128, 255, 234); // #80ffea
pub const CORAL: Color = Color::Rgb(255, 106, 193); // #ff6ac1
pub const ELECTRIC_YELLOW: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const SUCCESS_GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const ERROR_RED: Color = Color::Rgb(255, 99, 99); // #ff6363

// ── Extended Palette ──────────────────────────────────────────────────

pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const MUTED: Color = Color::Rgb(70, 76, 98); // #464c62
pub const BG_DARK: Color = Color::Rgb(22, 24, 34); // #161822

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(SKY_BLUE)
}

/// Field label in a view panel.
pub fn label() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn value() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// A value whose facet is absent.
pub fn absent() -> Style {
    Style::default().fg(MUTED)
}

pub fn button_enabled() -> Style {
    Style::default()
        .fg(SKY_BLUE)
        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
}

pub fn button_disabled() -> Style {
    Style::default().fg(MUTED).add_modifier(Modifier::CROSSED_OUT)
}

/// Selected option in a picker.
pub fn picker_selected() -> Style {
    Style::default().fg(CORAL).add_modifier(Modifier::BOLD)
}

/// Connection state colored by how usable the entity is.
pub fn connection(state: &str) -> Style {
    match state {
        "connected" => Style::default().fg(SUCCESS_GREEN),
        "connecting" | "disconnecting" => Style::default().fg(ELECTRIC_YELLOW),
        "" => absent(),
        _ => Style::default().fg(ERROR_RED),
    }
}

pub fn tab_active() -> Style {
    Style::default().fg(SKY_BLUE).add_modifier(Modifier::BOLD)
}

pub fn tab_inactive() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Key hint text (e.g., "q quit  ? help").
pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

/// Status line message after an action.
pub fn notice(error: bool) -> Style {
    if error {
        Style::default().fg(ERROR_RED)
    } else {
        Style::default().fg(ELECTRIC_YELLOW)
    }
}
