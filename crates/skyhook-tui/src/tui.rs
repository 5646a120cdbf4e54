//! The terminal is taken (raw mode, alternate screen) for as long as a
//! [`Tui`] is alive and given back when it drops or a panic unwinds.

use color_eyre::eyre::Result;
use ratatui::{DefaultTerminal, Frame};

pub struct Tui {
    terminal: DefaultTerminal,
}

impl Tui {
    /// Take the terminal. Also chains a panic hook that restores it before
    /// the previously installed hook prints.
    pub fn enter() -> Result<Self> {
        let terminal = ratatui::try_init()?;
        Ok(Self { terminal })
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        ratatui::restore();
    }
}

/// color-eyre reports for errors and panics. Install before [`Tui::enter`]
/// so the terminal is restored ahead of the report.
pub fn install_hooks() -> Result<()> {
    color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .install()
}
