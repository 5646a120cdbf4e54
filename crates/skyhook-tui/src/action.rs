//! All possible UI actions. Actions are the sole mechanism for state mutation.

use skyhook_core::{ScreenAction, ScreenKind, ScreenView};

/// Simulator controls, available on every screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimAction {
    ConnectDrone,
    /// Connect a drone of the next model, replacing the current one.
    SwapDroneModel,
    DisconnectDrone,
    RemoveDrone,
    ConnectRemote,
    RemoveRemote,
    /// Change the drone battery level by this many percentage points.
    DroneBattery(i8),
    TogglePiloting,
}

/// A one-line message shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub error: bool,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: true,
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    /// Draw if anything changed since the last frame.
    Render,

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenKind),
    ToggleHelp,

    // ── Screen ────────────────────────────────────────────────────
    Perform(ScreenAction),
    ViewChanged(ScreenView),

    // ── Simulator ─────────────────────────────────────────────────
    Sim(SimAction),

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notice),
}
