//! skyhook-core: Observable references, entity sessions, and derived UI state
//! shared by the CLI and TUI front-ends.

pub mod config;
pub mod edit;
pub mod error;
pub mod observe;
pub mod projection;
pub mod queue;
pub mod reference;
pub mod screen;
pub mod session;
pub mod view;

mod sync;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{PalettePreset, ScreenConfig, ThermalSetup};
pub use edit::{EditOutcome, apply_param};
pub use error::CoreError;
pub use observe::{DeviceObserve, SdkObserve};
pub use queue::DeliveryQueue;
pub use reference::{Reference, Releasable, ReleaseProbe};
pub use screen::{ActiveScreen, Outcome, ScreenAction, ScreenKind, ScreenView, ViewReceiver};
pub use session::{Binder, ReferenceSet, Session, SessionManager, SessionState};
pub use view::ViewModel;
