use thiserror::Error;

use skyhook_sdk::SdkError;

/// Unified error type for skyhook-core.
///
/// Absence of an entity or facet is never an error here; it is rendered as
/// cleared UI state. These variants cover infrastructure failures and the
/// SDK's immediate rejections.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Delivery ────────────────────────────────────────────────────
    #[error("delivery queue is closed")]
    QueueClosed,

    #[error("screen is closed")]
    ScreenClosed,

    // ── Actions ─────────────────────────────────────────────────────
    #[error("'{action}' is not available on the {screen} screen")]
    UnsupportedAction { screen: String, action: String },

    // ── SDK ─────────────────────────────────────────────────────────
    #[error(transparent)]
    Sdk(#[from] SdkError),
}
