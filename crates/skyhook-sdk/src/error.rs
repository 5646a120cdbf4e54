use thiserror::Error;

use crate::camera_config::Param;
use crate::id::Uid;

/// Immediate rejection signals returned by SDK calls.
///
/// Every mutation is asynchronous: `Ok` only means the request was accepted
/// for processing. The authoritative outcome arrives later through the
/// component facets.
#[derive(Debug, Error)]
pub enum SdkError {
    // ── Entity availability ─────────────────────────────────────────
    /// The target entity is not connected.
    #[error("{target} is not connected")]
    Disconnected { target: Uid },

    /// The SDK context was closed; no further requests are processed.
    #[error("SDK context is closed")]
    Closed,

    // ── Request validation ──────────────────────────────────────────
    /// The request was refused before it reached the entity.
    #[error("{command} rejected by {target}: {reason}")]
    Rejected {
        target: Uid,
        command: &'static str,
        reason: String,
    },

    /// A configuration draft still has unresolved parameters.
    #[error("camera configuration is incomplete: unresolved {missing:?}")]
    IncompleteConfig { missing: Vec<Param> },

    /// A thermal color component or position is outside `[0, 1]`.
    #[error("invalid thermal color: {0}")]
    InvalidColor(String),
}
