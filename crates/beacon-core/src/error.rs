//! Error types for the relay core.
//!
//! Only [`RelayError`] ever reaches a sender. [`DeliveryError`] is
//! produced and consumed inside the broadcast engine: it is logged and
//! the failing session is dropped, nothing more.

use beacon_types::SessionId;

/// A raise request was rejected before any state change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid alert payload: {reason}")]
pub struct ValidationError {
    /// Human-readable description of what was wrong.
    pub reason: String,
}

impl ValidationError {
    /// Create a validation error with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Errors surfaced to callers of the dispatch operations.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The alert payload failed the configured validation policy.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Why a push to a single session failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryFailure {
    /// The session's outbound queue is closed (connection gone).
    Closed,
    /// The session did not accept the event within the send timeout.
    Timeout,
    /// The session's queue had no room for an immediate push.
    Full,
}

impl core::fmt::Display for DeliveryFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Closed => f.write_str("outbound queue closed"),
            Self::Timeout => f.write_str("send timed out"),
            Self::Full => f.write_str("outbound queue full"),
        }
    }
}

/// A push to one session failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("delivery to session {session_id} failed: {failure}")]
pub struct DeliveryError {
    /// The session that could not be reached.
    pub session_id: SessionId,
    /// What went wrong.
    pub failure: DeliveryFailure,
}
