//! The single current alert state.
//!
//! Backed by a [`watch`] channel: readers take a cheap borrow and never
//! wait on a writer, and every write replaces the whole value, so no
//! reader can see a half-applied payload.
//!
//! The holder only stores state. Pairing each mutation with its
//! broadcast is the job of [`Relay`](crate::Relay), so the mutators are
//! visible to this crate only.

use beacon_types::{AlertPayload, AlertState};
use tokio::sync::watch;

/// Owner of the relay's current [`AlertState`].
#[derive(Debug)]
pub struct AlertStateHolder {
    tx: watch::Sender<AlertState>,
}

impl AlertStateHolder {
    /// Create a holder in the [`AlertState::Idle`] state.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(AlertState::Idle);
        Self { tx }
    }

    /// The current state.
    pub fn current_state(&self) -> AlertState {
        self.tx.borrow().clone()
    }

    /// Make `payload` the active alert, replacing any previous one.
    pub(crate) fn set_active(&self, payload: AlertPayload) -> AlertState {
        let next = AlertState::Active(payload);
        self.tx.send_replace(next.clone());
        next
    }

    /// Return to [`AlertState::Idle`]. Clearing an idle holder is allowed.
    pub(crate) fn clear(&self) -> AlertState {
        self.tx.send_replace(AlertState::Idle);
        AlertState::Idle
    }
}

impl Default for AlertStateHolder {
    fn default() -> Self {
        Self::new()
    }
}
