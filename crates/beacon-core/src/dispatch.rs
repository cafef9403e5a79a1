//! Raise and clear: the only way the alert state changes.
//!
//! Each accepted call mutates the state and broadcasts the result while
//! holding the relay's dispatch lock, so concurrent calls are applied one
//! at a time and every observer sees them in the same order. Calls are
//! never deduplicated: clearing an idle relay still broadcasts
//! [`AlertEvent::AlertCleared`].
//!
//! Raise payloads first pass through the relay's [`ValidationPolicy`].

use beacon_types::{AlertEvent, AlertPayload, AlertState};
use tracing::{info, warn};
use validator::Validate;

use crate::broadcast::BroadcastReport;
use crate::error::{RelayError, ValidationError};
use crate::relay::Relay;

/// Decides whether a raise payload may reach the alert state.
pub trait ValidationPolicy: Send + Sync {
    /// Check `payload`, returning the reason it was rejected.
    fn check(&self, payload: &AlertPayload) -> Result<(), ValidationError>;

    /// Short name for logs and health output.
    fn name(&self) -> &'static str;
}

/// Requires a non-blank name and coordinates and bounded field lengths.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictValidation;

impl ValidationPolicy for StrictValidation {
    fn check(&self, payload: &AlertPayload) -> Result<(), ValidationError> {
        payload
            .validate()
            .map_err(|errors| ValidationError::new(errors.to_string()))
    }

    fn name(&self) -> &'static str {
        "strict"
    }
}

/// Accepts every decoded payload unchanged, blank or oversized fields
/// included. The payload still has to be well formed to get this far.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl ValidationPolicy for PassThrough {
    fn check(&self, _payload: &AlertPayload) -> Result<(), ValidationError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "passthrough"
    }
}

/// The result of an accepted raise or clear.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DispatchOutcome {
    /// The state after the call.
    pub state: AlertState,
    /// How the resulting broadcast went.
    pub report: BroadcastReport,
}

impl Relay {
    /// Make `payload` the active alert and broadcast it.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Validation`] if the payload fails the
    /// relay's validation policy. Nothing changes and nothing is
    /// broadcast in that case.
    pub async fn raise(&self, payload: AlertPayload) -> Result<DispatchOutcome, RelayError> {
        if let Err(e) = self.policy.check(&payload) {
            warn!(policy = self.policy.name(), reason = %e.reason, "rejected alert payload");
            return Err(e.into());
        }

        let _guard = self.dispatch_lock.lock().await;
        let state = self.holder.set_active(payload.clone());
        let report = self
            .engine
            .broadcast(&self.registry, &AlertEvent::AlertRaised(payload))
            .await;

        info!(
            name = state.payload().map_or("", |p| p.name.as_str()),
            delivered = report.delivered,
            failed = report.failed.len(),
            "alert raised"
        );

        Ok(DispatchOutcome { state, report })
    }

    /// Return to idle and broadcast the clear.
    pub async fn clear(&self) -> DispatchOutcome {
        let _guard = self.dispatch_lock.lock().await;
        let state = self.holder.clear();
        let report = self
            .engine
            .broadcast(&self.registry, &AlertEvent::AlertCleared)
            .await;

        info!(
            delivered = report.delivered,
            failed = report.failed.len(),
            "alert cleared"
        );

        DispatchOutcome { state, report }
    }
}
