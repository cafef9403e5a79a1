//! Fan-out of a single [`AlertEvent`] to every registered session.
//!
//! Each pass works from a registry snapshot and pushes to all sessions
//! concurrently. A session that is closed or does not accept the event
//! within the send timeout is logged and removed; the other sessions in
//! the same pass are unaffected. There are no retries and nothing is
//! buffered for sessions that are gone.

use std::time::Duration;

use beacon_types::{AlertEvent, SessionId};
use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::DeliveryError;
use crate::registry::SessionRegistry;

/// Default time a single session may take to accept an event.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(1);

/// Result of one broadcast pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct BroadcastReport {
    /// Sessions in the snapshot the pass worked from.
    pub recipients: usize,
    /// Sessions that accepted the event.
    pub delivered: usize,
    /// Sessions that failed and were removed from the registry.
    pub failed: Vec<SessionId>,
}

/// Pushes events to every session in a [`SessionRegistry`].
#[derive(Debug, Clone)]
pub struct BroadcastEngine {
    send_timeout: Duration,
}

impl BroadcastEngine {
    /// Create an engine that bounds each session push by `send_timeout`.
    pub const fn new(send_timeout: Duration) -> Self {
        Self { send_timeout }
    }

    /// The per-session send timeout.
    pub const fn send_timeout(&self) -> Duration {
        self.send_timeout
    }

    /// Deliver `event` to every session currently in `registry`.
    ///
    /// Failing sessions are deregistered before this returns.
    pub(crate) async fn broadcast(
        &self,
        registry: &SessionRegistry,
        event: &AlertEvent,
    ) -> BroadcastReport {
        let sessions = registry.snapshot().await;
        let recipients = sessions.len();

        let attempts = sessions.iter().map(|session| {
            let event = event.clone();
            async move {
                session
                    .deliver(event, self.send_timeout)
                    .await
                    .map_err(|e| (e, session.epoch()))
            }
        });
        let results = join_all(attempts).await;

        let mut delivered: usize = 0;
        let mut failed = Vec::new();
        for result in results {
            match result {
                Ok(()) => delivered = delivered.saturating_add(1),
                Err((DeliveryError { session_id, failure }, epoch)) => {
                    warn!(%session_id, %failure, "dropping session after failed delivery");
                    registry.deregister_epoch(session_id, epoch).await;
                    failed.push(session_id);
                }
            }
        }

        debug!(
            recipients,
            delivered,
            failed = failed.len(),
            "broadcast pass complete"
        );

        BroadcastReport {
            recipients,
            delivered,
            failed,
        }
    }
}

impl Default for BroadcastEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SEND_TIMEOUT)
    }
}
