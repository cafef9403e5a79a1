//! The [`Relay`]: alert state, session registry, and broadcast engine
//! behind one dispatch lock.
//!
//! A relay is built once at startup and shared behind an [`Arc`]. Nothing
//! in this crate keeps process-wide state; two relays in one process (as
//! in tests) are fully independent.
//!
//! The dispatch entry points live in [`dispatch`](crate::dispatch) and the
//! connect/disconnect entry points in [`lifecycle`](crate::lifecycle).
//!
//! [`Arc`]: std::sync::Arc

use std::sync::atomic::AtomicU64;

use beacon_types::AlertState;
use tokio::sync::Mutex;
use tracing::info;

use crate::broadcast::BroadcastEngine;
use crate::config::{DeliveryConfig, RelayConfig, ValidationMode};
use crate::dispatch::{PassThrough, StrictValidation, ValidationPolicy};
use crate::holder::AlertStateHolder;
use crate::registry::SessionRegistry;

/// The alert relay.
pub struct Relay {
    pub(crate) holder: AlertStateHolder,
    pub(crate) registry: SessionRegistry,
    pub(crate) engine: BroadcastEngine,
    pub(crate) policy: Box<dyn ValidationPolicy>,
    /// Serializes mutations, their broadcasts, and bootstrap pushes.
    pub(crate) dispatch_lock: Mutex<()>,
    pub(crate) session_buffer: usize,
    pub(crate) next_epoch: AtomicU64,
}

impl Relay {
    /// Create a relay with the given delivery limits and validation policy.
    pub fn new(delivery: &DeliveryConfig, policy: Box<dyn ValidationPolicy>) -> Self {
        Self {
            holder: AlertStateHolder::new(),
            registry: SessionRegistry::new(),
            engine: BroadcastEngine::new(delivery.send_timeout()),
            policy,
            dispatch_lock: Mutex::new(()),
            session_buffer: delivery.session_buffer.max(1),
            next_epoch: AtomicU64::new(0),
        }
    }

    /// Create a relay from the full configuration.
    pub fn from_config(config: &RelayConfig) -> Self {
        let policy: Box<dyn ValidationPolicy> = match config.dispatch.validation {
            ValidationMode::Strict => Box::new(StrictValidation),
            ValidationMode::Passthrough => Box::new(PassThrough),
        };
        Self::new(&config.delivery, policy)
    }

    /// The current alert state. Never waits on a dispatch in progress.
    pub fn current_state(&self) -> AlertState {
        self.holder.current_state()
    }

    /// The session registry.
    pub const fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Number of connected sessions.
    pub async fn session_count(&self) -> usize {
        self.registry.len().await
    }

    /// Name of the active validation policy.
    pub fn validation_policy(&self) -> &'static str {
        self.policy.name()
    }

    /// Drop every session and reset the state to idle.
    ///
    /// No event is broadcast; observers see their connection close and
    /// bootstrap from the fresh state when they reconnect.
    pub async fn shutdown(&self) {
        let _guard = self.dispatch_lock.lock().await;
        let dropped = self.registry.clear().await;
        self.holder.clear();
        info!(sessions = dropped, "relay shut down");
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::from_config(&RelayConfig::default())
    }
}

impl core::fmt::Debug for Relay {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Relay")
            .field("state", &self.holder.current_state())
            .field("policy", &self.policy.name())
            .field("send_timeout", &self.engine.send_timeout())
            .field("session_buffer", &self.session_buffer)
            .finish_non_exhaustive()
    }
}
