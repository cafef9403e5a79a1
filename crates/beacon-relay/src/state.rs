//! Shared application state for the relay server.

use std::sync::Arc;
use std::time::Duration;

use beacon_core::Relay;
use beacon_core::config::{CorsConfig, RelayConfig};
use chrono::{DateTime, Utc};

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The alert relay.
    pub relay: Arc<Relay>,
    /// Cross-origin policy applied by the router.
    pub cors: CorsConfig,
    /// Upper bound on a single `WebSocket` write.
    pub send_timeout: Duration,
    /// When the server state was created.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Build the state, and its relay, from configuration.
    pub fn from_config(config: &RelayConfig) -> Self {
        Self::with_relay(Arc::new(Relay::from_config(config)), config)
    }

    /// Build the state around an existing relay.
    pub fn with_relay(relay: Arc<Relay>, config: &RelayConfig) -> Self {
        Self {
            relay,
            cors: config.cors.clone(),
            send_timeout: config.delivery.send_timeout(),
            started_at: Utc::now(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(&RelayConfig::default())
    }
}
