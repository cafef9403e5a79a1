//! Axum router construction for the relay.
//!
//! Assembles the control surface, health, and `WebSocket` routes into a
//! single [`Router`] with the configured CORS policy and request tracing.

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use beacon_core::config::CorsConfig;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the relay.
///
/// The router includes:
/// - `GET /` and `GET /health` -- liveness
/// - `GET /api/alert` -- current alert state
/// - `POST /alert` -- raise the alert
/// - `POST /clear` -- clear the alert
/// - `GET /ws` and `GET /ws/alerts` -- observer push channel
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.cors);

    Router::new()
        // Health
        .route("/", get(handlers::health))
        .route("/health", get(handlers::health))
        // Control surface
        .route("/alert", post(handlers::raise_alert))
        .route("/clear", post(handlers::clear_alert))
        .route("/api/alert", get(handlers::current_alert))
        // WebSocket
        .route("/ws", get(ws::ws_alerts))
        .route("/ws/alerts", get(ws::ws_alerts))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Translate the configured origin list into a [`CorsLayer`].
///
/// `*` allows any origin. Origins that are not valid header values are
/// skipped with a warning.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if config.allows_any() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(%origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
