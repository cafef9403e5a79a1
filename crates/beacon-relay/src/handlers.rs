//! HTTP endpoint handlers for the relay.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/`, `/health` | Liveness and a summary of relay state |
//! | `GET` | `/api/alert` | Current alert state |
//! | `POST` | `/alert` | Raise (or replace) the alert |
//! | `POST` | `/clear` | Clear the alert |
//!
//! Raise and clear answer `202 Accepted` once the state has changed and
//! the broadcast pass has run.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use beacon_core::DispatchOutcome;
use beacon_types::{AlertPayload, AlertState};
use chrono::Utc;

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Body of the health endpoint.
#[derive(Debug, serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    sessions: usize,
    alert_active: bool,
    validation: &'static str,
    uptime_seconds: i64,
}

/// Body returned by raise and clear.
#[derive(Debug, serde::Serialize)]
struct DispatchResponse {
    ok: bool,
    state: AlertState,
    delivered: usize,
    failed: usize,
}

impl From<DispatchOutcome> for DispatchResponse {
    fn from(outcome: DispatchOutcome) -> Self {
        Self {
            ok: true,
            delivered: outcome.report.delivered,
            failed: outcome.report.failed.len(),
            state: outcome.state,
        }
    }
}

// ---------------------------------------------------------------------------
// GET / and GET /health
// ---------------------------------------------------------------------------

/// Report liveness. No side effects.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = Utc::now()
        .signed_duration_since(state.started_at)
        .num_seconds()
        .max(0);

    Json(HealthResponse {
        status: "ok",
        sessions: state.relay.session_count().await,
        alert_active: state.relay.current_state().is_active(),
        validation: state.relay.validation_policy(),
        uptime_seconds: uptime,
    })
}

// ---------------------------------------------------------------------------
// GET /api/alert
// ---------------------------------------------------------------------------

/// Return the current alert state.
pub async fn current_alert(State(state): State<Arc<AppState>>) -> Json<AlertState> {
    Json(state.relay.current_state())
}

// ---------------------------------------------------------------------------
// POST /alert
// ---------------------------------------------------------------------------

/// Raise the alert with the request body as payload.
///
/// The body must decode as an [`AlertPayload`] (`name` and both
/// coordinates present, `message` optional) under every validation
/// policy; anything else is a 400. The policy only governs content.
pub async fn raise_alert(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AlertPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = body?;
    let outcome = state.relay.raise(payload).await?;
    Ok((StatusCode::ACCEPTED, Json(DispatchResponse::from(outcome))))
}

// ---------------------------------------------------------------------------
// POST /clear
// ---------------------------------------------------------------------------

/// Clear the alert. Clearing an idle relay still notifies every observer.
pub async fn clear_alert(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let outcome = state.relay.clear().await;
    (StatusCode::ACCEPTED, Json(DispatchResponse::from(outcome)))
}
