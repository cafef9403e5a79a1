//! Integration tests for the relay's HTTP endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. Observers are attached straight to the relay
//! so broadcasts can be checked without a `WebSocket`.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use beacon_core::config::{RelayConfig, ValidationMode};
use beacon_relay::{AppState, build_router};
use beacon_types::{AlertEvent, AlertPayload, AlertState, SessionId};
use serde_json::Value;
use tower::ServiceExt;

fn make_test_state() -> Arc<AppState> {
    Arc::new(AppState::default())
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn alice_json() -> Value {
    serde_json::json!({
        "name": "Alice",
        "message": "help",
        "location": { "x": "10", "y": "20" }
    })
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_root_reports_ok() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["sessions"], 0);
    assert_eq!(json["alert_active"], false);
    assert_eq!(json["validation"], "strict");
}

#[tokio::test]
async fn test_health_counts_sessions() {
    let state = make_test_state();
    let _observer = state.relay.connect(SessionId::new()).await;
    let router = build_router(state);

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["sessions"], 1);
}

#[tokio::test]
async fn test_raise_returns_accepted_and_broadcasts() {
    let state = make_test_state();
    let mut observer = state.relay.connect(SessionId::new()).await;
    assert_eq!(observer.recv().await, Some(AlertEvent::AlertCleared));

    let router = build_router(Arc::clone(&state));
    let response = router.oneshot(post_json("/alert", &alice_json())).await.unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["delivered"], 1);
    assert_eq!(json["state"]["status"], "active");
    assert_eq!(json["state"]["alert"]["name"], "Alice");

    let alice = AlertPayload::new("Alice", "help", "10", "20");
    assert_eq!(observer.recv().await, Some(AlertEvent::AlertRaised(alice.clone())));
    assert_eq!(state.relay.current_state(), AlertState::Active(alice));
}

#[tokio::test]
async fn test_clear_returns_accepted() {
    let state = make_test_state();
    let router = build_router(Arc::clone(&state));

    let response = router
        .clone()
        .oneshot(post_json("/alert", &alice_json()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = router
        .oneshot(Request::post("/clear").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["state"]["status"], "idle");
    assert_eq!(state.relay.current_state(), AlertState::Idle);
}

#[tokio::test]
async fn test_clear_when_idle_still_notifies() {
    let state = make_test_state();
    let mut observer = state.relay.connect(SessionId::new()).await;
    let _ = observer.recv().await;
    let router = build_router(Arc::clone(&state));

    let response = router
        .oneshot(Request::post("/clear").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(observer.recv().await, Some(AlertEvent::AlertCleared));
}

#[tokio::test]
async fn test_current_alert_endpoint() {
    let state = make_test_state();
    let router = build_router(Arc::clone(&state));

    let response = router
        .clone()
        .oneshot(Request::get("/api/alert").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_to_json(response.into_body()).await,
        serde_json::json!({ "status": "idle" })
    );

    state
        .relay
        .raise(AlertPayload::new("Bob", "", "1", "2"))
        .await
        .unwrap();

    let response = router
        .oneshot(Request::get("/api/alert").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "active");
    assert_eq!(json["alert"]["name"], "Bob");
}

#[tokio::test]
async fn test_blank_name_is_unprocessable() {
    let state = make_test_state();
    let mut observer = state.relay.connect(SessionId::new()).await;
    let _ = observer.recv().await;
    let router = build_router(Arc::clone(&state));

    let body = serde_json::json!({
        "name": "",
        "message": "help",
        "location": { "x": "10", "y": "20" }
    });
    let response = router.oneshot(post_json("/alert", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 422);
    assert!(json["error"].as_str().unwrap().contains("name"));

    assert_eq!(state.relay.current_state(), AlertState::Idle);
    assert!(observer.try_recv().is_none());
}

#[tokio::test]
async fn test_blank_name_passes_through_when_configured() {
    let mut config = RelayConfig::default();
    config.dispatch.validation = ValidationMode::Passthrough;
    let state = Arc::new(AppState::from_config(&config));
    let router = build_router(Arc::clone(&state));

    let body = serde_json::json!({
        "name": "",
        "location": { "x": "", "y": "" }
    });
    let response = router.oneshot(post_json("/alert", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert!(state.relay.current_state().is_active());
}

#[tokio::test]
async fn test_passthrough_still_requires_payload_shape() {
    let mut config = RelayConfig::default();
    config.dispatch.validation = ValidationMode::Passthrough;
    let state = Arc::new(AppState::from_config(&config));
    let router = build_router(Arc::clone(&state));

    let body = serde_json::json!({ "name": "x" });
    let response = router.oneshot(post_json("/alert", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(state.relay.current_state(), AlertState::Idle);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(
            Request::post("/alert")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn test_missing_location_is_bad_request() {
    let router = build_router(make_test_state());

    let body = serde_json::json!({ "name": "Alice" });
    let response = router.oneshot(post_json("/alert", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cors_allows_any_origin_by_default() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(
            Request::get("/health")
                .header(header::ORIGIN, "http://10.0.2.2:8081")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_cors_restricted_origins() {
    let mut config = RelayConfig::default();
    config.cors.allowed_origins = vec![String::from("https://app.example.com")];
    let router = build_router(Arc::new(AppState::from_config(&config)));

    let response = router
        .clone()
        .oneshot(
            Request::get("/health")
                .header(header::ORIGIN, "https://app.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "https://app.example.com"
    );

    let response = router
        .oneshot(
            Request::get("/health")
                .header(header::ORIGIN, "https://evil.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn test_nonexistent_route_returns_404() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(Request::get("/api/nonexistent").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
