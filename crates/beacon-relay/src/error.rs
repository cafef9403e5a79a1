//! Error types for the relay's HTTP surface.
//!
//! [`ApiError`] converts into an Axum response with a JSON body of the
//! form `{"error": "...", "status": 422}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use beacon_core::RelayError;

/// Errors returned by the control surface.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body was not a well-formed alert payload.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The payload parsed but was rejected by the validation policy.
    #[error("{0}")]
    Validation(String),
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::Validation(e) => Self::Validation(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
