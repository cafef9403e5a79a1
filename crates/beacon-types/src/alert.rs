//! Alert payloads, the relay's current alert state, and the events pushed
//! to observers.
//!
//! The wire encoding of [`AlertEvent`] keeps the event names the mobile
//! client already listens for (`alert` and `clear-alert`), so a client only
//! has to switch transports, not message handling.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::{Validate, ValidationError};

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Where the person raising the alert is.
///
/// Coordinates are carried as strings exactly as the sender supplied them;
/// the relay never interprets them. Each is capped at 64 characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AlertLocation {
    /// Horizontal coordinate.
    #[validate(
        length(max = 64),
        custom(function = "not_blank", message = "location.x must not be empty")
    )]
    pub x: String,
    /// Vertical coordinate.
    #[validate(
        length(max = 64),
        custom(function = "not_blank", message = "location.y must not be empty")
    )]
    pub y: String,
}

/// The content of a raised alert.
///
/// Validation caps `name` at 256 characters and `message` at 2048.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AlertPayload {
    /// Name of the person who needs help.
    #[validate(
        length(max = 256),
        custom(function = "not_blank", message = "name must not be empty")
    )]
    pub name: String,
    /// Free-form message. Absent on the wire means empty.
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub message: String,
    /// Sender location.
    #[validate(nested)]
    pub location: AlertLocation,
}

impl AlertPayload {
    /// Build a payload from its parts.
    pub fn new(
        name: impl Into<String>,
        message: impl Into<String>,
        x: impl Into<String>,
        y: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            location: AlertLocation {
                x: x.into(),
                y: y.into(),
            },
        }
    }
}

/// Rejects strings that are empty or whitespace only.
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// The relay's single current alert.
///
/// Serialized as `{"status":"idle"}` or
/// `{"status":"active","alert":{...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(tag = "status", content = "alert", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum AlertState {
    /// No alert is active.
    #[default]
    Idle,
    /// An alert is active with the given payload.
    Active(AlertPayload),
}

impl AlertState {
    /// Whether an alert is currently active.
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// The active payload, if any.
    pub const fn payload(&self) -> Option<&AlertPayload> {
        match self {
            Self::Active(payload) => Some(payload),
            Self::Idle => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A message pushed from the relay to every observer.
///
/// Serialized as `{"event":"alert","data":{...}}` or
/// `{"event":"clear-alert"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "data")]
#[ts(export, export_to = "bindings/")]
pub enum AlertEvent {
    /// An alert was raised (or replaced) with this payload.
    #[serde(rename = "alert")]
    AlertRaised(AlertPayload),
    /// The active alert was cleared.
    #[serde(rename = "clear-alert")]
    AlertCleared,
}

impl From<&AlertState> for AlertEvent {
    /// The event that brings an observer starting from `Idle` up to `state`.
    fn from(state: &AlertState) -> Self {
        match state {
            AlertState::Idle => Self::AlertCleared,
            AlertState::Active(payload) => Self::AlertRaised(payload.clone()),
        }
    }
}

impl From<AlertState> for AlertEvent {
    fn from(state: AlertState) -> Self {
        match state {
            AlertState::Idle => Self::AlertCleared,
            AlertState::Active(payload) => Self::AlertRaised(payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AlertPayload {
        AlertPayload::new("Alice", "help", "10", "20")
    }

    #[test]
    fn raised_event_uses_client_event_name() {
        let json = serde_json::to_value(AlertEvent::AlertRaised(alice())).ok();
        assert_eq!(
            json,
            Some(serde_json::json!({
                "event": "alert",
                "data": {
                    "name": "Alice",
                    "message": "help",
                    "location": { "x": "10", "y": "20" }
                }
            }))
        );
    }

    #[test]
    fn cleared_event_has_no_data() {
        let json = serde_json::to_value(AlertEvent::AlertCleared).ok();
        assert_eq!(json, Some(serde_json::json!({ "event": "clear-alert" })));
    }

    #[test]
    fn state_encoding() {
        let idle = serde_json::to_value(AlertState::Idle).ok();
        assert_eq!(idle, Some(serde_json::json!({ "status": "idle" })));

        let active = serde_json::to_value(AlertState::Active(alice())).ok();
        assert_eq!(
            active.as_ref().and_then(|v| v.get("status")).cloned(),
            Some(serde_json::json!("active"))
        );
        assert_eq!(
            active
                .as_ref()
                .and_then(|v| v.pointer("/alert/name"))
                .cloned(),
            Some(serde_json::json!("Alice"))
        );
    }

    #[test]
    fn bootstrap_event_reflects_state() {
        assert_eq!(AlertEvent::from(&AlertState::Idle), AlertEvent::AlertCleared);
        assert_eq!(
            AlertEvent::from(&AlertState::Active(alice())),
            AlertEvent::AlertRaised(alice())
        );
    }

    #[test]
    fn default_state_is_idle() {
        let state = AlertState::default();
        assert!(!state.is_active());
        assert!(state.payload().is_none());
    }

    #[test]
    fn message_defaults_to_empty() {
        let raw = r#"{"name":"Bob","location":{"x":"1","y":"2"}}"#;
        let payload: Result<AlertPayload, _> = serde_json::from_str(raw);
        assert!(payload.is_ok());
        assert_eq!(payload.map(|p| p.message).unwrap_or_default(), "");
    }

    #[test]
    fn well_formed_payload_validates() {
        assert!(alice().validate().is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        let payload = AlertPayload::new("   ", "help", "10", "20");
        let errors = payload.validate();
        assert!(errors.is_err());
        let field_errors = errors.err().map(|e| e.field_errors().len());
        assert_eq!(field_errors, Some(1));
    }

    #[test]
    fn blank_coordinate_is_rejected() {
        let payload = AlertPayload::new("Alice", "help", "", "20");
        assert!(payload.validate().is_err());
    }

    #[test]
    fn oversized_message_is_rejected() {
        let long = "x".repeat(3000);
        let payload = AlertPayload::new("Alice", long, "10", "20");
        assert!(payload.validate().is_err());
    }
}
