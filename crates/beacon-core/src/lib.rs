//! Transport-agnostic core of the Beacon alert relay.
//!
//! The relay keeps exactly one current [`AlertState`] and pushes every
//! transition to all connected observer sessions. This crate owns that
//! state and the fan-out; the HTTP and `WebSocket` surfaces live in
//! `beacon-relay`.
//!
//! # Modules
//!
//! - [`registry`] -- Connected sessions keyed by [`SessionId`]
//! - [`holder`] -- The single current alert state
//! - [`broadcast`] -- Fan-out of one event to a registry snapshot
//! - [`lifecycle`] -- Session bootstrap on connect, cleanup on disconnect
//! - [`dispatch`] -- Raise/clear entry points and payload validation policy
//! - [`relay`] -- The [`Relay`] that wires the pieces together
//! - [`config`] -- YAML configuration with environment overrides
//! - [`error`] -- Error types
//!
//! # Ordering
//!
//! Every mutation, its broadcast, and every bootstrap push run under one
//! dispatch lock. Each observer therefore sees events in the order the
//! dispatch calls were accepted, and a newly connected observer can never
//! receive its bootstrap after a newer broadcast.
//!
//! [`AlertState`]: beacon_types::AlertState
//! [`SessionId`]: beacon_types::SessionId

pub mod broadcast;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod holder;
pub mod lifecycle;
pub mod registry;
pub mod relay;

pub use broadcast::{BroadcastEngine, BroadcastReport};
pub use config::{ConfigError, RelayConfig, ValidationMode};
pub use dispatch::{DispatchOutcome, PassThrough, StrictValidation, ValidationPolicy};
pub use error::{DeliveryError, DeliveryFailure, RelayError, ValidationError};
pub use holder::AlertStateHolder;
pub use lifecycle::SessionHandle;
pub use registry::{Session, SessionRegistry};
pub use relay::Relay;
