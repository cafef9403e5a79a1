//! Shared type definitions for the Beacon alert relay.
//!
//! This crate is the single source of truth for everything that crosses
//! the wire between the relay, its senders, and its observers. Types
//! defined here flow downstream to `TypeScript` via `ts-rs` for the
//! mobile client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for session identifiers
//! - [`alert`] -- Alert payload, current alert state, and pushed events

pub mod alert;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use alert::{AlertEvent, AlertLocation, AlertPayload, AlertState};
pub use ids::SessionId;
