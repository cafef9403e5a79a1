//! HTTP and `WebSocket` surface of the Beacon alert relay.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **Control surface** (`POST /alert`, `POST /clear`) for trusted
//!   senders to raise and clear the alert
//! - **Push channel** (`GET /ws`) where observers receive the current
//!   alert on connect and every transition afterwards
//! - **Health** (`GET /`, `GET /health`) and a read-only view of the
//!   current alert (`GET /api/alert`)
//!
//! # Architecture
//!
//! All alert state and fan-out live in [`beacon_core::Relay`], shared
//! through [`AppState`]. Each `WebSocket` connection runs in its own task
//! that drains the session's outbound queue into the socket, so a slow or
//! broken client only ever stalls itself.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerError, shutdown_signal, start_server};
pub use state::AppState;
