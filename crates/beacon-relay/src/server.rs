//! Relay HTTP server lifecycle management.
//!
//! Provides [`start_server`], which binds the configured address and
//! serves the router until the shutdown future resolves. On shutdown every
//! observer session is dropped and the alert state resets to idle.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use beacon_core::config::ServerConfig;
use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// Start the relay HTTP server.
///
/// Serves requests until `shutdown` completes, then closes all observer
/// sessions. Returns `Ok(())` on clean shutdown.
///
/// # Errors
///
/// Returns an error if the address is invalid, the TCP listener cannot
/// bind, or the server encounters a fatal I/O error.
pub async fn start_server<F>(
    config: &ServerConfig,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = resolve_addr(config)?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?;

    info!(%addr, "Relay server listening");

    let relay = Arc::clone(&state.relay);
    let router = build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))?;

    relay.shutdown().await;
    info!("Relay server stopped");
    Ok(())
}

/// Parse the configured host and port into a socket address.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the pair is not a valid address.
pub fn resolve_addr(config: &ServerConfig) -> Result<SocketAddr, ServerError> {
    let host = config.host.trim_start_matches('[').trim_end_matches(']');
    let candidate = if host.contains(':') {
        format!("[{host}]:{}", config.port)
    } else {
        format!("{host}:{}", config.port)
    };
    candidate
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid address {candidate}: {e}")))
}

/// Resolve when the process receives `Ctrl-C`.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Errors that can occur when starting or running the relay server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}
