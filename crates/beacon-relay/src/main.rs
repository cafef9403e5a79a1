//! Beacon relay binary.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `beacon-config.yaml` (or `BEACON_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Create the relay and shared server state
//! 4. Serve HTTP + `WebSocket` until `Ctrl-C`

use std::path::PathBuf;
use std::sync::Arc;

use beacon_core::config::{ConfigError, LogFormat, LoggingConfig, RelayConfig};
use beacon_relay::{AppState, ServerError, shutdown_signal, start_server};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "beacon-config.yaml";

/// Top-level error for the relay binary.
#[derive(Debug, thiserror::Error)]
enum RelayMainError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The server failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: ServerError,
    },
}

#[tokio::main]
async fn main() -> Result<(), RelayMainError> {
    // 1. Load configuration. Logging is not up yet, so remember whether
    //    the file was found and report it afterwards.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("beacon-relay starting");
    match &source {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        host = config.server.host,
        port = config.server.port,
        origins = ?config.cors.allowed_origins,
        send_timeout_ms = config.delivery.send_timeout_ms,
        session_buffer = config.delivery.session_buffer,
        validation = ?config.dispatch.validation,
        "Relay configuration"
    );

    // 3. Create the relay.
    let state = Arc::new(AppState::from_config(&config));

    // 4. Serve until Ctrl-C.
    start_server(&config.server, state, shutdown_signal()).await?;

    info!("beacon-relay shutdown complete");
    Ok(())
}

/// Load configuration from `BEACON_CONFIG` or `beacon-config.yaml`.
///
/// A missing file yields defaults with environment overrides applied.
fn load_config() -> Result<(RelayConfig, Option<PathBuf>), ConfigError> {
    let path = std::env::var("BEACON_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    if path.exists() {
        let config = RelayConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        let mut config = RelayConfig::default();
        config.apply_env_overrides();
        Ok((config, None))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
