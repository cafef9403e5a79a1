//! Configuration loading and typed config structures for the relay.
//!
//! The configuration lives in `beacon-config.yaml` next to the binary's
//! working directory. Every field has a default, so an empty or missing
//! file yields a usable relay listening on `0.0.0.0:3000`.
//!
//! Environment variables override the file for deployment-specific values:
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `PORT` | `server.port` |
//! | `BEACON_HOST` | `server.host` |
//! | `BEACON_ALLOWED_ORIGINS` | `cors.allowed_origins` (comma-separated) |

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level relay configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RelayConfig {
    /// Listen address.
    #[serde(default)]
    pub server: ServerConfig,

    /// Cross-origin policy for the control surface.
    #[serde(default)]
    pub cors: CorsConfig,

    /// Per-session delivery limits.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Raise request handling.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RelayConfig {
    /// Load configuration from a YAML file and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Override fields from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override fields from `lookup`, which maps a variable name to its
    /// value when set.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("PORT") {
            match raw.trim().parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(e) => warn!(value = %raw, error = %e, "ignoring invalid PORT"),
            }
        }
        if let Some(host) = lookup("BEACON_HOST") {
            self.server.host = host;
        }
        if let Some(origins) = lookup("BEACON_ALLOWED_ORIGINS") {
            self.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
    }
}

/// Listen address configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// The host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Cross-origin policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins. A single `*` allows any origin.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// Whether any origin is allowed.
    pub fn allows_any(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

/// Per-session delivery limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeliveryConfig {
    /// How long a single session may take to accept an event before it is
    /// treated as failed.
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,

    /// Outbound queue capacity per session.
    #[serde(default = "default_session_buffer")]
    pub session_buffer: usize,
}

impl DeliveryConfig {
    /// The send timeout as a [`Duration`].
    pub const fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            send_timeout_ms: default_send_timeout_ms(),
            session_buffer: default_session_buffer(),
        }
    }
}

/// How raise payloads are checked before they reach the alert state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Reject payloads with a blank name or coordinates, or oversized fields.
    #[default]
    Strict,
    /// Accept any well-formed JSON payload as-is.
    Passthrough,
}

/// Raise request handling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DispatchConfig {
    /// Payload validation mode.
    #[serde(default)]
    pub validation: ValidationMode,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    3000
}

fn default_allowed_origins() -> Vec<String> {
    vec![String::from("*")]
}

const fn default_send_timeout_ms() -> u64 {
    1000
}

const fn default_session_buffer() -> usize {
    32
}

fn default_log_level() -> String {
    String::from("info")
}
