//! Session configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::params::ConnectionParameters;
use crate::transport::GuestSize;

/// Top-level configuration for a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Connect worker behaviour.
    pub session: SessionConfig,
    /// Local renderer settings.
    pub display: DisplayConfig,
    /// Logging.
    pub logging: LoggingConfig,
    /// Optional preset target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetConfig>,
}

/// What happens to the connect worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerPolicy {
    /// Never joined or cancelled; a worker outliving a timed-out connect
    /// is left to finish on its own.
    #[default]
    Detach,
    /// Cancelled on timeout, disconnect and shutdown, then awaited.
    Cancel,
}

/// What happens when a timed-out connect succeeds later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LateConnectPolicy {
    /// Stay `Disconnected` until the caller connects again.
    #[default]
    Ignore,
    /// Promote the session to `Connected` on the next `reconcile()`.
    Adopt,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub worker: WorkerPolicy,
    pub late_connect: LateConnectPolicy,
}

/// Local renderer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Local renderer width, the denominator of the pointer scale.
    pub local_width: u32,
    /// Local renderer height.
    pub local_height: u32,
}

/// Logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive.
    pub level: String,
    /// Verbosity handed to the transport's own logger.
    pub transport_verbosity: i32,
}

/// Preset connection target. Every field must be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetConfig {
    pub host: Option<String>,
    pub port: Option<String>,
    pub ws_port: Option<String>,
    pub password: Option<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            local_width: 800,
            local_height: 600,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            transport_verbosity: 0,
        }
    }
}

impl DisplayConfig {
    pub fn local_size(&self) -> GuestSize {
        GuestSize::new(self.local_width, self.local_height)
    }
}

impl TargetConfig {
    pub fn to_parameters(&self) -> Result<ConnectionParameters, EngineError> {
        ConnectionParameters::from_parts(
            self.host.as_deref(),
            self.port.as_deref(),
            self.ws_port.as_deref(),
            self.password.as_deref(),
        )
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl EngineConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, EngineError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(_) => {
                tracing::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Render as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String, EngineError> {
        toml::to_string_pretty(self).map_err(|e| EngineError::Config(e.to_string()))
    }
}

// ── Tests ────────────────────────────────────────────────────────
