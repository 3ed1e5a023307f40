//! Connection parameters and the store that owns them.
//!
//! Parameters are an immutable value. Updating them builds a complete new
//! record and swaps it in, so anyone still holding the previous
//! `Arc<ConnectionParameters>` keeps a whole, consistent copy.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// ── ConnectionParameters ─────────────────────────────────────────

/// Where and how to reach the guest.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParameters {
    /// Host name or address of the display server.
    pub host: String,
    /// Plain-text port.
    pub port: String,
    /// WebSocket port, used by transports that tunnel over WebSockets.
    pub ws_port: String,
    /// Session password.
    pub password: String,
}

impl ConnectionParameters {
    pub fn new(
        host: impl Into<String>,
        port: impl Into<String>,
        ws_port: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
            ws_port: ws_port.into(),
            password: password.into(),
        }
    }

    /// Build parameters from optional parts, e.g. values handed over an FFI
    /// boundary or read from a partially filled config table.
    ///
    /// Empty strings are accepted; absent values are not.
    pub fn from_parts(
        host: Option<&str>,
        port: Option<&str>,
        ws_port: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, EngineError> {
        let host = host.ok_or(EngineError::InvalidArgument("host"))?;
        let port = port.ok_or(EngineError::InvalidArgument("port"))?;
        let ws_port = ws_port.ok_or(EngineError::InvalidArgument("ws_port"))?;
        let password = password.ok_or(EngineError::InvalidArgument("password"))?;
        Ok(Self::new(host, port, ws_port, password))
    }
}

impl fmt::Debug for ConnectionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParameters")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("ws_port", &self.ws_port)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ── ParameterStore ───────────────────────────────────────────────

/// Holds the current target. Empty until the first [`set`](Self::set).
#[derive(Debug, Default)]
pub struct ParameterStore {
    current: Option<Arc<ConnectionParameters>>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored record with a freshly built one.
    ///
    /// The previous record is released only after the new one is in place.
    pub fn set(
        &mut self,
        host: &str,
        port: &str,
        ws_port: &str,
        password: &str,
    ) -> Arc<ConnectionParameters> {
        self.replace(ConnectionParameters::new(host, port, ws_port, password))
    }

    /// Swap in an already built record, returning the shared handle to it.
    pub fn replace(&mut self, params: ConnectionParameters) -> Arc<ConnectionParameters> {
        let next = Arc::new(params);
        let _previous = self.current.replace(Arc::clone(&next));
        next
    }

    /// The current record, if one has been set.
    pub fn current(&self) -> Option<Arc<ConnectionParameters>> {
        self.current.clone()
    }

    /// The current record, or `InvalidArgument` if none has been set.
    pub fn require(&self) -> Result<Arc<ConnectionParameters>, EngineError> {
        self.current()
            .ok_or(EngineError::InvalidArgument("connection parameters not set"))
    }
}

// ── Tests ────────────────────────────────────────────────────────
