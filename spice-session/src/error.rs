//! Error types for the session core.
//!
//! Every fallible session operation returns `Result<T, EngineError>`.
//! Nothing in this crate panics on bad input or on a misbehaving transport.

use std::time::Duration;
use thiserror::Error;

/// The canonical error type for the session core.
#[derive(Debug, Error)]
pub enum EngineError {
    // ── Caller Errors ────────────────────────────────────────────
    /// A required argument was missing or unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The configuration file could not be parsed.
    #[error("config error: {0}")]
    Config(String),

    // ── Connection Errors ────────────────────────────────────────
    /// The transport never reported a live connection within the poll window.
    #[error("connect timed out after {attempts} liveness checks ({waited:?})")]
    ConnectTimeout { attempts: u32, waited: Duration },

    /// The transport returned a nonzero status from a lifecycle call.
    #[error("transport {op} failed with status {code}")]
    TransportFailure { op: &'static str, code: i32 },

    // ── Display Errors ───────────────────────────────────────────
    /// The guest frame is larger than the local renderer can hold.
    #[error("guest resolution too large for the local renderer")]
    ResolutionTooLarge,

    /// The transport could not fill the display buffer.
    #[error("display read failed with status {code} (connection lost: {connection_lost})")]
    DisplayReadFailed { code: i32, connection_lost: bool },

    // ── Worker Errors ────────────────────────────────────────────
    /// The connect worker was cancelled before it issued its connect call.
    #[error("connect worker cancelled")]
    Cancelled,

    /// The connect worker panicked or was aborted.
    #[error("connect worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl EngineError {
    /// Whether the session is still usable as-is after this error.
    ///
    /// A too-large frame or a transient read failure leaves the connection
    /// intact. A lost connection or a timed-out connect leaves the session
    /// `Disconnected`, which is also recoverable by calling `connect()`
    /// again, so only caller and worker faults report `false` here.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::ResolutionTooLarge
            | Self::ConnectTimeout { .. }
            | Self::TransportFailure { .. }
            | Self::DisplayReadFailed { .. } => true,
            Self::InvalidArgument(_) | Self::Config(_) | Self::Cancelled | Self::Join(_) => false,
        }
    }

    /// Whether this error was accompanied by a transition to `Disconnected`.
    pub fn is_connection_lost(&self) -> bool {
        matches!(
            self,
            Self::DisplayReadFailed {
                connection_lost: true,
                ..
            }
        )
    }
}

// ── Convenient From implementations ──────────────────────────────

impl From<toml::de::Error> for EngineError {
    fn from(e: toml::de::Error) -> Self {
        EngineError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let e = EngineError::ConnectTimeout {
            attempts: 15,
            waited: Duration::from_secs(15),
        };
        assert!(e.to_string().contains("15 liveness checks"));

        let e = EngineError::TransportFailure {
            op: "connect",
            code: -7,
        };
        assert!(e.to_string().contains("connect"));
        assert!(e.to_string().contains("-7"));
    }

    #[test]
    fn connection_lost_only_for_lost_reads() {
        let lost = EngineError::DisplayReadFailed {
            code: -1,
            connection_lost: true,
        };
        let transient = EngineError::DisplayReadFailed {
            code: -1,
            connection_lost: false,
        };
        assert!(lost.is_connection_lost());
        assert!(!transient.is_connection_lost());
        assert!(!EngineError::ResolutionTooLarge.is_connection_lost());
    }

    #[test]
    fn recoverable_classification() {
        assert!(EngineError::ResolutionTooLarge.is_recoverable());
        assert!(!EngineError::InvalidArgument("host").is_recoverable());
        assert!(!EngineError::Cancelled.is_recoverable());
    }

    #[test]
    fn from_toml() {
        let err = toml::from_str::<toml::Value>("= nope").unwrap_err();
        let e: EngineError = err.into();
        assert!(matches!(e, EngineError::Config(_)));
    }
}
