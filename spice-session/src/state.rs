//! Connection and display state.
//!
//! Both are two-valued and owned by the [`Session`](crate::Session); other
//! threads observe them through `watch` receivers.
//!
//! ```text
//!                 connect() ok
//!  Disconnected ───────────────► Connected
//!       ▲                            │
//!       └─── disconnect() / lost ────┘
//! ```

use std::fmt;

use tokio::sync::watch;

// ── ConnectionState ──────────────────────────────────────────────

/// Whether the session has a live connection to the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connected => write!(f, "Connected"),
        }
    }
}

// ── DisplayState ─────────────────────────────────────────────────

/// Whether display updates should be pulled from the transport.
///
/// Cleared before the transport is torn down, set only after a successful
/// connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayState {
    #[default]
    Disconnected,
    Connected,
}

impl DisplayState {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connected => write!(f, "Connected"),
        }
    }
}

// ── StateCell ────────────────────────────────────────────────────

/// A single-writer value published to any number of observers.
///
/// Writes never fail, even with no receivers alive.
#[derive(Debug)]
pub(crate) struct StateCell<T> {
    tx: watch::Sender<T>,
}

impl<T: Copy + PartialEq> StateCell<T> {
    pub(crate) fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    pub(crate) fn get(&self) -> T {
        *self.tx.borrow()
    }

    pub(crate) fn set(&self, value: T) {
        self.tx.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

// ── Tests ────────────────────────────────────────────────────────
