//! Notifications from the session to the UI layer.

use tokio::sync::mpsc;

use crate::state::ConnectionState;

/// Receives session state changes. Called on the thread that caused them.
pub trait NotificationSink: Send + Sync {
    fn on_connection_state_changed(&self, state: ConnectionState);

    /// `true` when a resolution change starts, `false` when it completes.
    fn on_resolution_change_state_changed(&self, pending: bool);
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn on_connection_state_changed(&self, _state: ConnectionState) {}

    fn on_resolution_change_state_changed(&self, _pending: bool) {}
}

// ── ChannelSink ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    ConnectionChanged(ConnectionState),
    ResolutionChange { pending: bool },
}

/// Forwards notifications as [`SessionEvent`]s over an mpsc channel.
///
/// Events sent after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn on_connection_state_changed(&self, state: ConnectionState) {
        let _ = self.tx.send(SessionEvent::ConnectionChanged(state));
    }

    fn on_resolution_change_state_changed(&self, pending: bool) {
        let _ = self.tx.send(SessionEvent::ResolutionChange { pending });
    }
}
