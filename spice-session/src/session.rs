//! The session: connection state machine, display pipeline and input
//! forwarding over one transport.
//!
//! A `Session` is an owned value. Every operation takes `&mut self`, so a
//! single caller drives all transitions; hosts that need to share it wrap
//! the whole session in one mutex ([`SharedSession`]) so multi-step
//! transitions stay atomic to other readers.

use std::sync::{Arc, Once};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::config::{EngineConfig, LateConnectPolicy, WorkerPolicy};
use crate::display::{DisplayFlags, DisplayUpdate, Geometry, MouseFix};
use crate::error::EngineError;
use crate::input::{ButtonMask, InputTranslator};
use crate::notify::NotificationSink;
use crate::params::{ConnectionParameters, ParameterStore};
use crate::state::{ConnectionState, DisplayState, StateCell};
use crate::transport::{FrameError, GuestSize, Transport};
use crate::worker::{ConnectWorker, WorkerContext};

/// Number of liveness checks `connect()` makes before giving up.
pub const LIVENESS_POLL_ATTEMPTS: u32 = 15;

/// Spacing between liveness checks.
pub const LIVENESS_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A session shared between tasks.
pub type SharedSession = Arc<tokio::sync::Mutex<Session>>;

// ── Session ──────────────────────────────────────────────────────

pub struct Session {
    transport: Arc<dyn Transport>,
    sink: Arc<dyn NotificationSink>,
    params: ParameterStore,

    conn_state: StateCell<ConnectionState>,
    display_state: StateCell<DisplayState>,

    geometry: Geometry,
    input: InputTranslator,
    resolution_pending: bool,
    input_initialized: bool,

    worker: Option<ConnectWorker>,
    worker_policy: WorkerPolicy,
    late_connect: LateConnectPolicy,
    transport_verbosity: i32,
    transport_logging: Arc<Once>,
}

impl Session {
    /// Create a session with default configuration and no target.
    pub fn new(transport: Arc<dyn Transport>, sink: Arc<dyn NotificationSink>) -> Self {
        let config = EngineConfig::default();
        Self {
            transport,
            sink,
            params: ParameterStore::new(),
            conn_state: StateCell::new(ConnectionState::Disconnected),
            display_state: StateCell::new(DisplayState::Disconnected),
            geometry: Geometry::new(config.display.local_size()),
            input: InputTranslator::new(),
            resolution_pending: false,
            input_initialized: false,
            worker: None,
            worker_policy: config.session.worker,
            late_connect: config.session.late_connect,
            transport_verbosity: config.logging.transport_verbosity,
            transport_logging: Arc::new(Once::new()),
        }
    }

    /// Create a session from a loaded configuration.
    ///
    /// Fails with `InvalidArgument` if the config carries an incomplete
    /// `[target]` table.
    pub fn with_config(
        transport: Arc<dyn Transport>,
        sink: Arc<dyn NotificationSink>,
        config: &EngineConfig,
    ) -> Result<Self, EngineError> {
        let mut session = Self::new(transport, sink);
        session.geometry = Geometry::new(config.display.local_size());
        session.worker_policy = config.session.worker;
        session.late_connect = config.session.late_connect;
        session.transport_verbosity = config.logging.transport_verbosity;
        if let Some(target) = &config.target {
            session.params.replace(target.to_parameters()?);
        }
        Ok(session)
    }

    /// Wrap the session for sharing between tasks.
    pub fn into_shared(self) -> SharedSession {
        Arc::new(tokio::sync::Mutex::new(self))
    }

    // ── Parameters ───────────────────────────────────────────────

    /// Replace the connection target. Takes effect on the next `connect()`.
    pub fn set_parameters(&mut self, host: &str, port: &str, ws_port: &str, password: &str) {
        self.params.set(host, port, ws_port, password);
    }

    pub fn set_connection_parameters(&mut self, params: ConnectionParameters) {
        self.params.replace(params);
    }

    pub fn parameters(&self) -> Option<Arc<ConnectionParameters>> {
        self.params.current()
    }

    // ── State queries ────────────────────────────────────────────

    pub fn connection_state(&self) -> ConnectionState {
        self.conn_state.get()
    }

    pub fn display_state(&self) -> DisplayState {
        self.display_state.get()
    }

    /// Observe connection state from another task or thread.
    pub fn connection_state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.conn_state.subscribe()
    }

    /// Observe display state, e.g. from a render thread deciding whether
    /// to keep pulling frames.
    pub fn display_state_receiver(&self) -> watch::Receiver<DisplayState> {
        self.display_state.subscribe()
    }

    /// Ask the transport directly. Does not touch session state.
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    pub fn guest_size(&self) -> GuestSize {
        self.geometry.guest()
    }

    /// Size of the local renderer the pointer scale is computed against.
    pub fn local_size(&self) -> GuestSize {
        self.geometry.local()
    }

    pub fn mouse_fix(&self) -> MouseFix {
        self.geometry.mouse_fix()
    }

    pub fn buttons(&self) -> ButtonMask {
        self.input.buttons()
    }

    pub fn resolution_change_pending(&self) -> bool {
        self.resolution_pending
    }

    /// Whether a connect worker handle is still held.
    pub fn has_connect_worker(&self) -> bool {
        self.worker.is_some()
    }

    // ── Connect / disconnect ─────────────────────────────────────

    /// Bring the connection up.
    ///
    /// Spawns the login worker, then checks transport liveness up to
    /// [`LIVENESS_POLL_ATTEMPTS`] times, [`LIVENESS_POLL_INTERVAL`] apart.
    /// The wait after a check ends early once the worker's connect call
    /// returns. Already connected is a successful no-op.
    ///
    /// Never waits on the worker itself: on timeout the handle is kept,
    /// with its stop flag set under [`WorkerPolicy::Cancel`].
    pub async fn connect(&mut self) -> Result<(), EngineError> {
        if self.conn_state.get().is_connected() {
            return Ok(());
        }
        let params = self.params.require()?;
        if let Some(previous) = self.worker.take() {
            previous.release(self.worker_policy);
        }

        info!(host = %params.host, port = %params.port, ws_port = %params.ws_port, "connecting");
        let worker = ConnectWorker::spawn(WorkerContext {
            transport: Arc::clone(&self.transport),
            params,
            verbosity: self.transport_verbosity,
            logging: Arc::clone(&self.transport_logging),
        });
        let mut handshake = Some(worker.handshake());
        self.worker = Some(worker);

        let started = Instant::now();
        for attempt in 1..=LIVENESS_POLL_ATTEMPTS {
            if self.transport.is_connected() {
                self.enter_connected();
                info!(attempt, "connected");
                return Ok(());
            }
            wait_for_handshake(&mut handshake, Instant::now() + LIVENESS_POLL_INTERVAL).await;
        }

        if self.worker_policy == WorkerPolicy::Cancel {
            if let Some(worker) = &self.worker {
                worker.cancel();
            }
        }
        let waited = started.elapsed();
        warn!(?waited, "transport never reported connected");
        Err(EngineError::ConnectTimeout {
            attempts: LIVENESS_POLL_ATTEMPTS,
            waited,
        })
    }

    /// Tear the connection down. No-op when already disconnected.
    pub async fn disconnect(&mut self) {
        if !self.conn_state.get().is_connected() {
            return;
        }
        info!("disconnecting");
        self.enter_disconnected(true);
        self.retire_worker().await;
    }

    /// Adopt a connection that came up after `connect()` timed out.
    ///
    /// Only acts under [`LateConnectPolicy::Adopt`] while an uncancelled
    /// worker from the timed-out attempt is still held. Returns `true` if
    /// the session became connected.
    pub fn reconcile(&mut self) -> bool {
        if self.late_connect != LateConnectPolicy::Adopt
            || self.conn_state.get().is_connected()
            || !self.worker.as_ref().is_some_and(|w| !w.is_cancelled())
            || !self.transport.is_connected()
        {
            return false;
        }
        info!("adopting late connection");
        self.enter_connected();
        self.sink.on_connection_state_changed(ConnectionState::Connected);
        true
    }

    /// Disconnect and release the connect worker per the worker policy.
    pub async fn shutdown(mut self) {
        self.disconnect().await;
        self.retire_worker().await;
    }

    fn enter_connected(&mut self) {
        self.display_state.set(DisplayState::Connected);
        self.conn_state.set(ConnectionState::Connected);
    }

    /// Leave the connected state. Display consumption always stops before
    /// the transport is touched.
    fn enter_disconnected(&mut self, teardown_transport: bool) {
        self.display_state.set(DisplayState::Disconnected);
        if teardown_transport {
            self.transport.disconnect();
        }
        self.conn_state.set(ConnectionState::Disconnected);
        self.input_initialized = false;
        self.sink.on_connection_state_changed(ConnectionState::Disconnected);
    }

    async fn retire_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.retire(self.worker_policy).await;
        }
    }

    // ── Display ──────────────────────────────────────────────────

    /// Pull the latest guest frame into `buffer`.
    ///
    /// Returns an empty flag set without touching the transport while
    /// display consumption is stopped.
    pub fn update_display(&mut self, buffer: &mut [u8]) -> Result<DisplayUpdate, EngineError> {
        if !self.display_state.get().is_active() {
            return Ok(DisplayUpdate::idle());
        }

        if !self.input_initialized {
            // The transport's read path only arms after one outbound event.
            trace!("sending warm-up motion");
            self.input.motion(self.transport.as_ref(), 0, 0);
            self.input_initialized = true;
        }

        let size = match self.transport.update_display_buffer(buffer) {
            Ok(size) => size,
            Err(FrameError::TooLarge) => return Err(EngineError::ResolutionTooLarge),
            Err(FrameError::Failed(code)) => {
                debug!(code, "can't update screen");
                let lost =
                    self.conn_state.get().is_connected() && !self.transport.is_connected();
                if lost {
                    warn!(code, "connection lost while reading display");
                    self.enter_disconnected(false);
                }
                return Err(EngineError::DisplayReadFailed {
                    code,
                    connection_lost: lost,
                });
            }
        };

        let mut flags = DisplayFlags::INVALIDATE;
        if self.geometry.observe(size) {
            debug!(width = size.width, height = size.height, "guest resolution changed");
            flags |= DisplayFlags::CHANGE_RESOLUTION;
        }
        Ok(DisplayUpdate { flags, size })
    }

    /// The local renderer was resized; rescales pointer input.
    pub fn set_local_size(&mut self, width: u32, height: u32) {
        self.geometry.set_local(GuestSize::new(width, height));
    }

    /// Ask the guest for a new display geometry.
    pub fn request_resolution(&mut self, width: u32, height: u32) {
        self.transport.recalc_geometry(0, 0, width, height);
        if !self.resolution_pending {
            self.resolution_pending = true;
            self.sink.on_resolution_change_state_changed(true);
        }
    }

    /// The guest acknowledged the requested geometry.
    pub fn resolution_changed(&mut self) {
        if self.resolution_pending {
            self.resolution_pending = false;
            self.sink.on_resolution_change_state_changed(false);
        }
    }

    // ── Input ────────────────────────────────────────────────────

    pub fn motion_event(&mut self, x: i32, y: i32) {
        self.input.motion(self.transport.as_ref(), x, y);
    }

    pub fn button_event(&mut self, x: i32, y: i32, button: i32, down: bool) {
        self.input.button(self.transport.as_ref(), x, y, button, down);
    }

    pub fn keyboard_event(&mut self, keycode: i32, down: bool) {
        self.input.key(self.transport.as_ref(), keycode, down);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.worker_policy == WorkerPolicy::Cancel {
            if let Some(worker) = &self.worker {
                worker.cancel();
            }
        }
    }
}

/// Wait until `deadline`, or until the worker's connect call returns.
///
/// The handshake signal fires at most once; afterwards only the deadline
/// counts.
async fn wait_for_handshake(handshake: &mut Option<watch::Receiver<bool>>, deadline: Instant) {
    let Some(rx) = handshake.as_mut() else {
        tokio::time::sleep_until(deadline).await;
        return;
    };
    match tokio::time::timeout_at(deadline, rx.changed()).await {
        Err(_elapsed) => {}
        Ok(Ok(())) => *handshake = None,
        Ok(Err(_closed)) => {
            *handshake = None;
            tokio::time::sleep_until(deadline).await;
        }
    }
}
