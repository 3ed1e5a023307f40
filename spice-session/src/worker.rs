//! Background connect worker.
//!
//! One worker is spawned per `connect()` call. It runs on tokio's blocking
//! pool because every transport call blocks, and it only ever talks to the
//! transport, never to session state. The session keeps the handle so the
//! configured [`WorkerPolicy`] can detach it or cancel it. A timed-out
//! `connect()` only sets the stop flag; the join happens on disconnect or
//! shutdown.
//! Cancellation is a stop flag checked between `init()` and `connect()`;
//! a transport call already in progress is never interrupted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::WorkerPolicy;
use crate::error::EngineError;
use crate::params::ConnectionParameters;
use crate::transport::{ConnectRequest, Transport};

/// Upper bound on how long a cancelled worker is awaited.
pub const WORKER_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

// ── WorkerContext ────────────────────────────────────────────────

/// Everything the worker needs, moved onto the blocking thread.
pub(crate) struct WorkerContext {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) params: Arc<ConnectionParameters>,
    pub(crate) verbosity: i32,
    /// Guards the transport's logging setup across reconnects.
    pub(crate) logging: Arc<Once>,
}

impl WorkerContext {
    /// Initialise the transport and issue the connect call.
    ///
    /// `handshake` is signalled once the connect call returns, whatever
    /// its status.
    pub(crate) fn run(
        self,
        cancelled: &AtomicBool,
        handshake: &watch::Sender<bool>,
    ) -> Result<(), EngineError> {
        let transport = self.transport.as_ref();

        self.logging.call_once(|| {
            debug!(verbosity = self.verbosity, "initializing transport logging");
            transport.init_logging(self.verbosity);
        });

        let status = transport.init();
        debug!(status, "transport init");
        if status != 0 {
            warn!(status, "transport init reported failure; connecting anyway");
        }

        if cancelled.load(Ordering::SeqCst) {
            debug!("connect worker cancelled before connect call");
            return Err(EngineError::Cancelled);
        }

        let p = &self.params;
        let request = ConnectRequest {
            host: &p.host,
            port: &p.port,
            secure_port: "",
            ws_port: &p.ws_port,
            password: &p.password,
            ca_file: None,
            cert_subject: None,
            flags: 0,
        };
        let status = transport.connect(&request);
        debug!(status, "transport connect returned");
        let _ = handshake.send(true);

        if status == 0 {
            Ok(())
        } else {
            Err(EngineError::TransportFailure {
                op: "connect",
                code: status,
            })
        }
    }
}

// ── ConnectWorker ────────────────────────────────────────────────

/// Handle to a spawned connect worker.
pub(crate) struct ConnectWorker {
    handle: JoinHandle<Result<(), EngineError>>,
    cancelled: Arc<AtomicBool>,
    handshake: watch::Receiver<bool>,
}

impl ConnectWorker {
    /// Spawn the worker on the blocking pool. Must be called from within a
    /// tokio runtime.
    pub(crate) fn spawn(ctx: WorkerContext) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let (handshake_tx, handshake) = watch::channel(false);

        let flag = Arc::clone(&cancelled);
        let handle = tokio::task::spawn_blocking(move || ctx.run(&flag, &handshake_tx));

        Self {
            handle,
            cancelled,
            handshake,
        }
    }

    /// Receiver that changes once the connect call has returned.
    ///
    /// It reports closed if the worker ends without reaching the call.
    pub(crate) fn handshake(&self) -> watch::Receiver<bool> {
        self.handshake.clone()
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub(crate) fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Drop the handle without waiting. Under `Cancel` the stop flag is set
    /// first.
    pub(crate) fn release(self, policy: WorkerPolicy) {
        if policy == WorkerPolicy::Cancel {
            self.cancel();
        }
        if !self.is_finished() {
            debug!(?policy, "releasing unfinished connect worker");
        }
    }

    /// Let go of the worker according to `policy`, awaiting it for at most
    /// [`WORKER_JOIN_TIMEOUT`] under `Cancel`.
    pub(crate) async fn retire(self, policy: WorkerPolicy) {
        match policy {
            WorkerPolicy::Detach => {
                if !self.is_finished() {
                    debug!("detaching unfinished connect worker");
                }
            }
            WorkerPolicy::Cancel => {
                self.cancel();
                match tokio::time::timeout(WORKER_JOIN_TIMEOUT, self.handle).await {
                    Ok(Ok(Ok(()))) => debug!("connect worker finished"),
                    Ok(Ok(Err(e))) => debug!(error = %e, "connect worker ended with error"),
                    Ok(Err(e)) => warn!(error = %EngineError::from(e), "connect worker did not complete"),
                    Err(_) => warn!(
                        "connect worker still busy after {WORKER_JOIN_TIMEOUT:?}; detaching"
                    ),
                }
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
