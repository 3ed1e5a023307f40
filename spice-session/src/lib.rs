//! # spice-session
//!
//! Session core of a SPICE remote desktop client: bringing a connection up
//! and down, pulling guest frames and tracking resolution changes, and
//! forwarding local pointer and keyboard input.
//!
//! The protocol engine itself sits behind the [`Transport`] trait, and the
//! UI layer hears about state changes through a [`NotificationSink`].
//!
//! ```text
//!  caller ──set_parameters──► Session ──spawn_blocking──► ConnectWorker
//!    │                          │  ▲                          │
//!    │  connect().await         │  │ is_connected() × 15      ▼
//!    │  update_display()  ──────┼──┴────────────────────► Transport
//!    │  motion/button/key ──────┘                             │
//!    ▼                                                        │
//!  NotificationSink ◄── connection / resolution changes ──────┘
//! ```
//!
//! ## Modules
//!
//! | Module      | Purpose                                              |
//! |-------------|------------------------------------------------------|
//! | `session`   | Connection state machine, display pipeline, input    |
//! | `params`    | Immutable connection parameters and their store      |
//! | `state`     | Connection / display state and their watch channels  |
//! | `worker`    | Background login worker and its retirement policy    |
//! | `display`   | Guest/local geometry, pointer scale, update flags    |
//! | `input`     | Button mask and input forwarding                     |
//! | `transport` | The protocol engine capability                       |
//! | `notify`    | UI notification sinks                                |
//! | `config`    | TOML configuration                                   |
//! | `logging`   | `tracing` subscriber bootstrap                       |
//! | `error`     | `EngineError`                                        |

pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod logging;
pub mod notify;
pub mod params;
pub mod session;
pub mod state;
pub mod transport;
mod worker;

// ── Re-exports ───────────────────────────────────────────────────

pub use config::{EngineConfig, LateConnectPolicy, WorkerPolicy};
pub use display::{DisplayFlags, DisplayUpdate, MouseFix};
pub use error::EngineError;
pub use input::{ButtonMask, MouseButton};
pub use notify::{ChannelSink, NotificationSink, NullSink, SessionEvent};
pub use params::ConnectionParameters;
pub use session::{LIVENESS_POLL_ATTEMPTS, LIVENESS_POLL_INTERVAL, Session, SharedSession};
pub use state::{ConnectionState, DisplayState};
pub use transport::{ConnectRequest, FrameError, GuestSize, Transport};
pub use worker::WORKER_JOIN_TIMEOUT;
