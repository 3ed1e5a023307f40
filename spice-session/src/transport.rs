//! The transport capability consumed by the session.
//!
//! A transport wraps the remote-display protocol engine: network I/O,
//! decoding and the guest framebuffer. The session never looks inside it.
//! All calls are blocking; the session runs the connect handshake on a
//! blocking worker and everything else on the caller's task.

use crate::input::ButtonMask;

// ── ConnectRequest ───────────────────────────────────────────────

/// Arguments of a single connect call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectRequest<'a> {
    pub host: &'a str,
    pub port: &'a str,
    /// TLS port. The session always passes an empty string.
    pub secure_port: &'a str,
    pub ws_port: &'a str,
    pub password: &'a str,
    /// CA certificate file, if the transport should verify TLS.
    pub ca_file: Option<&'a str>,
    /// Expected certificate subject.
    pub cert_subject: Option<&'a str>,
    /// Transport-specific flags.
    pub flags: u32,
}

// ── GuestSize ────────────────────────────────────────────────────

/// Guest display dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GuestSize {
    pub width: u32,
    pub height: u32,
}

impl GuestSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Both dimensions nonzero.
    pub const fn is_known(self) -> bool {
        self.width != 0 && self.height != 0
    }
}

// ── FrameError ───────────────────────────────────────────────────

/// Why a display buffer update failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// The guest framebuffer does not fit the local renderer.
    TooLarge,
    /// Any other failure, with the transport's status code.
    Failed(i32),
}

impl FrameError {
    /// Status code a C-style transport uses for a too-large guest frame.
    pub const TOO_LARGE_STATUS: i32 = -2;

    /// Map a C-style status code: `0` is success, `-2` is too large,
    /// anything else is a failure.
    pub fn from_status(status: i32) -> Option<Self> {
        match status {
            0 => None,
            Self::TOO_LARGE_STATUS => Some(Self::TooLarge),
            code => Some(Self::Failed(code)),
        }
    }

    pub fn status(self) -> i32 {
        match self {
            Self::TooLarge => Self::TOO_LARGE_STATUS,
            Self::Failed(code) => code,
        }
    }
}

// ── Transport ────────────────────────────────────────────────────

/// Primitive operations of the remote-display protocol engine.
///
/// Status-returning calls use `0` for success.
pub trait Transport: Send + Sync + 'static {
    /// Set up the engine's own logging. Called at most once per session.
    fn init_logging(&self, verbosity: i32);

    /// Initialise the engine's runtime.
    fn init(&self) -> i32;

    /// Start the login handshake.
    ///
    /// Returning does not mean the connection is up; the session watches
    /// [`is_connected`](Self::is_connected) for that.
    fn connect(&self, request: &ConnectRequest<'_>) -> i32;

    fn disconnect(&self);

    fn is_connected(&self) -> bool;

    /// Copy the current guest frame into `buffer` and report its size.
    fn update_display_buffer(&self, buffer: &mut [u8]) -> Result<GuestSize, FrameError>;

    fn send_motion(&self, x: i32, y: i32, buttons: ButtonMask);

    fn send_button(&self, x: i32, y: i32, button: i32, modifiers: u32, down: bool);

    fn send_key(&self, down: bool, keycode: i32);

    /// Ask the guest to reconfigure its display to the given geometry.
    fn recalc_geometry(&self, x: i32, y: i32, width: u32, height: u32);
}

// ── Tests ────────────────────────────────────────────────────────
