//! Recording transport used by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::mpsc;
use std::sync::atomic::{AtomicBool, Ordering};

use spice_session::{ButtonMask, ConnectRequest, DisplayState, FrameError, GuestSize, Transport};
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    InitLogging(i32),
    Init,
    Connect { host: String, port: String, ws_port: String },
    /// Display state observed at the moment the transport was torn down.
    Disconnect { display: Option<DisplayState> },
    IsConnected,
    UpdateDisplay,
    Motion { x: i32, y: i32, buttons: u32 },
    Button { x: i32, y: i32, button: i32, modifiers: u32, down: bool },
    Key { down: bool, keycode: i32 },
    RecalcGeometry { x: i32, y: i32, width: u32, height: u32 },
}

/// A transport that logs every call and serves scripted frames.
#[derive(Default)]
pub struct MockTransport {
    calls: Mutex<Vec<Call>>,
    connected: AtomicBool,
    /// When set, a connect call brings the link up.
    login_succeeds: AtomicBool,
    frames: Mutex<VecDeque<Result<GuestSize, FrameError>>>,
    display_probe: Mutex<Option<watch::Receiver<DisplayState>>>,
    /// When set, the connect call blocks until the paired sender fires or
    /// is dropped.
    login_gate: Mutex<Option<mpsc::Receiver<()>>>,
}

impl MockTransport {
    pub fn accepting() -> Self {
        let t = Self::default();
        t.login_succeeds.store(true, Ordering::SeqCst);
        t
    }

    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn set_connected(&self, up: bool) {
        self.connected.store(up, Ordering::SeqCst);
    }

    pub fn push_frame(&self, frame: Result<GuestSize, FrameError>) {
        self.frames.lock().unwrap().push_back(frame);
    }

    /// Make the next connect call block until the returned sender is used
    /// or dropped.
    pub fn hold_login(&self) -> mpsc::Sender<()> {
        let (tx, rx) = mpsc::channel();
        *self.login_gate.lock().unwrap() = Some(rx);
        tx
    }

    pub fn probe_display(&self, rx: watch::Receiver<DisplayState>) {
        *self.display_probe.lock().unwrap() = Some(rx);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Transport for MockTransport {
    fn init_logging(&self, verbosity: i32) {
        self.record(Call::InitLogging(verbosity));
    }

    fn init(&self) -> i32 {
        self.record(Call::Init);
        0
    }

    fn connect(&self, request: &ConnectRequest<'_>) -> i32 {
        self.record(Call::Connect {
            host: request.host.to_string(),
            port: request.port.to_string(),
            ws_port: request.ws_port.to_string(),
        });
        let gate = self.login_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.recv();
        }
        if self.login_succeeds.load(Ordering::SeqCst) {
            self.set_connected(true);
            0
        } else {
            -1
        }
    }

    fn disconnect(&self) {
        let display = self
            .display_probe
            .lock()
            .unwrap()
            .as_ref()
            .map(|rx| *rx.borrow());
        self.record(Call::Disconnect { display });
        self.set_connected(false);
    }

    fn is_connected(&self) -> bool {
        self.record(Call::IsConnected);
        self.connected.load(Ordering::SeqCst)
    }

    fn update_display_buffer(&self, buffer: &mut [u8]) -> Result<GuestSize, FrameError> {
        self.record(Call::UpdateDisplay);
        if let Some(first) = buffer.first_mut() {
            *first = first.wrapping_add(1);
        }
        self.frames
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(GuestSize::default()))
    }

    fn send_motion(&self, x: i32, y: i32, buttons: ButtonMask) {
        self.record(Call::Motion {
            x,
            y,
            buttons: buttons.bits(),
        });
    }

    fn send_button(&self, x: i32, y: i32, button: i32, modifiers: u32, down: bool) {
        self.record(Call::Button {
            x,
            y,
            button,
            modifiers,
            down,
        });
    }

    fn send_key(&self, down: bool, keycode: i32) {
        self.record(Call::Key { down, keycode });
    }

    fn recalc_geometry(&self, x: i32, y: i32, width: u32, height: u32) {
        self.record(Call::RecalcGeometry {
            x,
            y,
            width,
            height,
        });
    }
}
