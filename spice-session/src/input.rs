//! Local pointer and keyboard events → transport calls.
//!
//! The translator's only state is the mask of currently held buttons,
//! which rides along on every motion event.

use bitflags::bitflags;
use tracing::trace;

use crate::transport::Transport;

bitflags! {
    /// Buttons currently held down, as sent with motion events.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ButtonMask: u32 {
        const LEFT   = 1 << 0;
        const MIDDLE = 1 << 1;
        const RIGHT  = 1 << 2;
    }
}

// ── MouseButton ──────────────────────────────────────────────────

/// Well-known pointer button ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
}

impl MouseButton {
    pub const fn id(self) -> i32 {
        match self {
            Self::Left => 1,
            Self::Middle => 2,
            Self::Right => 3,
            Self::WheelUp => 4,
            Self::WheelDown => 5,
        }
    }

    pub const fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Self::Left),
            2 => Some(Self::Middle),
            3 => Some(Self::Right),
            4 => Some(Self::WheelUp),
            5 => Some(Self::WheelDown),
            _ => None,
        }
    }

    /// The mask bit this button is tracked under, if any.
    ///
    /// Only left and right are tracked.
    pub const fn tracked_bit(self) -> Option<ButtonMask> {
        match self {
            Self::Left => Some(ButtonMask::LEFT),
            Self::Right => Some(ButtonMask::RIGHT),
            _ => None,
        }
    }
}

// ── InputTranslator ──────────────────────────────────────────────

/// Packs local input into protocol-ready calls.
#[derive(Debug, Default)]
pub struct InputTranslator {
    mask: ButtonMask,
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buttons(&self) -> ButtonMask {
        self.mask
    }

    /// Pointer moved. Sends the position with the held buttons.
    pub fn motion(&self, transport: &dyn Transport, x: i32, y: i32) {
        transport.send_motion(x, y, self.mask);
    }

    /// Button pressed or released.
    ///
    /// The event is always forwarded with no modifiers, whether or not
    /// the button is one the mask tracks.
    pub fn button(&mut self, transport: &dyn Transport, x: i32, y: i32, button: i32, down: bool) {
        self.track(button, down);
        transport.send_button(x, y, button, 0, down);
    }

    pub fn key(&self, transport: &dyn Transport, keycode: i32, down: bool) {
        transport.send_key(down, keycode);
    }

    fn track(&mut self, button: i32, down: bool) {
        let Some(bit) = MouseButton::from_id(button).and_then(MouseButton::tracked_bit) else {
            return;
        };
        self.mask.set(bit, down);
        trace!(button, down, mask = self.mask.bits(), "button mask updated");
    }
}

// ── Tests ────────────────────────────────────────────────────────
