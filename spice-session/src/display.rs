//! Display geometry bookkeeping.
//!
//! Tracks the guest display size, the local renderer size and the pointer
//! scale between the two, and reports what changed after each frame pull.

use bitflags::bitflags;

use crate::transport::GuestSize;

bitflags! {
    /// What a display update changed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DisplayFlags: u32 {
        /// The frame buffer contents changed and must be redrawn.
        const INVALIDATE        = 1 << 0;
        /// The guest display dimensions changed.
        const CHANGE_RESOLUTION = 1 << 1;
    }
}

/// Result of a successful [`Session::update_display`](crate::Session::update_display).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayUpdate {
    pub flags: DisplayFlags,
    /// Size reported by the transport for this frame.
    pub size: GuestSize,
}

impl DisplayUpdate {
    pub(crate) fn idle() -> Self {
        Self {
            flags: DisplayFlags::empty(),
            size: GuestSize::default(),
        }
    }
}

// ── MouseFix ─────────────────────────────────────────────────────

/// Pointer scale factors from local renderer space to guest space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseFix {
    pub x: f64,
    pub y: f64,
}

impl Default for MouseFix {
    fn default() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}

impl MouseFix {
    /// guest / local per axis. A zero local axis keeps a factor of 1.0.
    pub fn between(guest: GuestSize, local: GuestSize) -> Self {
        fn ratio(guest: u32, local: u32) -> f64 {
            if local == 0 {
                1.0
            } else {
                f64::from(guest) / f64::from(local)
            }
        }
        Self {
            x: ratio(guest.width, local.width),
            y: ratio(guest.height, local.height),
        }
    }

    /// Scale a local pointer position into guest coordinates.
    pub fn to_guest(self, x: i32, y: i32) -> (i32, i32) {
        (
            (f64::from(x) * self.x).round() as i32,
            (f64::from(y) * self.y).round() as i32,
        )
    }
}

// ── Geometry ─────────────────────────────────────────────────────

/// Guest and local sizes plus the derived pointer scale.
#[derive(Debug, Clone)]
pub struct Geometry {
    guest: GuestSize,
    local: GuestSize,
    mouse_fix: MouseFix,
}

impl Geometry {
    pub fn new(local: GuestSize) -> Self {
        Self {
            guest: GuestSize::default(),
            local,
            mouse_fix: MouseFix::default(),
        }
    }

    pub fn guest(&self) -> GuestSize {
        self.guest
    }

    pub fn local(&self) -> GuestSize {
        self.local
    }

    pub fn mouse_fix(&self) -> MouseFix {
        self.mouse_fix
    }

    /// Record a size reported by the transport.
    ///
    /// Returns `true` when the guest size actually changed, which is the
    /// only case the pointer scale is recomputed.
    pub fn observe(&mut self, reported: GuestSize) -> bool {
        if !reported.is_known() || reported == self.guest {
            return false;
        }
        self.guest = reported;
        self.mouse_fix = MouseFix::between(self.guest, self.local);
        true
    }

    /// The local renderer was resized.
    pub fn set_local(&mut self, local: GuestSize) {
        self.local = local;
        if self.guest.is_known() {
            self.mouse_fix = MouseFix::between(self.guest, self.local);
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
