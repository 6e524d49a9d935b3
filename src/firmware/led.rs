//! Shadow copy of the host's num lock indicator.

use crate::models::keycode::LedState;

/// Last num lock state the host reported.
///
/// The firmware cannot query the OS lock state, so this flag is the only
/// source of truth the alt-code injector has. It is updated exclusively from
/// LED reports and accepts them as-is: a delayed report means a stale flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumLockShadow {
    on: bool,
}

impl NumLockShadow {
    /// Shadow starting with num lock off.
    pub const fn new() -> Self {
        Self { on: false }
    }

    /// Stores the num lock bit of an LED report; other bits are ignored.
    pub fn update(&mut self, leds: LedState) {
        self.on = leds.num_lock();
    }

    /// Whether the host last reported num lock on.
    pub const fn is_on(&self) -> bool {
        self.on
    }
}
