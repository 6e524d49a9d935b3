//! Sends an alt code as keypad taps with left alt held and num lock on.

use super::AltCode;
use crate::firmware::host::Host;
use crate::firmware::led::NumLockShadow;
use crate::models::keycode::{Keycode, ModBits};
use serde::Serialize;
use tracing::{debug, trace};

/// Modifier and lock state captured before an alt-code sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SavedInputState {
    /// Left alt was already held by the user
    pub alt_held: bool,
    /// The host already reported num lock on
    pub num_lock_on: bool,
}

/// Drives the keyboard through one alt-code sequence at a time.
///
/// The saved input state lives here and `send` borrows the injector
/// mutably, so a nested send cannot clobber the state an outer send still
/// has to restore.
#[derive(Debug, Default)]
pub struct AltCodeInjector {
    saved: SavedInputState,
    sent: u64,
}

impl AltCodeInjector {
    /// Creates an idle injector.
    pub const fn new() -> Self {
        Self {
            saved: SavedInputState {
                alt_held: false,
                num_lock_on: false,
            },
            sent: 0,
        }
    }

    /// Types `code` through the host OS alt-code input method.
    ///
    /// Left alt and num lock are engaged only if they are not already, each
    /// digit is sent as a separate key-down and key-up report, and whatever
    /// was engaged is released again. On return the alt and num lock state
    /// match what they were on entry.
    pub fn send<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        num_lock: &NumLockShadow,
        code: AltCode,
    ) -> SavedInputState {
        self.saved = SavedInputState {
            alt_held: host.mods().contains(ModBits::LALT),
            num_lock_on: num_lock.is_on(),
        };
        let saved = self.saved;
        let keys = code.keypad_keys();

        debug!(
            code = code.value(),
            digits = %code,
            alt_held = saved.alt_held,
            num_lock_on = saved.num_lock_on,
            "sending alt code"
        );

        if !saved.alt_held {
            host.register_code(Keycode::LAlt);
            host.send_keyboard_report();
        }

        if !saved.num_lock_on {
            host.register_code(Keycode::LockingNumLock);
            host.send_keyboard_report();
        }

        // The OS needs to see every digit go down and up.
        for key in keys {
            trace!(key = %key, "alt code digit");
            host.add_key(key);
            host.send_keyboard_report();
            host.del_key(key);
            host.send_keyboard_report();
        }

        if !saved.alt_held {
            host.unregister_code(Keycode::LAlt);
        }
        host.send_keyboard_report();

        if !saved.num_lock_on {
            host.unregister_code(Keycode::LockingNumLock);
            host.send_keyboard_report();
        }

        self.sent += 1;
        saved
    }

    /// State captured by the most recent send.
    pub const fn last_saved(&self) -> SavedInputState {
        self.saved
    }

    /// Number of sequences sent so far.
    pub const fn sent_count(&self) -> u64 {
        self.sent
    }
}
