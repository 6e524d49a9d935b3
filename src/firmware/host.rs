//! Primitives the firmware runtime provides to user code.
//!
//! The real runtime (matrix scanning, USB HID stack, RGB matrix and encoder
//! drivers) lives outside this crate. User hooks only see these traits;
//! [`SimulatedKeyboard`](super::simulator::SimulatedKeyboard) implements them
//! for tests and the CLI.

use crate::models::action::{LayerId, LayerState};
use crate::models::keycode::{Keycode, ModBits};
use serde::Serialize;

/// Live key state and HID report transmission.
///
/// `register_code`/`unregister_code`/`add_key`/`del_key` only mutate the
/// pending report; nothing reaches the host until `send_keyboard_report`.
pub trait Host {
    /// Modifiers currently held in the live report.
    fn mods(&self) -> ModBits;

    /// Presses a key: modifiers set their bit, other keys take a report slot.
    fn register_code(&mut self, key: Keycode);

    /// Releases a key registered with [`Host::register_code`].
    fn unregister_code(&mut self, key: Keycode);

    /// Adds a non-modifier key to the report.
    fn add_key(&mut self, key: Keycode);

    /// Removes a non-modifier key from the report.
    fn del_key(&mut self, key: Keycode);

    /// Transmits the current report to the host.
    fn send_keyboard_report(&mut self);

    /// Press, flush, release, flush.
    fn tap_code(&mut self, key: Keycode) {
        self.register_code(key);
        self.send_keyboard_report();
        self.unregister_code(key);
        self.send_keyboard_report();
    }
}

/// Layer state kept by the runtime.
pub trait LayerHost {
    /// Momentarily active layers.
    fn layer_state(&self) -> LayerState;

    /// Default (base) layers.
    fn default_layer_state(&self) -> LayerState;

    /// Replaces the default layer state.
    fn default_layer_set(&mut self, state: LayerState);

    /// Activates a layer.
    fn layer_on(&mut self, layer: LayerId);

    /// Deactivates a layer.
    fn layer_off(&mut self, layer: LayerId);

    /// Highest layer across active and default state.
    fn highest_layer(&self) -> u8 {
        self.layer_state()
            .union(self.default_layer_state())
            .highest()
    }
}

/// Step direction for RGB controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Next value
    Increase,
    /// Previous value
    Decrease,
}

/// RGB matrix driver controls.
pub trait LightingHost {
    /// Steps the RGB matrix hue.
    fn rgb_matrix_step_hue(&mut self, direction: Direction);

    /// Steps the RGB matrix effect mode.
    fn rgb_matrix_step_mode(&mut self, direction: Direction);
}

/// Result of a user key handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOutcome {
    /// The event was fully handled; skip default processing.
    Handled,
    /// Let the runtime process the key as usual.
    Continue,
}

impl RecordOutcome {
    /// The runtime's boolean convention: `true` means keep processing.
    pub const fn continue_processing(self) -> bool {
        matches!(self, Self::Continue)
    }
}
