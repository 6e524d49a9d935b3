//! Data models for keycodes, key actions and keymaps.
//!
//! Models are independent of the firmware runtime and the CLI.

pub mod action;
pub mod keycode;
pub mod keymap;

pub use action::{AutoShiftAction, KeyAction, LayerId, LayerState, RgbAction};
pub use keycode::{Keycode, LedState, ModBits, Usage};
pub use keymap::{Keymap, Layer, ROW_LENGTHS};
