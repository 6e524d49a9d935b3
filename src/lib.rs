//! altkeys library
//!
//! The user layer of a Keychron Q2 QMK keymap: the alt-code injector behind
//! the accent keys, the num lock shadow kept from host LED reports, the
//! dip switch and encoder handlers, the keymap tables and the `config.h`
//! build flags. The firmware runtime is reached through the traits in
//! [`firmware::host`]; [`firmware::simulator`] stands in for it off-device.

pub mod altcode;
pub mod cli;
pub mod config;
pub mod constants;
pub mod firmware;
pub mod keycode_db;
pub mod models;
