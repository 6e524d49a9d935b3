//! CLI command handlers for altkeys.
//!
//! Headless, scriptable access to the alt-code injector, the user hooks and
//! the keymap for automation, testing, and CI.

pub mod common;
pub mod config;
pub mod generate;
pub mod keycode;
pub mod keymap;
pub mod press;
pub mod replay;
pub mod send;
pub mod validate;

// Re-export types used by main.rs and tests
pub use common::{CliError, CliResult, ExitCode};
pub use config::ConfigArgs;
pub use generate::GenerateArgs;
pub use keycode::KeycodeArgs;
pub use keymap::KeymapArgs;
pub use press::PressArgs;
pub use replay::ReplayArgs;
pub use send::SendArgs;
pub use validate::ValidateArgs;
