//! Firmware side of the keymap: user hooks, the runtime they plug into,
//! and the build-time options that go into `config.h`.
//!
//! The runtime and host OS are simulated so the hooks can be exercised
//! and their report traces inspected without hardware.

pub mod hooks;
pub mod host;
pub mod led;
pub mod options;
pub mod report;
pub mod runtime;
pub mod simulator;
pub mod validator;

// Re-export firmware types
pub use hooks::UserHooks;
pub use host::{Direction, Host, LayerHost, LightingHost, RecordOutcome};
pub use led::NumLockShadow;
pub use options::{FirmwareOptions, MidiMode, Note, NoteDuration, StartupSong};
pub use report::{KeyboardReport, ReportEvent};
pub use runtime::{InitialState, InputEvent, KeyMotion, Runtime, Script};
pub use simulator::SimulatedKeyboard;
pub use validator::{KeymapValidator, ValidationReport};
