//! Shared CLI types: errors, exit codes and trace rendering.

use crate::altcode::DecodedInput;
use crate::config::Config;
use crate::firmware::report::ReportEvent;
use crate::keycode_db::KeycodeDb;
use crate::models::keymap::Keymap;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command succeeded
    Success = 0,
    /// Input was read but is invalid (bad code, failed validation)
    Validation = 1,
    /// I/O, parse or serialization failure
    Io = 2,
}

impl ExitCode {
    /// Numeric code for `std::process::exit`.
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// Error returned by CLI commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    /// Exit code to report
    pub kind: ExitCode,
    /// Message for stderr
    pub message: String,
}

impl CliError {
    /// Validation failure (exit code 1).
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ExitCode::Validation,
            message: message.into(),
        }
    }

    /// I/O or parse failure (exit code 2).
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: ExitCode::Io,
            message: message.into(),
        }
    }

    /// Exit code for this error.
    pub const fn exit_code(&self) -> ExitCode {
        self.kind
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Loads the keycode database.
pub fn load_db() -> CliResult<KeycodeDb> {
    KeycodeDb::load().map_err(|e| CliError::io(format!("Failed to load keycode database: {e:#}")))
}

/// Loads the application configuration.
pub fn load_config() -> CliResult<Config> {
    Config::load().map_err(|e| CliError::io(format!("Failed to load configuration: {e:#}")))
}

/// Loads the keymap from `file`, else the configured one, else the built-in.
pub fn load_keymap(file: Option<&Path>, db: &KeycodeDb) -> CliResult<Keymap> {
    let keymap = match file {
        Some(path) => Keymap::from_toml_file(path, db),
        None => load_config()?.load_keymap(db),
    };
    keymap.map_err(|e| CliError::io(format!("Failed to load keymap: {e:#}")))
}

/// Prints a value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;
    println!("{json}");
    Ok(())
}

/// Trace plus what the host typed, as printed by `send`, `press` and `replay`.
#[derive(Debug, Clone, Serialize)]
pub struct TraceOutput {
    /// Every event the simulated host saw
    pub trace: Vec<ReportEvent>,
    /// Number of keyboard reports flushed
    pub flushes: usize,
    /// Characters typed through alt codes
    pub typed: Vec<DecodedInput>,
    /// Typed characters joined into a string (unmapped codes skipped)
    pub text: String,
}

impl TraceOutput {
    /// Builds the output from a trace and typed input.
    pub fn new(trace: &[ReportEvent], flushes: usize, typed: &[DecodedInput]) -> Self {
        let text = typed
            .iter()
            .filter_map(|input| match input {
                DecodedInput::Char(c) => Some(*c),
                DecodedInput::Unmapped(_) => None,
            })
            .collect();
        Self {
            trace: trace.to_vec(),
            flushes,
            typed: typed.to_vec(),
            text,
        }
    }

    /// Prints the human-readable form.
    pub fn print(&self, show_flushes: bool) {
        if show_flushes {
            println!("Trace:");
            for (idx, event) in self.trace.iter().enumerate() {
                println!("  {:>3}. {}", idx + 1, event);
            }
            println!();
        }
        println!("Reports: {}", self.flushes);
        if self.typed.is_empty() {
            println!("Typed:   (nothing)");
        } else {
            let typed: Vec<String> = self.typed.iter().map(ToString::to_string).collect();
            println!("Typed:   {}", typed.join(" "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::validation("x").exit_code().code(), 1);
        assert_eq!(CliError::io("x").exit_code().code(), 2);
        assert_eq!(ExitCode::Success.code(), 0);
    }

    #[test]
    fn test_trace_output_text_skips_unmapped() {
        let output = TraceOutput::new(
            &[],
            0,
            &[
                DecodedInput::Char('á'),
                DecodedInput::Unmapped(1234),
                DecodedInput::Char('Ñ'),
            ],
        );
        assert_eq!(output.text, "áÑ");
    }
}
