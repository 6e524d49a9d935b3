//! Validation command for keymap files.

use crate::cli::common::{load_db, load_keymap, print_json, CliError, CliResult};
use crate::firmware::validator::{KeymapValidator, ValidationErrorKind};
use crate::models::action::LayerId;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Validate a keymap for errors and warnings
#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Keymap TOML file (defaults to the configured or built-in keymap)
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Treat warnings as errors (exit non-zero)
    #[arg(long)]
    pub strict: bool,
}

/// Status of each group of checks.
#[derive(Debug, Serialize)]
struct ValidationChecks {
    layers: String,
    shape: String,
    layer_refs: String,
    accents: String,
}

impl ValidationChecks {
    fn all_passed() -> Self {
        Self {
            layers: "passed".to_string(),
            shape: "passed".to_string(),
            layer_refs: "passed".to_string(),
            accents: "passed".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ValidationPosition {
    row: usize,
    col: usize,
}

#[derive(Debug, Serialize)]
struct ValidationLocation {
    layer: LayerId,
    position: ValidationPosition,
}

#[derive(Debug, Serialize)]
struct ValidationMessage {
    severity: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<ValidationLocation>,
}

#[derive(Debug, Serialize)]
struct ValidationResponse {
    valid: bool,
    keymap: String,
    errors: Vec<ValidationMessage>,
    checks: ValidationChecks,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> CliResult<()> {
        let db = load_db()?;
        let keymap = load_keymap(self.file.as_deref(), &db)?;
        let report = KeymapValidator::new(&keymap).validate();

        let mut checks = ValidationChecks::all_passed();
        let mut messages = Vec::new();

        for error in &report.errors {
            match error.kind {
                ValidationErrorKind::MissingLayer | ValidationErrorKind::DuplicateLayer => {
                    checks.layers = "failed".to_string();
                }
                ValidationErrorKind::WrongRowCount | ValidationErrorKind::WrongRowLength => {
                    checks.shape = "failed".to_string();
                }
                ValidationErrorKind::UnknownLayerReference => {
                    checks.layer_refs = "failed".to_string();
                }
            }

            let location =
                if let (Some(layer), Some(row), Some(col)) = (error.layer, error.row, error.col) {
                    Some(ValidationLocation {
                        layer,
                        position: ValidationPosition { row, col },
                    })
                } else {
                    None
                };

            messages.push(ValidationMessage {
                severity: "error".to_string(),
                message: error.message.clone(),
                location,
            });
        }

        for warning in &report.warnings {
            if warning.message.contains("unreachable") {
                checks.accents = "warning".to_string();
            }
            messages.push(ValidationMessage {
                severity: "warning".to_string(),
                message: warning.message.clone(),
                location: None,
            });
        }

        let response = ValidationResponse {
            valid: report.is_valid(),
            keymap: keymap.name.clone(),
            errors: messages,
            checks,
        };

        if self.json {
            print_json(&response)?;
        } else {
            if response.valid {
                println!("✓ Validation passed ({})", response.keymap);
            } else {
                println!("✗ Validation failed ({})", response.keymap);
            }

            println!("\nChecks:");
            println!("  Layers:     {}", response.checks.layers);
            println!("  Shape:      {}", response.checks.shape);
            println!("  Layer refs: {}", response.checks.layer_refs);
            println!("  Accents:    {}", response.checks.accents);

            if !response.errors.is_empty() {
                println!("\nIssues:");
                for msg in &response.errors {
                    let prefix = if msg.severity == "error" {
                        "  ✗"
                    } else {
                        "  ⚠"
                    };
                    if let Some(loc) = &msg.location {
                        println!(
                            "{} [Layer {} ({}, {})] {}",
                            prefix, loc.layer, loc.position.row, loc.position.col, msg.message
                        );
                    } else {
                        println!("{} {}", prefix, msg.message);
                    }
                }
            }
        }

        if !response.valid {
            return Err(CliError::validation("Validation failed"));
        }

        if self.strict && response.errors.iter().any(|m| m.severity == "warning") {
            return Err(CliError::validation("Warnings found in strict mode"));
        }

        Ok(())
    }
}
