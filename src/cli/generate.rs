//! Generate command: write `config.h` and the keymap TOML.

use crate::cli::common::{load_config, load_db, load_keymap, CliError, CliResult};
use crate::firmware::validator::KeymapValidator;
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Generate firmware build files from the keymap and configuration
#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// Output directory for generated files
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Output format: config, keymap, or all
    #[arg(long, value_name = "TYPE", default_value = "all")]
    pub format: String,

    /// Keymap TOML file (defaults to the configured or built-in keymap)
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

impl GenerateArgs {
    /// Execute the generate command
    pub fn execute(&self) -> CliResult<()> {
        // Validate format
        if !matches!(self.format.as_str(), "keymap" | "config" | "all") {
            return Err(CliError::validation(format!(
                "Invalid format '{}'. Must be 'config', 'keymap', or 'all'",
                self.format
            )));
        }
        let want_config = matches!(self.format.as_str(), "config" | "all");
        let want_keymap = matches!(self.format.as_str(), "keymap" | "all");

        let config = load_config()?;
        let db = load_db()?;
        let keymap = load_keymap(self.file.as_deref(), &db)?;

        let report = KeymapValidator::new(&keymap).validate();
        if !report.is_valid() {
            return Err(CliError::validation(format!(
                "Keymap validation failed:\n{}",
                report.format_message()
            )));
        }

        fs::create_dir_all(&self.out_dir).map_err(|e| {
            CliError::io(format!(
                "Failed to create output directory {}: {e}",
                self.out_dir.display()
            ))
        })?;

        let mut written = Vec::new();
        if want_config {
            let path = self.out_dir.join("config.h");
            write_file(&path, &config.firmware.generate_config_h())?;
            written.push(path);
        }
        if want_keymap {
            let content = keymap
                .to_toml_string()
                .map_err(|e| CliError::io(format!("{e:#}")))?;
            let path = self.out_dir.join("keymap.toml");
            write_file(&path, &content)?;
            written.push(path);
        }

        for path in &written {
            info!(path = %path.display(), "generated");
            println!("✓ Generated {}", path.display());
        }
        Ok(())
    }
}

fn write_file(path: &Path, content: &str) -> CliResult<()> {
    fs::write(path, content)
        .map_err(|e| CliError::io(format!("Failed to write {}: {e}", path.display())))
}
