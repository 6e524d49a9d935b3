//! Configuration management CLI commands.

use crate::cli::common::{load_config, load_db, print_json, CliError, CliResult};
use crate::config::Config;
use crate::firmware::options::MidiMode;
use crate::firmware::validator::KeymapValidator;
use crate::models::keymap::Keymap;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Print the config file location
    Path,
    /// Use a keymap TOML file instead of the built-in keymap
    SetKeymap(ConfigSetKeymapArgs),
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Use a keymap TOML file instead of the built-in keymap
#[derive(Args, Debug)]
pub struct ConfigSetKeymapArgs {
    /// Keymap TOML file
    #[arg(value_name = "PATH")]
    path: PathBuf,
}

#[derive(Serialize, Debug)]
struct ConfigOutput<'a> {
    config_file: String,
    exists: bool,
    #[serde(flatten)]
    config: &'a Config,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(),
            ConfigCommand::Path => {
                println!("{}", config_file()?.display());
                Ok(())
            }
            ConfigCommand::SetKeymap(args) => args.execute(),
        }
    }
}

fn config_file() -> CliResult<PathBuf> {
    Config::config_file_path()
        .map_err(|e| CliError::io(format!("Failed to resolve config path: {e:#}")))
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_config()?;
        let path = config_file()?;

        if self.json {
            return print_json(&ConfigOutput {
                config_file: path.to_string_lossy().to_string(),
                exists: Config::exists(),
                config: &config,
            });
        }

        output_human_readable(&config, &path);
        Ok(())
    }
}

impl ConfigSetKeymapArgs {
    /// Execute set-keymap command
    pub fn execute(&self) -> CliResult<()> {
        if !self.path.exists() {
            return Err(CliError::validation(format!(
                "Keymap file does not exist: {}",
                self.path.display()
            )));
        }

        let db = load_db()?;
        let keymap = Keymap::from_toml_file(&self.path, &db)
            .map_err(|e| CliError::validation(format!("{e:#}")))?;
        let report = KeymapValidator::new(&keymap).validate();
        if !report.is_valid() {
            return Err(CliError::validation(format!(
                "Keymap validation failed:\n{}",
                report.format_message()
            )));
        }

        let path = std::fs::canonicalize(&self.path).map_err(|e| {
            CliError::io(format!("Failed to resolve {}: {e}", self.path.display()))
        })?;

        let mut config = load_config()?;
        config
            .set_keymap_file(path.clone())
            .map_err(|e| CliError::validation(format!("{e:#}")))?;
        config
            .save()
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;

        println!("Keymap set to {} ({})", path.display(), keymap.name);
        Ok(())
    }
}

/// Output configuration in human-readable format
fn output_human_readable(config: &Config, path: &std::path::Path) {
    println!("altkeys configuration");
    println!("=====================");
    println!();
    println!("File: {}", path.display());
    println!();

    println!("Paths:");
    match &config.paths.keymap_file {
        Some(keymap) => println!("  Keymap: {}", keymap.display()),
        None => println!("  Keymap: (built-in)"),
    }
    println!();

    let firmware = &config.firmware;
    println!("Firmware:");
    println!("  Tapping term:    {} ms", firmware.tapping_term_ms);
    println!("  Permissive hold: {}", firmware.permissive_hold);
    println!("  Audio clicky:    {}", firmware.audio_clicky);
    println!("  Startup song:    {}", firmware.startup_song);
    let midi = match firmware.midi {
        MidiMode::None => "none",
        MidiMode::Basic => "basic",
        MidiMode::Advanced => "advanced",
    };
    println!("  MIDI:            {midi}");
    println!();

    println!("Trace:");
    println!("  Show flushes:    {}", config.trace.show_flushes);
    println!("  Default JSON:    {}", config.trace.default_json);
}
