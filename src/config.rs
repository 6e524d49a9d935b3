//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use crate::constants::{APP_DATA_DIR, CONFIG_DIR_ENV};
use crate::firmware::options::FirmwareOptions;
use crate::keycode_db::KeycodeDb;
use crate::models::keymap::Keymap;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Path configuration for file system locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Keymap TOML file used instead of the built-in keymap
    pub keymap_file: Option<PathBuf>,
}

/// Trace output preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Print every keyboard report, not just the summary
    pub show_flushes: bool,
    /// Emit JSON unless a command says otherwise
    pub default_json: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            show_flushes: true,
            default_json: false,
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/altkeys/config.toml`
/// - macOS: `~/Library/Application Support/altkeys/config.toml`
/// - Windows: `%APPDATA%\altkeys\config.toml`
///
/// `ALTKEYS_CONFIG_DIR` overrides the directory.
///
/// # Validation
///
/// - `keymap_file` must exist if set
/// - firmware options must pass [`FirmwareOptions::validate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// File system paths
    #[serde(default)]
    pub paths: PathConfig,
    /// Options rendered into config.h
    #[serde(default)]
    pub firmware: FirmwareOptions,
    /// Trace output preferences
    #[serde(default)]
    pub trace: TraceConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if the config file exists on disk.
    #[must_use]
    pub fn exists() -> bool {
        Self::config_file_path()
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Gets the config directory path.
    ///
    /// - `$ALTKEYS_CONFIG_DIR` if set
    /// - Linux: `~/.config/altkeys/`
    /// - macOS: `~/Library/Application Support/altkeys/`
    /// - Windows: `%APPDATA%\altkeys\`
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(APP_DATA_DIR);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;

        if !config_path.exists() {
            debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&config_path).context(format!(
            "Failed to read config file: {}",
            config_path.display()
        ))?;

        let config: Self = toml::from_str(&content).context(format!(
            "Failed to parse config file: {}",
            config_path.display()
        ))?;

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the config file using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save(&self) -> Result<()> {
        self.validate()?;

        // Ensure config directory exists
        let config_dir = Self::config_dir()?;
        fs::create_dir_all(&config_dir).context(format!(
            "Failed to create config directory: {}",
            config_dir.display()
        ))?;

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let config_path = Self::config_file_path()?;
        let temp_path = config_path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        // Atomic rename
        fs::rename(&temp_path, &config_path).context(format!(
            "Failed to rename temp config file to: {}",
            config_path.display()
        ))?;

        debug!(path = %config_path.display(), "config saved");
        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        if let Some(keymap_file) = &self.paths.keymap_file {
            if !keymap_file.exists() {
                anyhow::bail!("Keymap file does not exist: {}", keymap_file.display());
            }
        }

        self.firmware
            .validate()
            .context("Invalid firmware options")?;

        Ok(())
    }

    /// Sets the keymap file with validation.
    pub fn set_keymap_file(&mut self, path: PathBuf) -> Result<()> {
        self.paths.keymap_file = Some(path);
        self.validate()
    }

    /// Loads the configured keymap, or the built-in one.
    pub fn load_keymap(&self, db: &KeycodeDb) -> Result<Keymap> {
        match &self.paths.keymap_file {
            Some(path) => Keymap::from_toml_file(path, db),
            None => Keymap::builtin(db),
        }
    }
}
