//! Keymap command: render layer tables.

use crate::cli::common::{load_db, load_keymap, print_json, CliError, CliResult};
use crate::keycode_db::KeycodeDb;
use crate::models::action::LayerId;
use crate::models::keymap::{Keymap, Layer};
use clap::Args;
use std::path::PathBuf;

/// Show the keymap layer by layer
#[derive(Debug, Clone, Args)]
pub struct KeymapArgs {
    /// Only show this layer (_QWERTY, QWERTY2, num, 3, ...)
    #[arg(short, long, value_name = "NAME")]
    pub layer: Option<String>,

    /// Keymap TOML file (defaults to the configured or built-in keymap)
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Output QMK keycode names as JSON
    #[arg(long, conflicts_with = "toml")]
    pub json: bool,

    /// Output the keymap in its TOML file format
    #[arg(long)]
    pub toml: bool,
}

impl KeymapArgs {
    /// Execute the keymap command
    pub fn execute(&self) -> CliResult<()> {
        let db = load_db()?;
        let mut keymap = load_keymap(self.file.as_deref(), &db)?;

        if let Some(name) = &self.layer {
            let id: LayerId = name.parse().map_err(CliError::validation)?;
            keymap.layers.retain(|layer| layer.id == id);
            if keymap.layers.is_empty() {
                return Err(CliError::validation(format!(
                    "Layer {} is not defined in keymap '{}'",
                    id.qmk_name(),
                    keymap.name
                )));
            }
        }

        if self.json {
            return print_json(&keymap);
        }
        if self.toml {
            let content = keymap
                .to_toml_string()
                .map_err(|e| CliError::io(format!("{e:#}")))?;
            print!("{content}");
            return Ok(());
        }

        print_keymap(&keymap, &db);
        Ok(())
    }
}

fn print_keymap(keymap: &Keymap, db: &KeycodeDb) {
    println!("Keymap: {}", keymap.name);
    for layer in &keymap.layers {
        println!();
        print_layer(layer, db);
    }
}

fn print_layer(layer: &Layer, db: &KeycodeDb) {
    println!("Layer {} ({})", layer.id.qmk_name(), layer.id.index());

    let labels: Vec<Vec<String>> = layer
        .rows
        .iter()
        .map(|keys| keys.iter().map(|key| db.display(key).compact()).collect())
        .collect();
    let width = labels
        .iter()
        .flatten()
        .map(|label| label.chars().count())
        .max()
        .unwrap_or(1);

    for row in &labels {
        let cells: Vec<String> = row.iter().map(|label| format!("{label:<width$}")).collect();
        println!("| {} |", cells.join(" | "));
    }
}
