//! Shared test fixtures for E2E CLI tests.
#![allow(dead_code)] // Not every test file uses every fixture

use altkeys::keycode_db::KeycodeDb;
use altkeys::models::{KeyAction, Keymap, LayerId};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Path to the altkeys binary
pub fn altkeys_bin() -> &'static str {
    env!("CARGO_BIN_EXE_altkeys")
}

/// Creates a Command whose configuration lives in `config_dir`.
///
/// Pass the same directory to several commands to share configuration
/// between them within one test.
pub fn isolated_command(args: &[&str], config_dir: &Path) -> Command {
    let mut cmd = Command::new(altkeys_bin());
    cmd.env("ALTKEYS_CONFIG_DIR", config_dir);
    cmd.env_remove("RUST_LOG");
    cmd.args(args);
    cmd
}

/// Runs altkeys with a fresh, empty configuration directory.
pub fn run(args: &[&str]) -> Output {
    let config_dir = TempDir::new().expect("Failed to create temp dir");
    isolated_command(args, config_dir.path())
        .output()
        .expect("Failed to execute command")
}

/// Runs altkeys and parses stdout as JSON, asserting a zero exit code.
pub fn run_json(args: &[&str]) -> serde_json::Value {
    let output = run(args);
    assert_eq!(
        output.status.code(),
        Some(0),
        "Command {:?} should succeed. stderr: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("Should parse JSON output")
}

/// The built-in keymap.
pub fn builtin_keymap() -> Keymap {
    let db = KeycodeDb::load().expect("Failed to load keycode database");
    Keymap::builtin(&db).expect("Built-in keymap should parse")
}

/// The built-in keymap with the Qwerty2 accent keys moved to a layer that no
/// key activates.
pub fn keymap_with_stranded_accents() -> Keymap {
    let mut keymap = builtin_keymap();
    for layer in &mut keymap.layers {
        for row in &mut layer.rows {
            for action in row.iter_mut() {
                if matches!(action, KeyAction::LayerTap { layer: LayerId::Num, .. }) {
                    *action = KeyAction::Transparent;
                }
            }
        }
    }
    // Num is now unreachable; give it an accent key
    if let Some(num) = keymap.layers.iter_mut().find(|l| l.id == LayerId::Num) {
        num.rows[2][1] = KeyAction::Custom(altkeys::altcode::AccentKey::A);
    }
    keymap
}

/// Writes a keymap to a temp TOML file.
///
/// Keep the returned `TempDir` alive for as long as the file is needed.
pub fn create_temp_keymap_file(keymap: &Keymap) -> (PathBuf, TempDir) {
    let content = keymap.to_toml_string().expect("Keymap should serialize");
    create_temp_file("keymap.toml", &content)
}

/// Writes arbitrary content to a named file in a new temp dir.
pub fn create_temp_file(name: &str, content: &str) -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join(name);
    fs::write(&path, content).expect("Failed to write temp file");
    (path, temp_dir)
}

/// Number of keyboard reports in a JSON trace output.
pub fn report_count(result: &serde_json::Value) -> usize {
    result["trace"]
        .as_array()
        .expect("trace should be an array")
        .iter()
        .filter(|event| event["event"] == "report")
        .count()
}
