//! End-to-end tests for `altkeys config` commands.

use std::fs;
use tempfile::TempDir;

mod fixtures;
use fixtures::*;

// ============================================================================
// Show / Path
// ============================================================================

#[test]
fn test_config_show_default() {
    let output = run(&["config", "show"]);
    assert_eq!(
        output.status.code(),
        Some(0),
        "Show config should succeed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Keymap: (built-in)"));
    assert!(stdout.contains("Tapping term:    200 ms"));
}

#[test]
fn test_config_show_json_schema() {
    let result = run_json(&["config", "show", "--json"]);

    assert!(result["config_file"].is_string());
    assert_eq!(result["exists"], false);
    assert!(result["paths"].is_object(), "Should have paths object");
    assert!(result["paths"]["keymap_file"].is_null());
    assert_eq!(result["firmware"]["tapping_term_ms"], 200);
    assert_eq!(result["firmware"]["midi"], "none");
    assert_eq!(result["trace"]["show_flushes"], true);
}

#[test]
fn test_config_path_honors_env_override() {
    let config_dir = TempDir::new().expect("Failed to create temp dir");
    let output = isolated_command(&["config", "path"], config_dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        config_dir.path().join("config.toml").to_string_lossy()
    );
}

// ============================================================================
// Set keymap
// ============================================================================

#[test]
fn test_config_set_keymap_is_used_by_other_commands() {
    let config_dir = TempDir::new().expect("Failed to create temp dir");
    let mut keymap = builtin_keymap();
    keymap.name = "mine".to_string();
    let (keymap_path, _keymap_dir) = create_temp_keymap_file(&keymap);

    let output = isolated_command(
        &["config", "set-keymap", keymap_path.to_str().unwrap()],
        config_dir.path(),
    )
    .output()
    .expect("Failed to execute command");
    assert_eq!(
        output.status.code(),
        Some(0),
        "set-keymap should succeed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(config_dir.path().join("config.toml").exists());

    let output = isolated_command(&["keymap", "--json"], config_dir.path())
        .output()
        .expect("Failed to execute command");
    let result: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).unwrap();
    assert_eq!(result["name"], "mine");

    let output = isolated_command(&["config", "show", "--json"], config_dir.path())
        .output()
        .expect("Failed to execute command");
    let result: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).unwrap();
    assert_eq!(result["exists"], true);
    assert!(result["paths"]["keymap_file"]
        .as_str()
        .unwrap()
        .ends_with("keymap.toml"));
}

#[test]
fn test_config_set_keymap_missing_file() {
    let config_dir = TempDir::new().expect("Failed to create temp dir");
    let output = isolated_command(
        &["config", "set-keymap", "/nonexistent/keymap.toml"],
        config_dir.path(),
    )
    .output()
    .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    assert!(!config_dir.path().join("config.toml").exists());
}

#[test]
fn test_config_set_keymap_rejects_invalid_keymap() {
    let config_dir = TempDir::new().expect("Failed to create temp dir");
    let mut keymap = builtin_keymap();
    keymap.layers.truncate(2);
    let (keymap_path, _keymap_dir) = create_temp_keymap_file(&keymap);

    let output = isolated_command(
        &["config", "set-keymap", keymap_path.to_str().unwrap()],
        config_dir.path(),
    )
    .output()
    .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("validation failed"), "stderr: {stderr}");
    assert!(!config_dir.path().join("config.toml").exists());
}

#[test]
fn test_config_malformed_file_is_io_error() {
    let config_dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(config_dir.path().join("config.toml"), "[paths\n").unwrap();

    let output = isolated_command(&["config", "show"], config_dir.path())
        .output()
        .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_trace_default_json_setting() {
    let config_dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(
        config_dir.path().join("config.toml"),
        "[trace]\ndefault_json = true\n",
    )
    .unwrap();

    let output = isolated_command(&["send", "225", "--num-lock"], config_dir.path())
        .output()
        .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(0));
    let result: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout))
            .expect("default_json makes send print JSON");
    assert_eq!(result["text"], "á");
}

#[test]
fn test_config_show_silent_startup_song() {
    let config_dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(
        config_dir.path().join("config.toml"),
        "[firmware]\nstartup_song = \"silent\"\n",
    )
    .unwrap();

    let output = isolated_command(&["config", "show"], config_dir.path())
        .output()
        .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Startup song:    silent"), "stdout: {stdout}");

    let output = isolated_command(&["config", "show", "--json"], config_dir.path())
        .output()
        .expect("Failed to execute command");
    let result: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).unwrap();
    assert_eq!(result["firmware"]["startup_song"], "silent");
}
