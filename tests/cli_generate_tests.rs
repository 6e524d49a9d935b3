//! End-to-end tests for `altkeys generate`.

use std::fs;
use tempfile::TempDir;

mod fixtures;
use fixtures::*;

#[test]
fn test_generate_all() {
    let config_dir = TempDir::new().expect("Failed to create temp dir");
    let out_dir = TempDir::new().expect("Failed to create temp dir");

    let output = isolated_command(
        &["generate", "--out-dir", out_dir.path().to_str().unwrap()],
        config_dir.path(),
    )
    .output()
    .expect("Failed to execute command");

    assert_eq!(
        output.status.code(),
        Some(0),
        "Generate should succeed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let config_h = fs::read_to_string(out_dir.path().join("config.h")).expect("config.h written");
    assert!(config_h.starts_with("#pragma once"));
    assert!(config_h.contains("#ifdef AUDIO_ENABLE"));
    assert!(config_h.contains("#define TAPPING_TERM 200"));
    assert!(config_h.contains("#define PERMISSIVE_HOLD"));
    assert!(config_h.contains("#define HOLD_ON_OTHER_KEY_PRESS_PER_KEY"));
    assert!(config_h.contains("#define MUSIC_MASK (keycode != KC_NO)"));

    let keymap = fs::read_to_string(out_dir.path().join("keymap.toml")).expect("keymap written");
    assert!(keymap.contains("name = \"caomonty\""));
    assert!(keymap.contains("KX_A"));
    assert!(keymap.contains("LT(_NUM, KC_TAB)"));
}

#[test]
fn test_generate_config_only_uses_configured_options() {
    let config_dir = TempDir::new().expect("Failed to create temp dir");
    let out_dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(
        config_dir.path().join("config.toml"),
        "[firmware]\ntapping_term_ms = 175\nmidi = \"basic\"\naudio_clicky = false\n",
    )
    .unwrap();

    let output = isolated_command(
        &[
            "generate",
            "--out-dir",
            out_dir.path().to_str().unwrap(),
            "--format",
            "config",
        ],
        config_dir.path(),
    )
    .output()
    .expect("Failed to execute command");
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let config_h = fs::read_to_string(out_dir.path().join("config.h")).unwrap();
    assert!(config_h.contains("#define TAPPING_TERM 175"));
    assert!(config_h.contains("#define MIDI_BASIC"));
    assert!(!config_h.contains("AUDIO_CLICKY"));
    assert!(!out_dir.path().join("keymap.toml").exists());
}

#[test]
fn test_generate_invalid_format() {
    let out_dir = TempDir::new().expect("Failed to create temp dir");
    let output = run(&[
        "generate",
        "--out-dir",
        out_dir.path().to_str().unwrap(),
        "--format",
        "uf2",
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid format"), "stderr: {stderr}");
}

#[test]
fn test_generate_rejects_invalid_keymap() {
    let mut keymap = builtin_keymap();
    keymap.layers[0].rows[0].pop();
    let (keymap_path, _keymap_dir) = create_temp_keymap_file(&keymap);
    let out_dir = TempDir::new().expect("Failed to create temp dir");

    let output = run(&[
        "generate",
        "--out-dir",
        out_dir.path().to_str().unwrap(),
        "--file",
        keymap_path.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!out_dir.path().join("config.h").exists());
}

#[test]
fn test_generate_invalid_config_file() {
    let config_dir = TempDir::new().expect("Failed to create temp dir");
    let out_dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(
        config_dir.path().join("config.toml"),
        "[firmware]\ntapping_term_ms = 0\n",
    )
    .unwrap();

    let output = isolated_command(
        &["generate", "--out-dir", out_dir.path().to_str().unwrap()],
        config_dir.path(),
    )
    .output()
    .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Tapping term"), "stderr: {stderr}");
}

#[test]
fn test_generate_silent_and_firmware_startup_song() {
    for (setting, expected) in [
        ("silent", Some("#    define STARTUP_SONG SONG(NO_SOUND)")),
        ("firmware", None),
    ] {
        let config_dir = TempDir::new().expect("Failed to create temp dir");
        let out_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(
            config_dir.path().join("config.toml"),
            format!("[firmware]\nstartup_song = \"{setting}\"\n"),
        )
        .unwrap();

        let output = isolated_command(
            &[
                "generate",
                "--out-dir",
                out_dir.path().to_str().unwrap(),
                "--format",
                "config",
            ],
            config_dir.path(),
        )
        .output()
        .expect("Failed to execute command");
        assert_eq!(
            output.status.code(),
            Some(0),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        let config_h = fs::read_to_string(out_dir.path().join("config.h")).unwrap();
        match expected {
            Some(line) => assert!(config_h.contains(line), "{setting}: {config_h}"),
            None => assert!(!config_h.contains("STARTUP_SONG"), "{setting}: {config_h}"),
        }
        assert!(config_h.contains("#    define AUDIO_CLICKY"));
    }
}
