//! End-to-end tests for `altkeys press`.

mod fixtures;
use fixtures::*;

#[test]
fn test_press_accent_without_shift_types_lower_case() {
    let expected = [
        ("KX_A", "á"),
        ("KX_E", "é"),
        ("KX_I", "í"),
        ("KX_O", "ó"),
        ("KX_U", "ú"),
        ("KX_N", "ñ"),
    ];
    for (keycode, text) in expected {
        let result = run_json(&["press", keycode, "--num-lock", "--json"]);
        assert_eq!(result["outcome"], "handled", "{keycode}");
        assert_eq!(result["text"], text, "{keycode}");
        assert_eq!(result["shift_before"], 0);
        assert_eq!(result["shift_after"], 0);
    }
}

#[test]
fn test_press_accent_with_each_shift_restores_mask() {
    // LSFT = 0x02, RSFT = 0x20
    for (side, mask) in [("left", 2), ("right", 32), ("both", 34)] {
        let result = run_json(&["press", "KX_N", "--shift", side, "--num-lock", "--json"]);
        assert_eq!(result["text"], "Ñ", "shift {side}");
        assert_eq!(result["shift_before"], mask, "shift {side}");
        assert_eq!(result["shift_after"], mask, "shift {side}");
    }
}

#[test]
fn test_press_shift_released_while_digits_are_sent() {
    let result = run_json(&["press", "KX_E", "--shift", "left", "--num-lock", "--json"]);
    assert_eq!(result["text"], "É");

    let reports: Vec<&serde_json::Value> = result["trace"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|event| event["event"] == "report")
        .collect();
    // First report drops shift; the last one puts it back
    assert_eq!(reports.first().unwrap()["report"]["mods"], 0);
    assert_eq!(reports.last().unwrap()["report"]["mods"], 2);
    for report in &reports {
        let keys = report["report"]["keys"].as_array().unwrap();
        if !keys.is_empty() {
            assert_eq!(report["report"]["mods"].as_u64().unwrap() & 0x22, 0);
        }
    }
}

#[test]
fn test_press_accent_with_num_lock_off_restores_lock() {
    let result = run_json(&["press", "KX_U", "--json"]);
    assert_eq!(result["text"], "ú");
    assert_eq!(result["num_lock_after"], false);
}

#[test]
fn test_press_regular_key_continues() {
    let output = run(&["press", "KC_A"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "continue");
}

#[test]
fn test_press_unknown_key_continues_without_trace() {
    let output = run(&["press", "KC_DOES_NOT_EXIST"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "continue");

    let result = run_json(&["press", "KC_DOES_NOT_EXIST", "--shift", "right", "--json"]);
    assert_eq!(result["outcome"], "continue");
    assert_eq!(result["flushes"], 0);
    assert_eq!(result["trace"], serde_json::json!([]));
    assert_eq!(result["shift_after"], 32);
}

#[test]
fn test_press_invalid_shift_side_is_usage_error() {
    let output = run(&["press", "KX_A", "--shift", "middle"]);
    assert_ne!(output.status.code(), Some(0));
}
