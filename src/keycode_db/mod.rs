//! QMK keycode names, aliases and parameterized forms.
//!
//! This module maps the names used in keymap sources (`KC_A`, `_______`,
//! `LT(_NUM, KC_TAB)`, `KX_A`) to [`KeyAction`]s, validates them, and
//! provides the fuzzy search behind `altkeys keycode`.

pub mod display;

use crate::altcode::AccentKey;
use crate::models::action::{AutoShiftAction, KeyAction, LayerId, RgbAction};
use crate::models::keycode::{Keycode, ModBits};
use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

/// One searchable keycode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeycodeEntry {
    /// Canonical name (e.g. "KC_ENT")
    pub code: String,
    /// Alternative names accepted in keymaps
    pub aliases: Vec<String>,
    /// Category ID (e.g. "basic", "keypad", "accent")
    pub category: String,
    /// Short human description
    pub description: String,
    /// What the keycode does
    pub action: KeyAction,
}

// Aliases for basic keycodes, canonical name first.
const KEY_ALIASES: &[(&str, &[&str])] = &[
    ("KC_ENT", &["KC_ENTER"]),
    ("KC_ESC", &["KC_ESCAPE"]),
    ("KC_BSPC", &["KC_BACKSPACE"]),
    ("KC_SPC", &["KC_SPACE"]),
    ("KC_MINS", &["KC_MINUS"]),
    ("KC_EQL", &["KC_EQUAL"]),
    ("KC_LBRC", &["KC_LEFT_BRACKET"]),
    ("KC_RBRC", &["KC_RIGHT_BRACKET"]),
    ("KC_BSLS", &["KC_BACKSLASH"]),
    ("KC_SCLN", &["KC_SEMICOLON"]),
    ("KC_QUOT", &["KC_QUOTE"]),
    ("KC_GRV", &["KC_GRAVE"]),
    ("KC_COMM", &["KC_COMMA"]),
    ("KC_SLSH", &["KC_SLASH"]),
    ("KC_CAPS", &["KC_CAPS_LOCK"]),
    ("KC_DEL", &["KC_DELETE"]),
    ("KC_PGUP", &["KC_PAGE_UP"]),
    ("KC_PGDN", &["KC_PAGE_DOWN"]),
    ("KC_RGHT", &["KC_RIGHT"]),
    ("KC_NUM", &["KC_NUM_LOCK", "KC_NLCK"]),
    ("KC_PSLS", &["KC_KP_SLASH"]),
    ("KC_PAST", &["KC_KP_ASTERISK"]),
    ("KC_PMNS", &["KC_KP_MINUS"]),
    ("KC_PPLS", &["KC_KP_PLUS"]),
    ("KC_PENT", &["KC_KP_ENTER"]),
    ("KC_PDOT", &["KC_KP_DOT"]),
    ("KC_P0", &["KC_KP_0"]),
    ("KC_P1", &["KC_KP_1"]),
    ("KC_P2", &["KC_KP_2"]),
    ("KC_P3", &["KC_KP_3"]),
    ("KC_P4", &["KC_KP_4"]),
    ("KC_P5", &["KC_KP_5"]),
    ("KC_P6", &["KC_KP_6"]),
    ("KC_P7", &["KC_KP_7"]),
    ("KC_P8", &["KC_KP_8"]),
    ("KC_P9", &["KC_KP_9"]),
    ("KC_LNUM", &["KC_LOCKING_NUM_LOCK"]),
    ("KC_LCTL", &["KC_LCTRL", "KC_LEFT_CTRL"]),
    ("KC_LSFT", &["KC_LSHIFT", "KC_LEFT_SHIFT"]),
    ("KC_LALT", &["KC_LOPT", "KC_LEFT_ALT"]),
    ("KC_LGUI", &["KC_LCMD", "KC_LWIN", "KC_LEFT_GUI"]),
    ("KC_RCTL", &["KC_RCTRL", "KC_RIGHT_CTRL"]),
    ("KC_RSFT", &["KC_RSHIFT", "KC_RIGHT_SHIFT"]),
    ("KC_RALT", &["KC_ROPT", "KC_ALGR", "KC_RIGHT_ALT"]),
    ("KC_RGUI", &["KC_RCMD", "KC_RWIN", "KC_RIGHT_GUI"]),
    ("KC_MUTE", &["KC_AUDIO_MUTE"]),
    ("KC_VOLU", &["KC_AUDIO_VOL_UP"]),
    ("KC_VOLD", &["KC_AUDIO_VOL_DOWN"]),
    ("KC_MCTL", &["KC_MISSION_CONTROL"]),
    ("KC_LPAD", &["KC_LAUNCHPAD"]),
];

// Shorthands defined by the keymap itself.
const KEYMAP_SHORTHANDS: &[(&str, &str)] = &[
    ("KC_WAVE", "S(KC_GRV)"),
    ("KC_TASK", "LGUI(KC_TAB)"),
    ("KC_FLXP", "LGUI(KC_E)"),
    ("UT_CAP", "LT(_QWERTY2, KC_CAPS)"),
    ("UT_ENT", "LT(_QWERTY2, KC_ENT)"),
    ("UT_TAB", "LT(_NUM, KC_TAB)"),
    ("TOCONFI", "MO(_CONFIG)"),
];

// Modifier wrapper functions accepted around a keycode.
const MOD_FUNCTIONS: &[(&str, ModBits)] = &[
    ("LCTL", ModBits::LCTL),
    ("C", ModBits::LCTL),
    ("LSFT", ModBits::LSFT),
    ("S", ModBits::LSFT),
    ("LALT", ModBits::LALT),
    ("A", ModBits::LALT),
    ("LOPT", ModBits::LALT),
    ("LGUI", ModBits::LGUI),
    ("G", ModBits::LGUI),
    ("LCMD", ModBits::LGUI),
    ("RCTL", ModBits::RCTL),
    ("RSFT", ModBits::RSFT),
    ("RALT", ModBits::RALT),
    ("RGUI", ModBits::RGUI),
];

fn category_for(key: Keycode) -> &'static str {
    match key {
        _ if key.is_modifier() => "modifier",
        _ if key.is_consumer() => "media",
        Keycode::NumLock | Keycode::LockingNumLock | Keycode::CapsLock => "lock",
        Keycode::F1
        | Keycode::F2
        | Keycode::F3
        | Keycode::F4
        | Keycode::F5
        | Keycode::F6
        | Keycode::F7
        | Keycode::F8
        | Keycode::F9
        | Keycode::F10
        | Keycode::F11
        | Keycode::F12 => "function",
        Keycode::Home
        | Keycode::End
        | Keycode::PageUp
        | Keycode::PageDown
        | Keycode::Delete
        | Keycode::Up
        | Keycode::Down
        | Keycode::Left
        | Keycode::Right => "navigation",
        Keycode::KpSlash
        | Keycode::KpAsterisk
        | Keycode::KpMinus
        | Keycode::KpPlus
        | Keycode::KpEnter
        | Keycode::KpDot => "keypad",
        _ if key.keypad_value().is_some() => "keypad",
        _ => "basic",
    }
}

/// Keycode database with alias lookup and parameterized-form parsing.
#[derive(Debug, Clone)]
pub struct KeycodeDb {
    entries: Vec<KeycodeEntry>,
    lookup: HashMap<String, KeyAction>,
    layer_tap: Regex,
    momentary: Regex,
    mod_wrapped: Regex,
}

impl KeycodeDb {
    /// Builds the database.
    pub fn load() -> Result<Self> {
        let layer_tap = Regex::new(r"^LT\(\s*([A-Za-z0-9_]+)\s*,\s*(.+?)\s*\)$")
            .context("Failed to compile LT() pattern")?;
        let momentary = Regex::new(r"^MO\(\s*([A-Za-z0-9_]+)\s*\)$")
            .context("Failed to compile MO() pattern")?;
        let mod_wrapped = Regex::new(r"^([A-Z]+)\(\s*(.+?)\s*\)$")
            .context("Failed to compile modifier pattern")?;

        let mut db = Self {
            entries: Vec::new(),
            lookup: HashMap::new(),
            layer_tap,
            momentary,
            mod_wrapped,
        };

        for key in Keycode::ALL {
            let aliases = KEY_ALIASES
                .iter()
                .find(|(code, _)| *code == key.qmk_name())
                .map(|(_, aliases)| aliases.iter().map(|a| (*a).to_string()).collect())
                .unwrap_or_default();
            db.insert(KeycodeEntry {
                code: key.qmk_name().to_string(),
                aliases,
                category: category_for(*key).to_string(),
                description: key.qmk_name().trim_start_matches("KC_").to_string(),
                action: KeyAction::Key(*key),
            });
        }

        db.insert(KeycodeEntry {
            code: "KC_NO".to_string(),
            aliases: vec!["XXXXXXX".to_string()],
            category: "special".to_string(),
            description: "No action".to_string(),
            action: KeyAction::No,
        });
        db.insert(KeycodeEntry {
            code: "KC_TRNS".to_string(),
            aliases: vec!["KC_TRANSPARENT".to_string(), "_______".to_string()],
            category: "special".to_string(),
            description: "Transparent (use lower layer)".to_string(),
            action: KeyAction::Transparent,
        });

        for (action, description) in [
            (RgbAction::ModeForward, "RGB next mode"),
            (RgbAction::ModeReverse, "RGB previous mode"),
            (RgbAction::HueUp, "RGB hue up"),
            (RgbAction::HueDown, "RGB hue down"),
        ] {
            db.insert(KeycodeEntry {
                code: action.qmk_name().to_string(),
                aliases: Vec::new(),
                category: "rgb".to_string(),
                description: description.to_string(),
                action: KeyAction::Rgb(action),
            });
        }

        db.insert(KeycodeEntry {
            code: "KC_ASON".to_string(),
            aliases: vec!["AS_ON".to_string()],
            category: "special".to_string(),
            description: "Auto-shift on".to_string(),
            action: KeyAction::AutoShift(AutoShiftAction::On),
        });
        db.insert(KeycodeEntry {
            code: "KC_ASOFF".to_string(),
            aliases: vec!["AS_OFF".to_string()],
            category: "special".to_string(),
            description: "Auto-shift off".to_string(),
            action: KeyAction::AutoShift(AutoShiftAction::Off),
        });

        for accent in AccentKey::ALL {
            let (lower, upper) = accent.codes();
            db.insert(KeycodeEntry {
                code: accent.qmk_name().to_string(),
                aliases: Vec::new(),
                category: "accent".to_string(),
                description: format!(
                    "{} / {} (alt {} / {})",
                    accent.character(false),
                    accent.character(true),
                    lower,
                    upper
                ),
                action: KeyAction::Custom(accent),
            });
        }

        for (shorthand, expansion) in KEYMAP_SHORTHANDS {
            let action = db
                .parse(expansion)
                .with_context(|| format!("Invalid shorthand expansion: {expansion}"))?;
            db.insert(KeycodeEntry {
                code: (*shorthand).to_string(),
                aliases: Vec::new(),
                category: "shorthand".to_string(),
                description: (*expansion).to_string(),
                action,
            });
        }

        Ok(db)
    }

    fn insert(&mut self, entry: KeycodeEntry) {
        self.lookup.insert(entry.code.clone(), entry.action);
        for alias in &entry.aliases {
            self.lookup.insert(alias.clone(), entry.action);
        }
        self.entries.push(entry);
    }

    /// Parses a keycode expression into an action.
    ///
    /// Accepts plain names and aliases, `LT(layer, key)`, `MO(layer)` and
    /// modifier wrappers such as `S(KC_GRV)` or `LGUI(KC_TAB)`.
    pub fn parse(&self, expr: &str) -> Option<KeyAction> {
        let expr = expr.trim();

        if let Some(action) = self.lookup.get(expr) {
            return Some(*action);
        }

        if let Some(caps) = self.layer_tap.captures(expr) {
            let layer: LayerId = caps[1].parse().ok()?;
            return match self.parse(&caps[2])? {
                KeyAction::Key(key) => Some(KeyAction::LayerTap { layer, key }),
                _ => None,
            };
        }

        if let Some(caps) = self.momentary.captures(expr) {
            let layer: LayerId = caps[1].parse().ok()?;
            return Some(KeyAction::Momentary(layer));
        }

        if let Some(caps) = self.mod_wrapped.captures(expr) {
            let (_, bit) = MOD_FUNCTIONS.iter().find(|(name, _)| *name == &caps[1])?;
            return match self.parse(&caps[2])? {
                KeyAction::Key(key) => Some(KeyAction::Modified { mods: *bit, key }),
                KeyAction::Modified { mods, key } => Some(KeyAction::Modified {
                    mods: mods | *bit,
                    key,
                }),
                _ => None,
            };
        }

        None
    }

    /// Returns true if the expression parses.
    pub fn is_valid(&self, expr: &str) -> bool {
        self.parse(expr).is_some()
    }

    /// Looks up an entry by canonical name or alias.
    pub fn get(&self, code: &str) -> Option<&KeycodeEntry> {
        self.entries
            .iter()
            .find(|entry| entry.code == code || entry.aliases.iter().any(|a| a == code))
    }

    /// Searches codes, aliases and descriptions (case-insensitive).
    ///
    /// Exact matches rank first, then prefix matches, then substring matches
    /// in the code, then matches in the description.
    pub fn search(&self, query: &str) -> Vec<&KeycodeEntry> {
        if query.is_empty() {
            return self.entries.iter().collect();
        }

        let query_lower = query.to_lowercase();
        let mut results: Vec<(&KeycodeEntry, i32)> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let names: Vec<String> = std::iter::once(&entry.code)
                    .chain(entry.aliases.iter())
                    .map(|name| name.to_lowercase())
                    .collect();
                let stripped: Vec<&str> = names
                    .iter()
                    .map(|name| name.trim_start_matches("kc_"))
                    .collect();

                if names.iter().any(|n| *n == query_lower)
                    || stripped.contains(&query_lower.as_str())
                {
                    return Some((entry, 100));
                }
                if stripped.iter().any(|n| n.starts_with(&query_lower)) {
                    return Some((entry, 50));
                }
                if names.iter().any(|n| n.contains(&query_lower)) {
                    return Some((entry, 10));
                }
                if entry.description.to_lowercase().contains(&query_lower) {
                    return Some((entry, 5));
                }
                None
            })
            .collect();

        results.sort_by(|a, b| b.1.cmp(&a.1));
        results.into_iter().map(|(entry, _)| entry).collect()
    }

    /// Entries in a category.
    pub fn by_category(&self, category: &str) -> Vec<&KeycodeEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.category == category)
            .collect()
    }

    /// Number of entries.
    pub fn keycode_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_db() -> KeycodeDb {
        KeycodeDb::load().expect("Failed to load keycode database")
    }

    #[test]
    fn test_load_database() {
        let db = get_test_db();
        assert!(db.keycode_count() > 100);
        assert_eq!(db.by_category("accent").len(), 6);
    }

    #[test]
    fn test_parse_basic_and_aliases() {
        let db = get_test_db();
        assert_eq!(db.parse("KC_A"), Some(KeyAction::Key(Keycode::A)));
        assert_eq!(db.parse("KC_LSHIFT"), Some(KeyAction::Key(Keycode::LShift)));
        assert_eq!(db.parse("KC_LOPT"), Some(KeyAction::Key(Keycode::LAlt)));
        assert_eq!(db.parse("KC_LCMD"), Some(KeyAction::Key(Keycode::LGui)));
        assert_eq!(db.parse("KC_KP_0"), Some(KeyAction::Key(Keycode::Kp0)));
        assert_eq!(db.parse("_______"), Some(KeyAction::Transparent));
        assert_eq!(db.parse("XXXXXXX"), Some(KeyAction::No));
        assert_eq!(db.parse("KX_N"), Some(KeyAction::Custom(AccentKey::N)));
    }

    #[test]
    fn test_parse_parameterized() {
        let db = get_test_db();
        assert_eq!(
            db.parse("LT(_NUM, KC_TAB)"),
            Some(KeyAction::LayerTap {
                layer: LayerId::Num,
                key: Keycode::Tab
            })
        );
        assert_eq!(
            db.parse("LT(1,KC_ENT)"),
            Some(KeyAction::LayerTap {
                layer: LayerId::Qwerty2,
                key: Keycode::Enter
            })
        );
        assert_eq!(db.parse("MO(_CONFIG)"), Some(KeyAction::Momentary(LayerId::Config)));
        assert_eq!(
            db.parse("S(KC_GRV)"),
            Some(KeyAction::Modified {
                mods: ModBits::LSFT,
                key: Keycode::Grave
            })
        );
        assert_eq!(
            db.parse("LCTL(LSFT(KC_A))"),
            Some(KeyAction::Modified {
                mods: ModBits::LCTL | ModBits::LSFT,
                key: Keycode::A
            })
        );
    }

    #[test]
    fn test_parse_rejects_invalid() {
        let db = get_test_db();
        assert!(!db.is_valid("INVALID_KEY"));
        assert!(!db.is_valid("LT(_FN, KC_A)"));
        assert!(!db.is_valid("LT(_NUM, MO(1))"));
        assert!(!db.is_valid("FOO(KC_A)"));
        assert!(!db.is_valid("S(KX_A)"));
    }

    #[test]
    fn test_shorthands() {
        let db = get_test_db();
        assert_eq!(db.parse("TOCONFI"), Some(KeyAction::Momentary(LayerId::Config)));
        assert_eq!(
            db.parse("UT_CAP"),
            Some(KeyAction::LayerTap {
                layer: LayerId::Qwerty2,
                key: Keycode::CapsLock
            })
        );
    }

    #[test]
    fn test_display_roundtrip() {
        let db = get_test_db();
        for entry in db.search("") {
            let rendered = entry.action.to_string();
            assert_eq!(db.parse(&rendered), Some(entry.action), "{rendered}");
        }
    }

    #[test]
    fn test_search_ranking() {
        let db = get_test_db();
        let results = db.search("p0");
        assert_eq!(results[0].code, "KC_P0");

        let results = db.search("alt");
        assert!(results.iter().any(|e| e.code == "KC_LALT"));
        assert!(results.iter().any(|e| e.category == "accent"));
    }

    #[test]
    fn test_get_by_alias() {
        let db = get_test_db();
        assert_eq!(db.get("KC_ENTER").map(|e| e.code.as_str()), Some("KC_ENT"));
        assert!(db.get("KC_NOPE").is_none());
    }
}
