//! Keymap: four layers of key actions on the 67-key ANSI matrix.

use crate::keycode_db::KeycodeDb;
use crate::models::action::{KeyAction, LayerId, LayerState};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Keys per row on the 67-key ANSI board.
pub const ROW_LENGTHS: [usize; 5] = [15, 15, 14, 13, 10];

/// Name of the built-in keymap.
pub const BUILTIN_NAME: &str = "caomonty";

/// One layer: rows of actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layer {
    /// Which layer this is
    pub id: LayerId,
    /// Actions, row by row
    pub rows: Vec<Vec<KeyAction>>,
}

impl Layer {
    /// Action at a position, if the position exists on this layer.
    pub fn get(&self, row: usize, col: usize) -> Option<KeyAction> {
        self.rows.get(row).and_then(|keys| keys.get(col)).copied()
    }

    /// Number of keys on the layer.
    pub fn key_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Positions and actions that are not transparent.
    pub fn assigned(&self) -> impl Iterator<Item = (usize, usize, KeyAction)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, keys)| {
            keys.iter()
                .enumerate()
                .filter(|(_, action)| !action.is_transparent())
                .map(move |(col, action)| (row, col, *action))
        })
    }
}

/// A full keymap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Keymap {
    /// Keymap name
    pub name: String,
    /// Layers, in any order
    pub layers: Vec<Layer>,
}

/// On-disk TOML shape: keycodes as the names used in keymap sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct KeymapFile {
    name: String,
    #[serde(default, rename = "layer")]
    layers: Vec<LayerFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LayerFile {
    id: String,
    rows: Vec<Vec<String>>,
}

const QWERTY: [&[&str]; 5] = [
    &[
        "KC_ESC", "KC_1", "KC_2", "KC_3", "KC_4", "KC_5", "KC_6", "KC_7", "KC_8", "KC_9", "KC_0",
        "KC_MINS", "KC_EQL", "KC_BSPC", "KC_MUTE",
    ],
    &[
        "UT_TAB", "KC_Q", "KC_W", "KC_E", "KC_R", "KC_T", "KC_Y", "KC_U", "KC_I", "KC_O", "KC_P",
        "KC_LBRC", "KC_RBRC", "KC_BSLS", "KC_DEL",
    ],
    &[
        "UT_CAP", "KC_A", "KC_S", "KC_D", "KC_F", "KC_G", "KC_H", "KC_J", "KC_K", "KC_L",
        "KC_SCLN", "KC_QUOT", "UT_ENT", "KC_HOME",
    ],
    &[
        "KC_LSFT", "KC_Z", "KC_X", "KC_C", "KC_V", "KC_B", "KC_N", "KC_M", "KC_COMM", "KC_DOT",
        "KC_SLSH", "KC_RSFT", "KC_UP",
    ],
    &[
        "KC_LCTL", "KC_LCMD", "KC_LOPT", "KC_SPC", "KC_RCMD", "XXXXXXX", "TOCONFI", "KC_LEFT",
        "KC_DOWN", "KC_RGHT",
    ],
];

// Overlay layers: (row, col, keycode); every other position is transparent.
const QWERTY2: &[(usize, usize, &str)] = &[
    (1, 3, "KX_E"),
    (1, 7, "KX_U"),
    (1, 8, "KX_I"),
    (1, 9, "KX_O"),
    (2, 1, "KX_A"),
    (3, 6, "KX_N"),
    (4, 1, "KC_LOPT"),
    (4, 2, "KC_LCMD"),
];

const NUM: &[(usize, usize, &str)] = &[
    (0, 1, "KC_F1"),
    (0, 2, "KC_F2"),
    (0, 3, "KC_F3"),
    (0, 4, "KC_F4"),
    (0, 5, "KC_F5"),
    (0, 6, "KC_F6"),
    (0, 7, "KC_F7"),
    (0, 8, "KC_F8"),
    (0, 9, "KC_F9"),
    (0, 10, "KC_F10"),
    (0, 11, "KC_F11"),
    (0, 12, "KC_F12"),
    (1, 7, "KC_P7"),
    (1, 8, "KC_P8"),
    (1, 9, "KC_P9"),
    (1, 10, "KC_PSLS"),
    (2, 7, "KC_P4"),
    (2, 8, "KC_P5"),
    (2, 9, "KC_P6"),
    (2, 10, "KC_PAST"),
    (3, 7, "KC_P1"),
    (3, 8, "KC_P2"),
    (3, 9, "KC_P3"),
    (3, 10, "KC_PMNS"),
    (4, 3, "KC_P0"),
    (4, 4, "KC_PDOT"),
    (4, 5, "KC_PPLS"),
];

const CONFIG: &[(usize, usize, &str)] = &[
    (1, 2, "RGB_MOD"),
    (1, 3, "RGB_HUI"),
    (2, 2, "RGB_RMOD"),
    (2, 3, "RGB_HUD"),
    (3, 12, "KC_ASON"),
    (4, 8, "KC_ASOFF"),
];

fn parse_key(
    db: &KeycodeDb,
    layer: LayerId,
    row: usize,
    col: usize,
    code: &str,
) -> Result<KeyAction> {
    db.parse(code).with_context(|| {
        format!(
            "Unknown keycode '{}' on layer {} at row {}, col {}",
            code, layer, row, col
        )
    })
}

fn overlay(db: &KeycodeDb, id: LayerId, keys: &[(usize, usize, &str)]) -> Result<Layer> {
    let mut rows: Vec<Vec<KeyAction>> = ROW_LENGTHS
        .iter()
        .map(|len| vec![KeyAction::Transparent; *len])
        .collect();
    for (row, col, code) in keys {
        let action = parse_key(db, id, *row, *col, code)?;
        let slot = rows
            .get_mut(*row)
            .and_then(|keys| keys.get_mut(*col))
            .with_context(|| format!("Position ({row}, {col}) is off the board"))?;
        *slot = action;
    }
    Ok(Layer { id, rows })
}

impl Keymap {
    /// The keymap the firmware ships with.
    pub fn builtin(db: &KeycodeDb) -> Result<Self> {
        let base_rows = QWERTY
            .iter()
            .enumerate()
            .map(|(row, codes)| {
                codes
                    .iter()
                    .enumerate()
                    .map(|(col, code)| parse_key(db, LayerId::Qwerty, row, col, code))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: BUILTIN_NAME.to_string(),
            layers: vec![
                Layer {
                    id: LayerId::Qwerty,
                    rows: base_rows,
                },
                overlay(db, LayerId::Qwerty2, QWERTY2)?,
                overlay(db, LayerId::Num, NUM)?,
                overlay(db, LayerId::Config, CONFIG)?,
            ],
        })
    }

    /// Parses a keymap from TOML.
    ///
    /// ```toml
    /// name = "mine"
    ///
    /// [[layer]]
    /// id = "_QWERTY"
    /// rows = [["KC_ESC", "KC_1"], ["UT_TAB"]]
    /// ```
    pub fn from_toml_str(content: &str, db: &KeycodeDb) -> Result<Self> {
        let file: KeymapFile = toml::from_str(content).context("Failed to parse keymap TOML")?;

        let layers = file
            .layers
            .into_iter()
            .map(|layer| -> Result<Layer> {
                let id: LayerId = layer
                    .id
                    .parse()
                    .map_err(|e: String| anyhow::anyhow!(e))?;
                let rows = layer
                    .rows
                    .iter()
                    .enumerate()
                    .map(|(row, codes)| {
                        codes
                            .iter()
                            .enumerate()
                            .map(|(col, code)| parse_key(db, id, row, col, code))
                            .collect::<Result<Vec<_>>>()
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Layer { id, rows })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: file.name,
            layers,
        })
    }

    /// Loads a keymap TOML file.
    pub fn from_toml_file(path: &Path, db: &KeycodeDb) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read keymap file: {}", path.display()))?;
        Self::from_toml_str(&content, db)
            .with_context(|| format!("Invalid keymap file: {}", path.display()))
    }

    /// Serializes to the TOML format read by [`Keymap::from_toml_str`].
    pub fn to_toml_string(&self) -> Result<String> {
        let file = KeymapFile {
            name: self.name.clone(),
            layers: self
                .layers
                .iter()
                .map(|layer| LayerFile {
                    id: layer.id.qmk_name().to_string(),
                    rows: layer
                        .rows
                        .iter()
                        .map(|keys| keys.iter().map(ToString::to_string).collect())
                        .collect(),
                })
                .collect(),
        };
        toml::to_string_pretty(&file).context("Failed to serialize keymap")
    }

    /// Layer by id.
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    /// Resolves the action at a position the way the runtime does: the
    /// highest active layer whose action there is not transparent wins, and
    /// layer 0 answers when no active layer does.
    ///
    /// Returns `None` if the position is not on the board.
    pub fn resolve(
        &self,
        layer_state: LayerState,
        default_layer_state: LayerState,
        row: usize,
        col: usize,
    ) -> Option<(LayerId, KeyAction)> {
        if ROW_LENGTHS.get(row).map_or(true, |len| col >= *len) {
            return None;
        }

        let active = layer_state.union(default_layer_state);
        for id in LayerId::ALL.into_iter().rev() {
            if !active.contains(id) {
                continue;
            }
            if let Some(action) = self.layer(id).and_then(|layer| layer.get(row, col)) {
                if !action.is_transparent() {
                    return Some((id, action));
                }
            }
        }

        // Nothing active defines the key: the runtime falls back to layer 0.
        let base = self
            .layer(LayerId::Qwerty)
            .and_then(|layer| layer.get(row, col))
            .filter(|action| !action.is_transparent())
            .unwrap_or(KeyAction::No);
        Some((LayerId::Qwerty, base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::altcode::AccentKey;
    use crate::models::keycode::Keycode;

    fn builtin() -> Keymap {
        let db = KeycodeDb::load().unwrap();
        Keymap::builtin(&db).unwrap()
    }

    #[test]
    fn test_builtin_shape() {
        let keymap = builtin();
        assert_eq!(keymap.layers.len(), 4);
        for layer in &keymap.layers {
            let lengths: Vec<usize> = layer.rows.iter().map(Vec::len).collect();
            assert_eq!(lengths, ROW_LENGTHS.to_vec(), "layer {}", layer.id);
            assert_eq!(layer.key_count(), 67);
        }
    }

    #[test]
    fn test_accent_positions() {
        let keymap = builtin();
        let qwerty2 = keymap.layer(LayerId::Qwerty2).unwrap();
        assert_eq!(qwerty2.get(2, 1), Some(KeyAction::Custom(AccentKey::A)));
        assert_eq!(qwerty2.get(1, 3), Some(KeyAction::Custom(AccentKey::E)));
        assert_eq!(qwerty2.get(3, 6), Some(KeyAction::Custom(AccentKey::N)));
        assert_eq!(qwerty2.assigned().count(), 8);
    }

    #[test]
    fn test_resolve_falls_through_transparent() {
        let keymap = builtin();
        let default = LayerState::only(LayerId::Qwerty2);

        // 'A' position on QWERTY2 is an accent key
        assert_eq!(
            keymap.resolve(LayerState::EMPTY, default, 2, 1),
            Some((LayerId::Qwerty2, KeyAction::Custom(AccentKey::A)))
        );
        // 'S' is transparent on QWERTY2; QWERTY answers even though it is
        // not in the default state
        assert_eq!(
            keymap.resolve(LayerState::EMPTY, default, 2, 2),
            Some((LayerId::Qwerty, KeyAction::Key(Keycode::S)))
        );
        let config = LayerState::only(LayerId::Config);
        assert_eq!(
            keymap.resolve(config, default, 2, 3),
            Some((LayerId::Config, KeyAction::Rgb(crate::models::action::RgbAction::HueDown)))
        );
    }

    #[test]
    fn test_resolve_num_layer_keypad() {
        let keymap = builtin();
        let active = LayerState::only(LayerId::Num);
        let default = LayerState::only(LayerId::Qwerty);
        assert_eq!(
            keymap.resolve(active, default, 1, 7),
            Some((LayerId::Num, KeyAction::Key(Keycode::Kp7)))
        );
        assert_eq!(keymap.resolve(active, default, 4, 10), None);
    }

    #[test]
    fn test_toml_roundtrip() {
        let db = KeycodeDb::load().unwrap();
        let keymap = Keymap::builtin(&db).unwrap();
        let text = keymap.to_toml_string().unwrap();
        assert!(text.contains("LT(_NUM, KC_TAB)"));
        let parsed = Keymap::from_toml_str(&text, &db).unwrap();
        assert_eq!(parsed, keymap);
    }

    #[test]
    fn test_unknown_keycode_reports_position() {
        let db = KeycodeDb::load().unwrap();
        let text = r#"
name = "broken"

[[layer]]
id = "_QWERTY"
rows = [["KC_ESC", "KC_BOGUS"]]
"#;
        let err = Keymap::from_toml_str(text, &db).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("KC_BOGUS"));
        assert!(message.contains("col 1"));
    }
}
