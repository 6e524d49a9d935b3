//! Short labels and action breakdowns for rendering keymaps.

use serde::Serialize;

use super::KeycodeDb;
use crate::models::action::{AutoShiftAction, KeyAction, RgbAction};
use crate::models::keycode::Keycode;

/// Display labels for a key.
///
/// - `primary`: Main label (always present, e.g., "A", "ESC", "á")
/// - `secondary`: Hold action, if the key has one (e.g., "NUM" for `LT`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyDisplay {
    /// Primary/main label for the key
    pub primary: String,
    /// Secondary label - optional
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
}

impl KeyDisplay {
    fn simple(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: None,
        }
    }

    /// Single-cell rendering: `TAB/NUM` or `A`.
    pub fn compact(&self) -> String {
        match &self.secondary {
            Some(secondary) => format!("{}/{}", self.primary, secondary),
            None => self.primary.clone(),
        }
    }
}

/// Type of action in a keycode breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Sent on tap
    Tap,
    /// Layer switch while held
    Layer,
    /// Modifier held with the key
    Modifier,
    /// Alt-code injection
    AltCode,
    /// Simple keycode with no multi-action behavior
    Simple,
}

/// One action within a keycode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyDetailAction {
    /// Type of action
    pub kind: ActionKind,
    /// Raw keycode or parameter (e.g., "KC_TAB", "_NUM", "0225")
    pub code: String,
    /// Human-readable description
    pub description: String,
}

/// Short labels plus the full action breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyDisplayMetadata {
    /// Short labels for in-key display
    pub display: KeyDisplay,
    /// Full action breakdown
    pub details: Vec<KeyDetailAction>,
}

fn short_key(key: Keycode) -> String {
    key.qmk_name().trim_start_matches("KC_").to_string()
}

impl KeycodeDb {
    /// Short labels for an action.
    pub fn display(&self, action: &KeyAction) -> KeyDisplay {
        match action {
            KeyAction::No => KeyDisplay::simple("XXX"),
            KeyAction::Transparent => KeyDisplay::simple("___"),
            KeyAction::Key(key) => KeyDisplay::simple(short_key(*key)),
            KeyAction::Modified { mods, key } => {
                KeyDisplay::simple(format!("{}+{}", mods, short_key(*key)))
            }
            KeyAction::LayerTap { layer, key } => KeyDisplay {
                primary: short_key(*key),
                secondary: Some(layer.name().to_string()),
            },
            KeyAction::Momentary(layer) => KeyDisplay::simple(format!("MO {}", layer.name())),
            KeyAction::Custom(accent) => KeyDisplay::simple(accent.character(false).to_string()),
            KeyAction::Rgb(rgb) => KeyDisplay::simple(match rgb {
                RgbAction::ModeForward => "RGB+",
                RgbAction::ModeReverse => "RGB-",
                RgbAction::HueUp => "HUE+",
                RgbAction::HueDown => "HUE-",
            }),
            KeyAction::AutoShift(AutoShiftAction::On) => KeyDisplay::simple("AS ON"),
            KeyAction::AutoShift(AutoShiftAction::Off) => KeyDisplay::simple("AS OFF"),
        }
    }

    /// Labels plus a per-action breakdown.
    pub fn display_metadata(&self, action: &KeyAction) -> KeyDisplayMetadata {
        let details = match action {
            KeyAction::LayerTap { layer, key } => vec![
                KeyDetailAction {
                    kind: ActionKind::Tap,
                    code: key.qmk_name().to_string(),
                    description: self.describe(key.qmk_name()),
                },
                KeyDetailAction {
                    kind: ActionKind::Layer,
                    code: layer.qmk_name().to_string(),
                    description: format!("Hold: layer {}", layer.name()),
                },
            ],
            KeyAction::Momentary(layer) => vec![KeyDetailAction {
                kind: ActionKind::Layer,
                code: layer.qmk_name().to_string(),
                description: format!("Hold: layer {}", layer.name()),
            }],
            KeyAction::Modified { mods, key } => vec![
                KeyDetailAction {
                    kind: ActionKind::Modifier,
                    code: mods.to_string(),
                    description: format!("Held with {mods}"),
                },
                KeyDetailAction {
                    kind: ActionKind::Tap,
                    code: key.qmk_name().to_string(),
                    description: self.describe(key.qmk_name()),
                },
            ],
            KeyAction::Custom(accent) => [false, true]
                .into_iter()
                .map(|upper| KeyDetailAction {
                    kind: ActionKind::AltCode,
                    code: accent.code(upper).to_string(),
                    description: format!(
                        "{} {}",
                        if upper { "Shifted:" } else { "Tap:" },
                        accent.character(upper)
                    ),
                })
                .collect(),
            other => {
                let code = other.to_string();
                vec![KeyDetailAction {
                    kind: ActionKind::Simple,
                    description: self.describe(&code),
                    code,
                }]
            }
        };

        KeyDisplayMetadata {
            display: self.display(action),
            details,
        }
    }

    fn describe(&self, code: &str) -> String {
        self.get(code)
            .map_or_else(|| code.to_string(), |entry| entry.description.clone())
    }
}
