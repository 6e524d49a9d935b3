//! Key actions and layer identities used by the keymap tables.

use crate::altcode::AccentKey;
use crate::models::keycode::{Keycode, ModBits};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Layers of the keymap, in stacking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerId {
    /// Base QWERTY layer
    Qwerty,
    /// QWERTY with accent keys and swapped Option/Command
    Qwerty2,
    /// Function row and numeric keypad
    Num,
    /// RGB and auto-shift controls
    Config,
}

impl LayerId {
    /// All layers, lowest first.
    pub const ALL: [LayerId; 4] = [
        LayerId::Qwerty,
        LayerId::Qwerty2,
        LayerId::Num,
        LayerId::Config,
    ];

    /// Layer index in the layer bitmask.
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Layer with the given index.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Name as written in keymap sources (`_QWERTY`).
    pub const fn qmk_name(self) -> &'static str {
        match self {
            Self::Qwerty => "_QWERTY",
            Self::Qwerty2 => "_QWERTY2",
            Self::Num => "_NUM",
            Self::Config => "_CONFIG",
        }
    }

    /// Human-readable name (`QWERTY`).
    pub fn name(self) -> &'static str {
        self.qmk_name().trim_start_matches('_')
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayerId {
    type Err = String;

    /// Accepts `_QWERTY2`, `QWERTY2`, `qwerty2` or a numeric index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<u8>() {
            return Self::from_index(index).ok_or_else(|| format!("Unknown layer index: {index}"));
        }
        let normalized = trimmed.trim_start_matches('_').to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|layer| layer.name() == normalized)
            .ok_or_else(|| format!("Unknown layer: '{s}'"))
    }
}

impl Serialize for LayerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// 32-bit layer bitmask, as kept by the runtime for active and default layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct LayerState(u32);

impl LayerState {
    /// No layer set
    pub const EMPTY: Self = Self(0);

    /// Builds a state from raw bits.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// State with only `layer` set (`1 << layer`).
    pub const fn only(layer: LayerId) -> Self {
        Self(1 << layer.index())
    }

    /// Raw bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns a copy with `layer` set.
    pub const fn with(self, layer: LayerId) -> Self {
        Self(self.0 | (1 << layer.index()))
    }

    /// Returns a copy with `layer` cleared.
    pub const fn without(self, layer: LayerId) -> Self {
        Self(self.0 & !(1 << layer.index()))
    }

    /// Returns true if the layer bit with this index is set.
    pub const fn contains_index(self, index: u8) -> bool {
        index < 32 && self.0 & (1 << index) != 0
    }

    /// Returns true if `layer` is set.
    pub const fn contains(self, layer: LayerId) -> bool {
        self.contains_index(layer.index())
    }

    /// Index of the highest set layer, 0 when empty.
    pub const fn highest(self) -> u8 {
        if self.0 == 0 {
            0
        } else {
            (31 - self.0.leading_zeros()) as u8
        }
    }

    /// Union of two states.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// RGB matrix control keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RgbAction {
    /// Next lighting mode (`RGB_MOD`)
    ModeForward,
    /// Previous lighting mode (`RGB_RMOD`)
    ModeReverse,
    /// Increase hue (`RGB_HUI`)
    HueUp,
    /// Decrease hue (`RGB_HUD`)
    HueDown,
}

impl RgbAction {
    /// QMK keycode name.
    pub const fn qmk_name(self) -> &'static str {
        match self {
            Self::ModeForward => "RGB_MOD",
            Self::ModeReverse => "RGB_RMOD",
            Self::HueUp => "RGB_HUI",
            Self::HueDown => "RGB_HUD",
        }
    }
}

/// Auto-shift toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AutoShiftAction {
    /// `KC_ASON`
    On,
    /// `KC_ASOFF`
    Off,
}

/// What a key position does when pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// No action (`KC_NO` / `XXXXXXX`)
    No,
    /// Fall through to the next active layer (`KC_TRNS` / `_______`)
    Transparent,
    /// Plain key
    Key(Keycode),
    /// Key sent together with modifiers (`S(KC_GRV)`, `LGUI(KC_TAB)`)
    Modified {
        /// Modifiers held with the key
        mods: ModBits,
        /// The key itself
        key: Keycode,
    },
    /// Layer while held, key when tapped (`LT(_NUM, KC_TAB)`)
    LayerTap {
        /// Layer activated while held
        layer: LayerId,
        /// Key sent on tap
        key: Keycode,
    },
    /// Layer while held (`MO(_CONFIG)`)
    Momentary(LayerId),
    /// Accented character sent as an alt code (`KX_A`..`KX_N`)
    Custom(AccentKey),
    /// RGB matrix control
    Rgb(RgbAction),
    /// Auto-shift toggle
    AutoShift(AutoShiftAction),
}

impl KeyAction {
    /// Returns true for `KC_TRNS`.
    pub const fn is_transparent(&self) -> bool {
        matches!(self, Self::Transparent)
    }

    /// Layer this action can activate, if any.
    pub const fn layer_target(&self) -> Option<LayerId> {
        match self {
            Self::LayerTap { layer, .. } | Self::Momentary(layer) => Some(*layer),
            _ => None,
        }
    }

    /// Accent key, if this is one of the custom keycodes.
    pub const fn accent(&self) -> Option<AccentKey> {
        match self {
            Self::Custom(accent) => Some(*accent),
            _ => None,
        }
    }
}

/// Modifier wrapper names, applied innermost-first from the left modifiers.
const MOD_WRAPPERS: [(ModBits, &str); 8] = [
    (ModBits::LCTL, "LCTL"),
    (ModBits::LSFT, "S"),
    (ModBits::LALT, "LALT"),
    (ModBits::LGUI, "LGUI"),
    (ModBits::RCTL, "RCTL"),
    (ModBits::RSFT, "RSFT"),
    (ModBits::RALT, "RALT"),
    (ModBits::RGUI, "RGUI"),
];

impl fmt::Display for KeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::No => f.write_str("KC_NO"),
            Self::Transparent => f.write_str("KC_TRNS"),
            Self::Key(key) => f.write_str(key.qmk_name()),
            Self::Modified { mods, key } => {
                let mut rendered = key.qmk_name().to_string();
                for (bit, wrapper) in MOD_WRAPPERS {
                    if mods.contains(bit) {
                        rendered = format!("{wrapper}({rendered})");
                    }
                }
                f.write_str(&rendered)
            }
            Self::LayerTap { layer, key } => {
                write!(f, "LT({}, {})", layer.qmk_name(), key.qmk_name())
            }
            Self::Momentary(layer) => write!(f, "MO({})", layer.qmk_name()),
            Self::Custom(accent) => f.write_str(accent.qmk_name()),
            Self::Rgb(action) => f.write_str(action.qmk_name()),
            Self::AutoShift(AutoShiftAction::On) => f.write_str("KC_ASON"),
            Self::AutoShift(AutoShiftAction::Off) => f.write_str("KC_ASOFF"),
        }
    }
}

impl Serialize for KeyAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_id_parse() {
        assert_eq!("_QWERTY2".parse::<LayerId>().unwrap(), LayerId::Qwerty2);
        assert_eq!("num".parse::<LayerId>().unwrap(), LayerId::Num);
        assert_eq!("3".parse::<LayerId>().unwrap(), LayerId::Config);
        assert!("_FN".parse::<LayerId>().is_err());
        assert!("9".parse::<LayerId>().is_err());
    }

    #[test]
    fn test_layer_state_highest() {
        assert_eq!(LayerState::EMPTY.highest(), 0);
        let state = LayerState::only(LayerId::Qwerty).with(LayerId::Num);
        assert_eq!(state.highest(), 2);
        assert!(state.contains(LayerId::Num));
        assert!(!state.without(LayerId::Num).contains(LayerId::Num));
        assert_eq!(LayerState::only(LayerId::Qwerty2).bits(), 0b10);
    }

    #[test]
    fn test_action_display() {
        let wave = KeyAction::Modified {
            mods: ModBits::LSFT,
            key: Keycode::Grave,
        };
        assert_eq!(wave.to_string(), "S(KC_GRV)");

        let task = KeyAction::Modified {
            mods: ModBits::LGUI,
            key: Keycode::Tab,
        };
        assert_eq!(task.to_string(), "LGUI(KC_TAB)");

        let tab = KeyAction::LayerTap {
            layer: LayerId::Num,
            key: Keycode::Tab,
        };
        assert_eq!(tab.to_string(), "LT(_NUM, KC_TAB)");
        assert_eq!(tab.layer_target(), Some(LayerId::Num));

        assert_eq!(KeyAction::Momentary(LayerId::Config).to_string(), "MO(_CONFIG)");
        assert_eq!(KeyAction::Custom(AccentKey::N).to_string(), "KX_N");
        assert_eq!(KeyAction::Rgb(RgbAction::HueDown).to_string(), "RGB_HUD");
        assert_eq!(KeyAction::AutoShift(AutoShiftAction::Off).to_string(), "KC_ASOFF");
    }
}
