//! Basic key identities, modifier masks and host LED state.
//!
//! Keycodes carry their QMK name and their HID usage so the same value can
//! be rendered in keymap tables, parsed back by the keycode database and
//! placed into a keyboard report.

use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

/// HID usage of a keycode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Usage {
    /// Keyboard/keypad page (0x07), sent in the keyboard report
    Keyboard(u8),
    /// Consumer page (0x0C), sent as a separate consumer report
    Consumer(u16),
}

macro_rules! keycodes {
    ($($variant:ident => $name:literal, $page:ident($usage:literal);)*) => {
        /// A basic key identity understood by the firmware runtime.
        #[allow(missing_docs)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Keycode {
            $($variant,)*
        }

        impl Keycode {
            /// Every keycode, in HID usage order.
            pub const ALL: &'static [Keycode] = &[$(Keycode::$variant,)*];

            /// Canonical QMK name (e.g. `KC_A`, `KC_P0`, `KC_LALT`).
            pub const fn qmk_name(self) -> &'static str {
                match self {
                    $(Keycode::$variant => $name,)*
                }
            }

            /// HID usage for this key.
            pub const fn usage(self) -> Usage {
                match self {
                    $(Keycode::$variant => Usage::$page($usage),)*
                }
            }
        }
    };
}

keycodes! {
    A => "KC_A", Keyboard(0x04);
    B => "KC_B", Keyboard(0x05);
    C => "KC_C", Keyboard(0x06);
    D => "KC_D", Keyboard(0x07);
    E => "KC_E", Keyboard(0x08);
    F => "KC_F", Keyboard(0x09);
    G => "KC_G", Keyboard(0x0A);
    H => "KC_H", Keyboard(0x0B);
    I => "KC_I", Keyboard(0x0C);
    J => "KC_J", Keyboard(0x0D);
    K => "KC_K", Keyboard(0x0E);
    L => "KC_L", Keyboard(0x0F);
    M => "KC_M", Keyboard(0x10);
    N => "KC_N", Keyboard(0x11);
    O => "KC_O", Keyboard(0x12);
    P => "KC_P", Keyboard(0x13);
    Q => "KC_Q", Keyboard(0x14);
    R => "KC_R", Keyboard(0x15);
    S => "KC_S", Keyboard(0x16);
    T => "KC_T", Keyboard(0x17);
    U => "KC_U", Keyboard(0x18);
    V => "KC_V", Keyboard(0x19);
    W => "KC_W", Keyboard(0x1A);
    X => "KC_X", Keyboard(0x1B);
    Y => "KC_Y", Keyboard(0x1C);
    Z => "KC_Z", Keyboard(0x1D);
    N1 => "KC_1", Keyboard(0x1E);
    N2 => "KC_2", Keyboard(0x1F);
    N3 => "KC_3", Keyboard(0x20);
    N4 => "KC_4", Keyboard(0x21);
    N5 => "KC_5", Keyboard(0x22);
    N6 => "KC_6", Keyboard(0x23);
    N7 => "KC_7", Keyboard(0x24);
    N8 => "KC_8", Keyboard(0x25);
    N9 => "KC_9", Keyboard(0x26);
    N0 => "KC_0", Keyboard(0x27);
    Enter => "KC_ENT", Keyboard(0x28);
    Escape => "KC_ESC", Keyboard(0x29);
    Backspace => "KC_BSPC", Keyboard(0x2A);
    Tab => "KC_TAB", Keyboard(0x2B);
    Space => "KC_SPC", Keyboard(0x2C);
    Minus => "KC_MINS", Keyboard(0x2D);
    Equal => "KC_EQL", Keyboard(0x2E);
    LeftBracket => "KC_LBRC", Keyboard(0x2F);
    RightBracket => "KC_RBRC", Keyboard(0x30);
    Backslash => "KC_BSLS", Keyboard(0x31);
    Semicolon => "KC_SCLN", Keyboard(0x33);
    Quote => "KC_QUOT", Keyboard(0x34);
    Grave => "KC_GRV", Keyboard(0x35);
    Comma => "KC_COMM", Keyboard(0x36);
    Dot => "KC_DOT", Keyboard(0x37);
    Slash => "KC_SLSH", Keyboard(0x38);
    CapsLock => "KC_CAPS", Keyboard(0x39);
    F1 => "KC_F1", Keyboard(0x3A);
    F2 => "KC_F2", Keyboard(0x3B);
    F3 => "KC_F3", Keyboard(0x3C);
    F4 => "KC_F4", Keyboard(0x3D);
    F5 => "KC_F5", Keyboard(0x3E);
    F6 => "KC_F6", Keyboard(0x3F);
    F7 => "KC_F7", Keyboard(0x40);
    F8 => "KC_F8", Keyboard(0x41);
    F9 => "KC_F9", Keyboard(0x42);
    F10 => "KC_F10", Keyboard(0x43);
    F11 => "KC_F11", Keyboard(0x44);
    F12 => "KC_F12", Keyboard(0x45);
    Home => "KC_HOME", Keyboard(0x4A);
    PageUp => "KC_PGUP", Keyboard(0x4B);
    Delete => "KC_DEL", Keyboard(0x4C);
    End => "KC_END", Keyboard(0x4D);
    PageDown => "KC_PGDN", Keyboard(0x4E);
    Right => "KC_RGHT", Keyboard(0x4F);
    Left => "KC_LEFT", Keyboard(0x50);
    Down => "KC_DOWN", Keyboard(0x51);
    Up => "KC_UP", Keyboard(0x52);
    NumLock => "KC_NUM", Keyboard(0x53);
    KpSlash => "KC_PSLS", Keyboard(0x54);
    KpAsterisk => "KC_PAST", Keyboard(0x55);
    KpMinus => "KC_PMNS", Keyboard(0x56);
    KpPlus => "KC_PPLS", Keyboard(0x57);
    KpEnter => "KC_PENT", Keyboard(0x58);
    Kp1 => "KC_P1", Keyboard(0x59);
    Kp2 => "KC_P2", Keyboard(0x5A);
    Kp3 => "KC_P3", Keyboard(0x5B);
    Kp4 => "KC_P4", Keyboard(0x5C);
    Kp5 => "KC_P5", Keyboard(0x5D);
    Kp6 => "KC_P6", Keyboard(0x5E);
    Kp7 => "KC_P7", Keyboard(0x5F);
    Kp8 => "KC_P8", Keyboard(0x60);
    Kp9 => "KC_P9", Keyboard(0x61);
    Kp0 => "KC_P0", Keyboard(0x62);
    KpDot => "KC_PDOT", Keyboard(0x63);
    LockingNumLock => "KC_LNUM", Keyboard(0x83);
    LCtrl => "KC_LCTL", Keyboard(0xE0);
    LShift => "KC_LSFT", Keyboard(0xE1);
    LAlt => "KC_LALT", Keyboard(0xE2);
    LGui => "KC_LGUI", Keyboard(0xE3);
    RCtrl => "KC_RCTL", Keyboard(0xE4);
    RShift => "KC_RSFT", Keyboard(0xE5);
    RAlt => "KC_RALT", Keyboard(0xE6);
    RGui => "KC_RGUI", Keyboard(0xE7);
    AudioMute => "KC_MUTE", Consumer(0x00E2);
    AudioVolUp => "KC_VOLU", Consumer(0x00E9);
    AudioVolDown => "KC_VOLD", Consumer(0x00EA);
    MissionControl => "KC_MCTL", Consumer(0x029F);
    Launchpad => "KC_LPAD", Consumer(0x02A0);
}

/// Keypad keys indexed by the decimal digit they type.
pub const KEYPAD_DIGITS: [Keycode; 10] = [
    Keycode::Kp0,
    Keycode::Kp1,
    Keycode::Kp2,
    Keycode::Kp3,
    Keycode::Kp4,
    Keycode::Kp5,
    Keycode::Kp6,
    Keycode::Kp7,
    Keycode::Kp8,
    Keycode::Kp9,
];

impl Keycode {
    /// Looks up a keycode by its canonical QMK name.
    ///
    /// Aliases (e.g. `KC_LSHIFT`) are resolved by the keycode database, not here.
    pub fn from_qmk_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|key| key.qmk_name() == name)
    }

    /// Returns the digit typed by a keypad key, if this is one.
    pub fn keypad_value(self) -> Option<u8> {
        KEYPAD_DIGITS
            .iter()
            .position(|key| *key == self)
            .map(|digit| digit as u8)
    }

    /// Modifier bit for the eight modifier keys.
    pub const fn mod_bit(self) -> Option<ModBits> {
        match self {
            Self::LCtrl => Some(ModBits::LCTL),
            Self::LShift => Some(ModBits::LSFT),
            Self::LAlt => Some(ModBits::LALT),
            Self::LGui => Some(ModBits::LGUI),
            Self::RCtrl => Some(ModBits::RCTL),
            Self::RShift => Some(ModBits::RSFT),
            Self::RAlt => Some(ModBits::RALT),
            Self::RGui => Some(ModBits::RGUI),
            _ => None,
        }
    }

    /// Returns true for the eight modifier keys.
    pub const fn is_modifier(self) -> bool {
        self.mod_bit().is_some()
    }

    /// Returns true for keys carried in the consumer report.
    pub const fn is_consumer(self) -> bool {
        matches!(self.usage(), Usage::Consumer(_))
    }
}

impl fmt::Display for Keycode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.qmk_name())
    }
}

impl Serialize for Keycode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.qmk_name())
    }
}

/// 8-bit HID modifier mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct ModBits(u8);

impl ModBits {
    /// No modifiers
    pub const NONE: Self = Self(0);
    /// Left control
    pub const LCTL: Self = Self(0x01);
    /// Left shift
    pub const LSFT: Self = Self(0x02);
    /// Left alt (Option on macOS)
    pub const LALT: Self = Self(0x04);
    /// Left GUI (Command on macOS)
    pub const LGUI: Self = Self(0x08);
    /// Right control
    pub const RCTL: Self = Self(0x10);
    /// Right shift
    pub const RSFT: Self = Self(0x20);
    /// Right alt
    pub const RALT: Self = Self(0x40);
    /// Right GUI
    pub const RGUI: Self = Self(0x80);
    /// Either shift key
    pub const SHIFT_MASK: Self = Self(0x02 | 0x20);

    /// Builds a mask from raw bits.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns true if every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if any bit of `other` is set.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns true if no modifier is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Modifier keys in this mask, left-hand keys first.
    pub fn keys(self) -> Vec<Keycode> {
        [
            Keycode::LCtrl,
            Keycode::LShift,
            Keycode::LAlt,
            Keycode::LGui,
            Keycode::RCtrl,
            Keycode::RShift,
            Keycode::RAlt,
            Keycode::RGui,
        ]
        .into_iter()
        .filter(|key| key.mod_bit().is_some_and(|bit| self.contains(bit)))
        .collect()
    }
}

impl BitOr for ModBits {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ModBits {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ModBits {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for ModBits {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl fmt::Display for ModBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        let names: Vec<&str> = self
            .keys()
            .into_iter()
            .map(|key| key.qmk_name().trim_start_matches("KC_"))
            .collect();
        f.write_str(&names.join("+"))
    }
}

/// Lock indicator bitmask reported by the host OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct LedState(u8);

impl LedState {
    /// Num lock indicator bit
    pub const NUM_LOCK: u8 = 1 << 0;
    /// Caps lock indicator bit
    pub const CAPS_LOCK: u8 = 1 << 1;
    /// Scroll lock indicator bit
    pub const SCROLL_LOCK: u8 = 1 << 2;
    /// Compose indicator bit
    pub const COMPOSE: u8 = 1 << 3;
    /// Kana indicator bit
    pub const KANA: u8 = 1 << 4;

    /// Builds a state from the raw LED byte.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Builds a state from the three lock indicators.
    pub const fn from_locks(num_lock: bool, caps_lock: bool, scroll_lock: bool) -> Self {
        let mut bits = 0;
        if num_lock {
            bits |= Self::NUM_LOCK;
        }
        if caps_lock {
            bits |= Self::CAPS_LOCK;
        }
        if scroll_lock {
            bits |= Self::SCROLL_LOCK;
        }
        Self(bits)
    }

    /// Raw LED byte.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Num lock indicator.
    pub const fn num_lock(self) -> bool {
        self.0 & Self::NUM_LOCK != 0
    }

    /// Caps lock indicator.
    pub const fn caps_lock(self) -> bool {
        self.0 & Self::CAPS_LOCK != 0
    }

    /// Scroll lock indicator.
    pub const fn scroll_lock(self) -> bool {
        self.0 & Self::SCROLL_LOCK != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qmk_name_roundtrip() {
        for key in Keycode::ALL {
            assert_eq!(Keycode::from_qmk_name(key.qmk_name()), Some(*key));
        }
    }

    #[test]
    fn test_keypad_digits() {
        assert_eq!(Keycode::Kp0.keypad_value(), Some(0));
        assert_eq!(Keycode::Kp9.keypad_value(), Some(9));
        assert_eq!(Keycode::Kp7.keypad_value(), Some(7));
        assert_eq!(Keycode::N7.keypad_value(), None);
    }

    #[test]
    fn test_mod_bits() {
        let mods = ModBits::LSFT | ModBits::RSFT;
        assert_eq!(mods, ModBits::SHIFT_MASK);
        assert!(mods.contains(ModBits::LSFT));
        assert!(!mods.contains(ModBits::LALT));
        assert_eq!(mods.keys(), vec![Keycode::LShift, Keycode::RShift]);
        assert_eq!(mods.to_string(), "LSFT+RSFT");
        assert_eq!(ModBits::NONE.to_string(), "-");
    }

    #[test]
    fn test_modifier_usage_matches_bit() {
        assert_eq!(Keycode::LAlt.usage(), Usage::Keyboard(0xE2));
        assert_eq!(Keycode::LAlt.mod_bit(), Some(ModBits::LALT));
        assert!(Keycode::AudioVolUp.is_consumer());
        assert!(!Keycode::LockingNumLock.is_modifier());
    }

    #[test]
    fn test_led_state() {
        let leds = LedState::from_locks(true, false, true);
        assert!(leds.num_lock());
        assert!(!leds.caps_lock());
        assert!(leds.scroll_lock());
        assert!(!LedState::from_bits(0b10).num_lock());
    }
}
