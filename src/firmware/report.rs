//! Keyboard reports and the trace of what reached the host.

use crate::models::action::LayerState;
use crate::models::keycode::{Keycode, LedState, ModBits};
use serde::{Serialize, Serializer};
use std::fmt;

use super::host::Direction;

/// Number of non-modifier key slots in a boot-protocol report.
pub const REPORT_KEYS: usize = 6;

/// Six-key-rollover keyboard report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct KeyboardReport {
    /// Held modifiers
    pub mods: ModBits,
    #[serde(serialize_with = "serialize_slots")]
    keys: [Option<Keycode>; REPORT_KEYS],
}

fn serialize_slots<S: Serializer>(
    keys: &[Option<Keycode>; REPORT_KEYS],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(keys.iter().flatten())
}

impl KeyboardReport {
    /// Empty report.
    pub const fn new() -> Self {
        Self {
            mods: ModBits::NONE,
            keys: [None; REPORT_KEYS],
        }
    }

    /// Puts a key in the first free slot.
    ///
    /// Returns false when the key is already present or all slots are taken.
    pub fn add_key(&mut self, key: Keycode) -> bool {
        if self.contains(key) {
            return false;
        }
        match self.keys.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(key);
                true
            }
            None => false,
        }
    }

    /// Clears the slot holding `key`. Returns false when it was not present.
    pub fn del_key(&mut self, key: Keycode) -> bool {
        match self.keys.iter_mut().find(|slot| **slot == Some(key)) {
            Some(slot) => {
                *slot = None;
                true
            }
            None => false,
        }
    }

    /// Returns true if `key` occupies a slot.
    pub fn contains(&self, key: Keycode) -> bool {
        self.keys.contains(&Some(key))
    }

    /// Keys in slot order.
    pub fn keys(&self) -> impl Iterator<Item = Keycode> + '_ {
        self.keys.iter().flatten().copied()
    }

    /// Returns true if no key or modifier is held.
    pub fn is_empty(&self) -> bool {
        self.mods.is_empty() && self.keys.iter().all(Option::is_none)
    }
}

impl fmt::Display for KeyboardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mods={}", self.mods)?;
        let keys: Vec<&str> = self.keys().map(Keycode::qmk_name).collect();
        if keys.is_empty() {
            f.write_str(" keys=-")
        } else {
            write!(f, " keys={}", keys.join(","))
        }
    }
}

/// Something the runtime sent to, or received from, the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReportEvent {
    /// A flushed keyboard report
    Report {
        /// Report contents at flush time
        report: KeyboardReport,
    },
    /// Consumer-page key transition
    Consumer {
        /// Consumer key
        key: Keycode,
        /// Press or release
        pressed: bool,
    },
    /// Host lock indicators changed
    Led {
        /// New LED state
        leds: LedState,
    },
    /// Active layer state changed
    Layer {
        /// New state
        state: LayerState,
    },
    /// Default layer state changed
    DefaultLayer {
        /// New state
        state: LayerState,
    },
    /// RGB hue stepped
    RgbHue {
        /// Step direction
        direction: Direction,
    },
    /// RGB effect mode stepped
    RgbMode {
        /// Step direction
        direction: Direction,
    },
    /// Auto-shift toggled
    AutoShift {
        /// New auto-shift state
        enabled: bool,
    },
}

impl fmt::Display for ReportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Report { report } => write!(f, "report   {report}"),
            Self::Consumer { key, pressed } => write!(
                f,
                "consumer {} {}",
                key,
                if *pressed { "down" } else { "up" }
            ),
            Self::Led { leds } => write!(
                f,
                "leds     num={} caps={} scroll={}",
                leds.num_lock(),
                leds.caps_lock(),
                leds.scroll_lock()
            ),
            Self::Layer { state } => write!(f, "layers   {:#06b}", state.bits()),
            Self::DefaultLayer { state } => write!(f, "default  {:#06b}", state.bits()),
            Self::RgbHue { direction } => write!(f, "rgb hue  {direction:?}"),
            Self::RgbMode { direction } => write!(f, "rgb mode {direction:?}"),
            Self::AutoShift { enabled } => write!(f, "autoshift {enabled}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_del_key() {
        let mut report = KeyboardReport::new();
        assert!(report.add_key(Keycode::Kp2));
        assert!(!report.add_key(Keycode::Kp2));
        assert!(report.contains(Keycode::Kp2));
        assert!(report.del_key(Keycode::Kp2));
        assert!(!report.del_key(Keycode::Kp2));
        assert!(report.is_empty());
    }

    #[test]
    fn test_full_report_drops_key() {
        let mut report = KeyboardReport::new();
        for key in [
            Keycode::A,
            Keycode::B,
            Keycode::C,
            Keycode::D,
            Keycode::E,
            Keycode::F,
        ] {
            assert!(report.add_key(key));
        }
        assert!(!report.add_key(Keycode::G));
        assert_eq!(report.keys().count(), REPORT_KEYS);
    }

    #[test]
    fn test_report_json_lists_held_keys() {
        let mut report = KeyboardReport::new();
        report.mods = ModBits::LALT;
        report.add_key(Keycode::Kp0);
        let json = serde_json::to_value(ReportEvent::Report { report }).unwrap();
        assert_eq!(json["event"], "report");
        assert_eq!(json["report"]["mods"], 4);
        assert_eq!(json["report"]["keys"][0], "KC_P0");
    }

    #[test]
    fn test_report_display() {
        let mut report = KeyboardReport::new();
        assert_eq!(report.to_string(), "mods=- keys=-");
        report.mods = ModBits::LALT;
        report.add_key(Keycode::LockingNumLock);
        assert_eq!(report.to_string(), "mods=LALT keys=KC_LNUM");
    }
}
