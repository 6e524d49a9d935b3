//! Host-side model of the Windows alt-code input method.
//!
//! While left alt is held and num lock is on, keypad digit presses are
//! collected; releasing alt types the collected code. Codes starting with a
//! zero go through the ANSI code page (Windows-1252). Codes without a
//! leading zero use the OEM code page, which is not modelled.

use crate::firmware::report::{KeyboardReport, ReportEvent};
use crate::models::keycode::{Keycode, ModBits};
use serde::Serialize;
use std::fmt;

/// What the host typed at the end of an alt-code sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodedInput {
    /// A character from the ANSI code page
    Char(char),
    /// A code this model cannot map (OEM code page, control or undefined)
    Unmapped(u32),
}

impl fmt::Display for DecodedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{c}"),
            Self::Unmapped(code) => write!(f, "<unmapped {code}>"),
        }
    }
}

// Windows-1252 0x80..=0x9F; 0 marks an undefined slot.
const CP1252_HIGH: [u32; 32] = [
    0x20AC, 0, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, 0x02C6, 0x2030, 0x0160, 0x2039,
    0x0152, 0, 0x017D, 0, 0, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013, 0x2014, 0x02DC,
    0x2122, 0x0161, 0x203A, 0x0153, 0, 0x017E, 0x0178,
];

fn windows_1252(byte: u8) -> Option<char> {
    match byte {
        0x00..=0x1F => None,
        0x80..=0x9F => match CP1252_HIGH[usize::from(byte - 0x80)] {
            0 => None,
            code => char::from_u32(code),
        },
        _ => Some(char::from(byte)),
    }
}

// Digits beyond this are ignored by the OS; they cannot change the low byte.
const MAX_DIGITS: usize = 9;

/// Turns a stream of keyboard reports into alt-code characters.
#[derive(Debug, Clone)]
pub struct AltCodeDecoder {
    previous: KeyboardReport,
    num_lock: bool,
    digits: String,
}

impl AltCodeDecoder {
    /// Creates a decoder with the host's current num lock state.
    pub fn new(num_lock_on: bool) -> Self {
        Self {
            previous: KeyboardReport::new(),
            num_lock: num_lock_on,
            digits: String::new(),
        }
    }

    /// Updates the host num lock state.
    pub fn set_num_lock(&mut self, on: bool) {
        self.num_lock = on;
    }

    /// Digits collected for a sequence that has not finished yet.
    pub fn pending_digits(&self) -> Option<&str> {
        if self.digits.is_empty() {
            None
        } else {
            Some(&self.digits)
        }
    }

    /// Feeds one report; returns the typed input when alt is released.
    pub fn observe(&mut self, report: &KeyboardReport) -> Option<DecodedInput> {
        let alt_before = self.previous.mods.contains(ModBits::LALT);
        let alt_now = report.mods.contains(ModBits::LALT);

        if alt_now && !alt_before {
            self.digits.clear();
        }

        if alt_now {
            let pressed: Vec<Keycode> = report
                .keys()
                .filter(|key| !self.previous.contains(*key))
                .collect();
            for key in pressed {
                match key.keypad_value() {
                    Some(digit) if self.num_lock => {
                        if self.digits.len() < MAX_DIGITS {
                            self.digits.push(char::from(b'0' + digit));
                        }
                    }
                    _ if matches!(key, Keycode::NumLock | Keycode::LockingNumLock) => {}
                    // Anything else (including keypad keys acting as
                    // navigation with num lock off) aborts the sequence.
                    _ => self.digits.clear(),
                }
            }
        }

        self.previous = *report;

        if alt_before && !alt_now {
            return self.finish();
        }
        None
    }

    /// Feeds one trace event; LED events update the num lock state.
    pub fn observe_event(&mut self, event: &ReportEvent) -> Option<DecodedInput> {
        match event {
            ReportEvent::Report { report } => self.observe(report),
            ReportEvent::Led { leds } => {
                self.set_num_lock(leds.num_lock());
                None
            }
            _ => None,
        }
    }

    /// Decodes a whole trace.
    pub fn decode_trace(events: &[ReportEvent], num_lock_on: bool) -> Vec<DecodedInput> {
        let mut decoder = Self::new(num_lock_on);
        events
            .iter()
            .filter_map(|event| decoder.observe_event(event))
            .collect()
    }

    fn finish(&mut self) -> Option<DecodedInput> {
        if self.digits.is_empty() {
            return None;
        }
        let digits = std::mem::take(&mut self.digits);
        let value: u32 = digits.parse().ok()?;
        if digits.starts_with('0') {
            let byte = (value % 256) as u8;
            Some(
                windows_1252(byte)
                    .map_or(DecodedInput::Unmapped(value), DecodedInput::Char),
            )
        } else {
            Some(DecodedInput::Unmapped(value))
        }
    }
}
