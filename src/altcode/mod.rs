//! Alt-code typing: the code value, the accent table, the injector that
//! drives the keyboard state through an alt-code sequence, and a model of
//! the host OS input method that turns that sequence back into characters.

pub mod accent;
pub mod decoder;
pub mod injector;

pub use accent::AccentKey;
pub use decoder::{AltCodeDecoder, DecodedInput};
pub use injector::{AltCodeInjector, SavedInputState};

use crate::models::keycode::{Keycode, KEYPAD_DIGITS};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Largest value that fits in four decimal digits.
pub const MAX_ALT_CODE: u16 = 9999;

/// A numeric alt code in `0..=9999`, always transmitted as four digits.
///
/// Leading zeros are implicit: `AltCode::new(225)` types `0 2 2 5`, which the
/// Windows input method decodes through the ANSI code page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AltCode(u16);

impl AltCode {
    /// Creates an alt code, rejecting values that need more than four digits.
    pub const fn new(value: u16) -> Result<Self, AltCodeError> {
        if value > MAX_ALT_CODE {
            Err(AltCodeError::OutOfRange(value as u32))
        } else {
            Ok(Self(value))
        }
    }

    /// Numeric value.
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Thousands, hundreds, tens and ones, most significant first.
    pub const fn digits(self) -> [u8; 4] {
        let v = self.0;
        [
            (v / 1000 % 10) as u8,
            (v / 100 % 10) as u8,
            (v / 10 % 10) as u8,
            (v % 10) as u8,
        ]
    }

    /// Keypad keys for the four digits, in transmission order.
    pub fn keypad_keys(self) -> [Keycode; 4] {
        self.digits().map(|digit| KEYPAD_DIGITS[usize::from(digit)])
    }
}

impl TryFrom<u16> for AltCode {
    type Error = AltCodeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for AltCode {
    type Err = AltCodeError;

    /// Parses a decimal code; leading zeros are accepted (`"0225"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(AltCodeError::NotANumber(s.to_string()));
        }
        let value: u32 = trimmed
            .parse()
            .map_err(|_| AltCodeError::OutOfRange(u32::MAX))?;
        let value = u16::try_from(value).map_err(|_| AltCodeError::OutOfRange(value))?;
        Self::new(value)
    }
}

impl fmt::Display for AltCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// Rejected alt-code input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AltCodeError {
    /// Value needs more than four decimal digits
    OutOfRange(u32),
    /// Input is not a decimal number
    NotANumber(String),
}

impl fmt::Display for AltCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange(value) if *value == u32::MAX => {
                write!(f, "alt code out of range (max {MAX_ALT_CODE})")
            }
            Self::OutOfRange(value) => {
                write!(f, "alt code {value} out of range (max {MAX_ALT_CODE})")
            }
            Self::NotANumber(input) => write!(f, "alt code '{input}' is not a decimal number"),
        }
    }
}

impl std::error::Error for AltCodeError {}
