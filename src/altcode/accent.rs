//! Accented-character keys and their Latin-1 code pairs.

use super::AltCode;
use serde::Serialize;
use std::fmt;

/// One of the six accent keys (`KX_A` .. `KX_N`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AccentKey {
    /// á / Á
    A,
    /// é / É
    E,
    /// í / Í
    I,
    /// ó / Ó
    O,
    /// ú / Ú
    U,
    /// ñ / Ñ
    N,
}

struct AccentEntry {
    qmk_name: &'static str,
    lower: AltCode,
    upper: AltCode,
    lower_char: char,
    upper_char: char,
}

// Indexed by `AccentKey as usize`.
static ACCENTS: [AccentEntry; 6] = [
    AccentEntry {
        qmk_name: "KX_A",
        lower: AltCode(225),
        upper: AltCode(193),
        lower_char: 'á',
        upper_char: 'Á',
    },
    AccentEntry {
        qmk_name: "KX_E",
        lower: AltCode(233),
        upper: AltCode(201),
        lower_char: 'é',
        upper_char: 'É',
    },
    AccentEntry {
        qmk_name: "KX_I",
        lower: AltCode(237),
        upper: AltCode(205),
        lower_char: 'í',
        upper_char: 'Í',
    },
    AccentEntry {
        qmk_name: "KX_O",
        lower: AltCode(243),
        upper: AltCode(211),
        lower_char: 'ó',
        upper_char: 'Ó',
    },
    AccentEntry {
        qmk_name: "KX_U",
        lower: AltCode(250),
        upper: AltCode(218),
        lower_char: 'ú',
        upper_char: 'Ú',
    },
    AccentEntry {
        qmk_name: "KX_N",
        lower: AltCode(241),
        upper: AltCode(209),
        lower_char: 'ñ',
        upper_char: 'Ñ',
    },
];

impl AccentKey {
    /// All accent keys, in keycode order.
    pub const ALL: [AccentKey; 6] = [
        AccentKey::A,
        AccentKey::E,
        AccentKey::I,
        AccentKey::O,
        AccentKey::U,
        AccentKey::N,
    ];

    fn entry(self) -> &'static AccentEntry {
        &ACCENTS[self as usize]
    }

    /// Custom keycode name (`KX_A`).
    pub fn qmk_name(self) -> &'static str {
        self.entry().qmk_name
    }

    /// Looks up an accent key by its custom keycode name.
    pub fn from_qmk_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.qmk_name() == name)
    }

    /// Lower- and upper-case alt codes.
    pub fn codes(self) -> (AltCode, AltCode) {
        let entry = self.entry();
        (entry.lower, entry.upper)
    }

    /// Alt code for the requested case.
    pub fn code(self, upper: bool) -> AltCode {
        if upper {
            self.entry().upper
        } else {
            self.entry().lower
        }
    }

    /// Character produced for the requested case.
    pub fn character(self, upper: bool) -> char {
        if upper {
            self.entry().upper_char
        } else {
            self.entry().lower_char
        }
    }
}

impl fmt::Display for AccentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.qmk_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_pairs() {
        let pairs: Vec<(u16, u16)> = AccentKey::ALL
            .iter()
            .map(|key| {
                let (lower, upper) = key.codes();
                (lower.value(), upper.value())
            })
            .collect();
        assert_eq!(
            pairs,
            vec![
                (225, 193),
                (233, 201),
                (237, 205),
                (243, 211),
                (250, 218),
                (241, 209)
            ]
        );
    }

    #[test]
    fn test_codes_are_latin1_codepoints() {
        for key in AccentKey::ALL {
            for upper in [false, true] {
                let expected = char::from_u32(u32::from(key.code(upper).value()));
                assert_eq!(expected, Some(key.character(upper)), "{key} upper={upper}");
            }
        }
    }

    #[test]
    fn test_from_qmk_name() {
        assert_eq!(AccentKey::from_qmk_name("KX_O"), Some(AccentKey::O));
        assert_eq!(AccentKey::from_qmk_name("KX_Z"), None);
    }
}
