//! Build-time firmware options and `config.h` generation.

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};

/// Note length in a QMK song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteDuration {
    /// `W__NOTE`
    Whole,
    /// `H__NOTE`
    Half,
    /// `QD_NOTE`
    QuarterDot,
    /// `Q__NOTE`
    Quarter,
    /// `E__NOTE`
    Eighth,
    /// `S__NOTE`
    Sixteenth,
}

impl NoteDuration {
    /// QMK note macro.
    pub const fn macro_name(self) -> &'static str {
        match self {
            Self::Whole => "W__NOTE",
            Self::Half => "H__NOTE",
            Self::QuarterDot => "QD_NOTE",
            Self::Quarter => "Q__NOTE",
            Self::Eighth => "E__NOTE",
            Self::Sixteenth => "S__NOTE",
        }
    }
}

/// One note of a song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Note length
    pub duration: NoteDuration,
    /// QMK pitch name (`_F4`, `_CS5`, `_REST`)
    pub pitch: String,
}

impl Note {
    fn new(duration: NoteDuration, pitch: &str) -> Self {
        Self {
            duration,
            pitch: pitch.to_string(),
        }
    }
}

/// Which song plays at power-up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupSong {
    /// The keymap's own song (F4, A5, G4, E4, F4)
    #[default]
    Keymap,
    /// Leave `STARTUP_SONG` undefined so the firmware picks its own
    Firmware,
    /// `SONG(NO_SOUND)`
    Silent,
    /// An explicit list of notes
    Custom(Vec<Note>),
}

impl StartupSong {
    /// F4, A5, G4, E4, F4 with two rests.
    pub fn keymap_notes() -> Vec<Note> {
        vec![
            Note::new(NoteDuration::QuarterDot, "_F4"),
            Note::new(NoteDuration::Eighth, "_REST"),
            Note::new(NoteDuration::QuarterDot, "_A5"),
            Note::new(NoteDuration::Eighth, "_REST"),
            Note::new(NoteDuration::Quarter, "_G4"),
            Note::new(NoteDuration::Quarter, "_E4"),
            Note::new(NoteDuration::QuarterDot, "_F4"),
        ]
    }

    /// Argument of `SONG(..)`, or `None` when the macro is left undefined.
    fn song_body(&self) -> Option<String> {
        let render = |notes: &[Note]| -> String {
            let notes: String = notes
                .iter()
                .map(|note| format!("{}({}), ", note.duration.macro_name(), note.pitch))
                .collect();
            notes.trim_end().to_string()
        };
        match self {
            Self::Keymap => Some(render(&Self::keymap_notes())),
            Self::Firmware => None,
            Self::Silent => Some("NO_SOUND".to_string()),
            Self::Custom(notes) => Some(render(notes)),
        }
    }
}

impl fmt::Display for StartupSong {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keymap => write!(f, "keymap ({} notes)", Self::keymap_notes().len()),
            Self::Firmware => write!(f, "firmware default"),
            Self::Silent => write!(f, "silent"),
            Self::Custom(notes) => write!(f, "custom ({} notes)", notes.len()),
        }
    }
}

/// MIDI support level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MidiMode {
    /// No MIDI
    #[default]
    None,
    /// Notes in music mode (`MIDI_BASIC`)
    Basic,
    /// Full MIDI keycodes (`MIDI_ADVANCED`)
    Advanced,
}

/// Options rendered into the keymap's `config.h`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirmwareOptions {
    /// `TAPPING_TERM` in milliseconds
    pub tapping_term_ms: u16,
    /// `PERMISSIVE_HOLD`
    pub permissive_hold: bool,
    /// `HOLD_ON_OTHER_KEY_PRESS_PER_KEY`
    pub hold_on_other_key_press_per_key: bool,
    /// `AUDIO_CLICKY`
    pub audio_clicky: bool,
    /// `MUSIC_MASK` expression
    pub music_mask: String,
    /// MIDI support
    pub midi: MidiMode,
    /// `MIDI_TONE_KEYCODE_OCTAVES`
    pub midi_tone_keycode_octaves: Option<u8>,
    /// `STARTUP_SONG`
    pub startup_song: StartupSong,
}

impl Default for FirmwareOptions {
    fn default() -> Self {
        Self {
            tapping_term_ms: 200,
            permissive_hold: true,
            hold_on_other_key_press_per_key: true,
            audio_clicky: true,
            music_mask: "keycode != KC_NO".to_string(),
            midi: MidiMode::None,
            midi_tone_keycode_octaves: None,
            startup_song: StartupSong::Keymap,
        }
    }
}

impl FirmwareOptions {
    /// Validates option values.
    pub fn validate(&self) -> Result<()> {
        if self.tapping_term_ms == 0 {
            bail!("Tapping term must be greater than 0 ms");
        }

        if let Some(octaves) = self.midi_tone_keycode_octaves {
            if !(1..=8).contains(&octaves) {
                bail!("MIDI tone keycode octaves must be between 1 and 8, got {octaves}");
            }
        }

        if self.music_mask.trim().is_empty() {
            bail!("Music mask expression cannot be empty");
        }

        if let StartupSong::Custom(song) = &self.startup_song {
            if song.is_empty() {
                bail!("Startup song has no notes; use \"silent\" for no sound");
            }
            let pitch = Regex::new(r"^_(REST|[A-G]S?[0-8])$")
                .context("Failed to compile pitch pattern")?;
            for (idx, note) in song.iter().enumerate() {
                if !pitch.is_match(&note.pitch) {
                    bail!(
                        "Startup song note {} has invalid pitch '{}' \
                         (expected e.g. _F4, _CS5, _REST)",
                        idx + 1,
                        note.pitch
                    );
                }
            }
        }

        Ok(())
    }

    /// Renders `config.h`.
    pub fn generate_config_h(&self) -> String {
        let mut out = String::from("#pragma once\n\n");

        let audio: Vec<String> = [
            self.startup_song
                .song_body()
                .map(|body| format!("#    define STARTUP_SONG SONG({body})")),
            self.audio_clicky.then(|| "#    define AUDIO_CLICKY".to_string()),
        ]
        .into_iter()
        .flatten()
        .collect();

        if !audio.is_empty() {
            out.push_str("#ifdef AUDIO_ENABLE\n");
            for line in &audio {
                out.push_str(line);
                out.push('\n');
            }
            out.push_str("#endif\n\n");
        }

        let _ = writeln!(out, "#define MUSIC_MASK ({})", self.music_mask.trim());
        let _ = writeln!(out, "#define TAPPING_TERM {}", self.tapping_term_ms);
        if self.permissive_hold {
            out.push_str("#define PERMISSIVE_HOLD\n");
        }
        if self.hold_on_other_key_press_per_key {
            out.push_str("#define HOLD_ON_OTHER_KEY_PRESS_PER_KEY\n");
        }

        match self.midi {
            MidiMode::None => {}
            MidiMode::Basic => out.push_str("\n#define MIDI_BASIC\n"),
            MidiMode::Advanced => out.push_str("\n#define MIDI_ADVANCED\n"),
        }
        if let Some(octaves) = self.midi_tone_keycode_octaves {
            let _ = writeln!(out, "#define MIDI_TONE_KEYCODE_OCTAVES {octaves}");
        }

        out
    }
}
