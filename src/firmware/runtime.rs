//! Event loop standing in for the firmware runtime.
//!
//! Resolves key positions through the keymap, gives user hooks the first
//! look at every record, runs default processing for whatever they pass on,
//! and delivers LED reports to `led_set_user` after each event.

use crate::firmware::hooks::UserHooks;
use crate::firmware::host::{Direction, Host, LayerHost, LightingHost, RecordOutcome};
use crate::firmware::simulator::SimulatedKeyboard;
use crate::keycode_db::KeycodeDb;
use crate::models::action::{AutoShiftAction, KeyAction, LayerId, LayerState, RgbAction};
use crate::models::keycode::LedState;
use crate::models::keymap::Keymap;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// How a key event moves the key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyMotion {
    /// Key down
    Press,
    /// Key up
    Release,
    /// Down then up, released within the tapping term
    #[default]
    Tap,
}

/// One input to the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// A key given by keycode, bypassing the keymap
    Key {
        /// Keycode expression (`KX_A`, `KC_LSFT`, `LT(_NUM, KC_TAB)`)
        keycode: String,
        /// Press, release or tap
        #[serde(default)]
        action: KeyMotion,
    },
    /// A key given by board position, resolved through the keymap
    Position {
        /// Row (0-4)
        row: usize,
        /// Column within the row
        col: usize,
        /// Press, release or tap
        #[serde(default)]
        action: KeyMotion,
    },
    /// The host changed its lock state
    Led {
        /// Num lock
        #[serde(default)]
        num_lock: bool,
        /// Caps lock
        #[serde(default)]
        caps_lock: bool,
        /// Scroll lock
        #[serde(default)]
        scroll_lock: bool,
    },
    /// A dip switch changed
    Dip {
        /// Switch index
        index: u8,
        /// New position
        active: bool,
    },
    /// An encoder moved one detent
    Encoder {
        /// Encoder index
        index: u8,
        /// Direction
        clockwise: bool,
    },
}

/// State before the first event of a script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialState {
    /// Host num lock
    pub num_lock: bool,
    /// Host caps lock
    pub caps_lock: bool,
    /// Default layer (`_QWERTY` or `_QWERTY2`); QWERTY when unset
    pub default_layer: Option<String>,
}

/// A replayable sequence of input events.
///
/// ```toml
/// [initial]
/// num_lock = true
///
/// [[event]]
/// type = "key"
/// keycode = "KX_A"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Starting state
    #[serde(default)]
    pub initial: InitialState,
    /// Events in order
    #[serde(default, rename = "event")]
    pub events: Vec<InputEvent>,
}

impl Script {
    /// Parses a script from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse replay script")
    }

    /// Loads a script file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read script: {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid script: {}", path.display()))
    }
}

/// Simulated firmware: keymap, user hooks and the keyboard/host pair.
#[derive(Debug)]
pub struct Runtime {
    keyboard: SimulatedKeyboard,
    hooks: UserHooks,
    keymap: Keymap,
    db: KeycodeDb,
    held: HashMap<(usize, usize), KeyAction>,
}

impl Runtime {
    /// Creates an idle runtime.
    pub fn new(keymap: Keymap, db: KeycodeDb) -> Self {
        Self {
            keyboard: SimulatedKeyboard::new(),
            hooks: UserHooks::new(),
            keymap,
            db,
            held: HashMap::new(),
        }
    }

    /// The simulated keyboard and host.
    pub const fn keyboard(&self) -> &SimulatedKeyboard {
        &self.keyboard
    }

    /// User hook state.
    pub const fn hooks(&self) -> &UserHooks {
        &self.hooks
    }

    /// The keymap in use.
    pub const fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    /// Applies a script's initial state and forgets the trace it produced.
    pub fn apply_initial(&mut self, initial: &InitialState) -> Result<()> {
        if let Some(name) = &initial.default_layer {
            let layer: LayerId = name.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            self.keyboard.default_layer_set(LayerState::only(layer));
        }
        self.keyboard
            .set_host_leds(LedState::from_locks(initial.num_lock, initial.caps_lock, false));
        self.deliver_leds();
        self.keyboard.clear_trace();
        Ok(())
    }

    /// Runs a whole script.
    pub fn run(&mut self, script: &Script) -> Result<()> {
        self.apply_initial(&script.initial)?;
        for (idx, event) in script.events.iter().enumerate() {
            self.handle(event)
                .with_context(|| format!("Event {} failed", idx + 1))?;
        }
        info!(
            events = script.events.len(),
            reports = self.keyboard.flush_count(),
            typed = self.keyboard.typed().len(),
            "script finished"
        );
        Ok(())
    }

    /// Handles one input event.
    pub fn handle(&mut self, event: &InputEvent) -> Result<()> {
        debug!(?event, "input event");
        match event {
            InputEvent::Key { keycode, action } => {
                let key = self
                    .db
                    .parse(keycode)
                    .with_context(|| format!("Unknown keycode: {keycode}"))?;
                self.key_motion(key, *action);
            }
            InputEvent::Position { row, col, action } => {
                self.position_motion(*row, *col, *action)?;
            }
            InputEvent::Led {
                num_lock,
                caps_lock,
                scroll_lock,
            } => {
                self.keyboard
                    .set_host_leds(LedState::from_locks(*num_lock, *caps_lock, *scroll_lock));
            }
            InputEvent::Dip { index, active } => {
                if self
                    .hooks
                    .dip_switch_update_user(&mut self.keyboard, *index, *active)
                {
                    debug!(index, "keyboard-level dip switch handler would run");
                }
            }
            InputEvent::Encoder { index, clockwise } => {
                if self
                    .hooks
                    .encoder_update_user(&mut self.keyboard, *index, *clockwise)
                {
                    debug!(index, "keyboard-level encoder handler would run");
                }
            }
        }
        self.deliver_leds();
        Ok(())
    }

    fn deliver_leds(&mut self) {
        for leds in self.keyboard.take_led_reports() {
            self.hooks.led_set_user(leds);
        }
    }

    fn key_motion(&mut self, action: KeyAction, motion: KeyMotion) {
        match motion {
            KeyMotion::Press => self.record(action, true, false),
            KeyMotion::Release => self.record(action, false, false),
            KeyMotion::Tap => {
                self.record(action, true, true);
                self.record(action, false, true);
            }
        }
    }

    fn resolve_position(&self, row: usize, col: usize) -> Result<KeyAction> {
        let (layer, action) = self
            .keymap
            .resolve(
                self.keyboard.layer_state(),
                self.keyboard.default_layer_state(),
                row,
                col,
            )
            .with_context(|| format!("Position ({row}, {col}) is not on the board"))?;
        debug!(row, col, layer = %layer, action = %action, "resolved");
        Ok(action)
    }

    fn position_motion(&mut self, row: usize, col: usize, motion: KeyMotion) -> Result<()> {
        match motion {
            KeyMotion::Press => {
                let action = self.resolve_position(row, col)?;
                self.held.insert((row, col), action);
                self.record(action, true, false);
            }
            KeyMotion::Release => {
                // A key releases what it pressed, even if the layer changed since.
                let action = match self.held.remove(&(row, col)) {
                    Some(action) => action,
                    None => self.resolve_position(row, col)?,
                };
                self.record(action, false, false);
            }
            KeyMotion::Tap => {
                let action = self.resolve_position(row, col)?;
                self.record(action, true, true);
                self.record(action, false, true);
            }
        }
        Ok(())
    }

    /// One key record: user hooks first, default processing if they pass.
    fn record(&mut self, action: KeyAction, pressed: bool, tapped: bool) {
        let outcome = self
            .hooks
            .process_record_user(&mut self.keyboard, &action, pressed);
        if outcome == RecordOutcome::Continue {
            self.process_default(action, pressed, tapped);
        }
    }

    fn process_default(&mut self, action: KeyAction, pressed: bool, tapped: bool) {
        let kb = &mut self.keyboard;
        match action {
            KeyAction::No | KeyAction::Transparent | KeyAction::Custom(_) => {}
            KeyAction::Key(key) => {
                if pressed {
                    kb.register_code(key);
                } else {
                    kb.unregister_code(key);
                }
                kb.send_keyboard_report();
            }
            KeyAction::Modified { mods, key } => {
                if pressed {
                    for modifier in mods.keys() {
                        kb.register_code(modifier);
                    }
                    kb.register_code(key);
                } else {
                    kb.unregister_code(key);
                    for modifier in mods.keys() {
                        kb.unregister_code(modifier);
                    }
                }
                kb.send_keyboard_report();
            }
            KeyAction::LayerTap { layer, key } => {
                if tapped {
                    if pressed {
                        kb.register_code(key);
                    } else {
                        kb.unregister_code(key);
                    }
                    kb.send_keyboard_report();
                } else if pressed {
                    kb.layer_on(layer);
                } else {
                    kb.layer_off(layer);
                }
            }
            KeyAction::Momentary(layer) => {
                if pressed {
                    kb.layer_on(layer);
                } else {
                    kb.layer_off(layer);
                }
            }
            KeyAction::Rgb(rgb) if pressed => match rgb {
                RgbAction::ModeForward => kb.rgb_matrix_step_mode(Direction::Increase),
                RgbAction::ModeReverse => kb.rgb_matrix_step_mode(Direction::Decrease),
                RgbAction::HueUp => kb.rgb_matrix_step_hue(Direction::Increase),
                RgbAction::HueDown => kb.rgb_matrix_step_hue(Direction::Decrease),
            },
            KeyAction::AutoShift(toggle) if pressed => {
                kb.set_auto_shift(toggle == AutoShiftAction::On);
            }
            KeyAction::Rgb(_) | KeyAction::AutoShift(_) => {}
        }
    }
}
