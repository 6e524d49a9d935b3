//! In-memory stand-in for the firmware runtime and the host OS behind it.
//!
//! Records every report that would go over USB, reacts to lock keys the way
//! a host OS does (and queues the resulting LED reports), and runs the
//! alt-code decoder over the reports so tests can check what was typed.

use crate::altcode::{AltCodeDecoder, DecodedInput};
use crate::firmware::host::{Direction, Host, LayerHost, LightingHost};
use crate::firmware::report::{KeyboardReport, ReportEvent};
use crate::models::action::{LayerId, LayerState};
use crate::models::keycode::{Keycode, LedState, ModBits};
use std::collections::VecDeque;
use tracing::{trace, warn};

/// Hue step per encoder detent or `RGB_HUI`/`RGB_HUD` press.
pub const HUE_STEP: u8 = 8;

/// Simulated runtime plus host.
#[derive(Debug, Clone)]
pub struct SimulatedKeyboard {
    live: KeyboardReport,
    sent: KeyboardReport,
    consumer_held: Vec<Keycode>,
    host_leds: LedState,
    pending_leds: VecDeque<LedState>,
    layer_state: LayerState,
    default_layer_state: LayerState,
    auto_shift: bool,
    hue: u8,
    mode: u8,
    decoder: AltCodeDecoder,
    typed: Vec<DecodedInput>,
    trace: Vec<ReportEvent>,
    flushes: usize,
}

impl Default for SimulatedKeyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedKeyboard {
    /// Idle keyboard on the QWERTY default layer with all host locks off.
    pub fn new() -> Self {
        Self {
            live: KeyboardReport::new(),
            sent: KeyboardReport::new(),
            consumer_held: Vec::new(),
            host_leds: LedState::default(),
            pending_leds: VecDeque::new(),
            layer_state: LayerState::EMPTY,
            default_layer_state: LayerState::only(LayerId::Qwerty),
            auto_shift: false,
            hue: 0,
            mode: 0,
            decoder: AltCodeDecoder::new(false),
            typed: Vec::new(),
            trace: Vec::new(),
            flushes: 0,
        }
    }

    /// Changes the host lock state from the OS side (e.g. another keyboard
    /// toggled num lock) and queues the LED report the host would send.
    pub fn set_host_leds(&mut self, leds: LedState) {
        if leds == self.host_leds {
            return;
        }
        self.host_leds = leds;
        self.decoder.set_num_lock(leds.num_lock());
        self.pending_leds.push_back(leds);
        self.trace.push(ReportEvent::Led { leds });
    }

    /// Lock indicators as the host sees them.
    pub const fn host_leds(&self) -> LedState {
        self.host_leds
    }

    /// Drains LED reports the runtime has not delivered to user code yet.
    pub fn take_led_reports(&mut self) -> Vec<LedState> {
        self.pending_leds.drain(..).collect()
    }

    /// Everything sent so far.
    pub fn trace(&self) -> &[ReportEvent] {
        &self.trace
    }

    /// Forgets the recorded trace and typed characters.
    pub fn clear_trace(&mut self) {
        self.trace.clear();
        self.typed.clear();
        self.flushes = 0;
    }

    /// Characters the host typed through alt codes.
    pub fn typed(&self) -> &[DecodedInput] {
        &self.typed
    }

    /// Alt-code digits the host has collected but not typed yet.
    pub fn pending_altcode_digits(&self) -> Option<&str> {
        self.decoder.pending_digits()
    }

    /// Number of keyboard reports sent.
    pub const fn flush_count(&self) -> usize {
        self.flushes
    }

    /// Last report the host received.
    pub const fn last_sent(&self) -> &KeyboardReport {
        &self.sent
    }

    /// Auto-shift state.
    pub const fn auto_shift(&self) -> bool {
        self.auto_shift
    }

    /// Turns auto-shift on or off.
    pub fn set_auto_shift(&mut self, enabled: bool) {
        if self.auto_shift != enabled {
            self.auto_shift = enabled;
            self.trace.push(ReportEvent::AutoShift { enabled });
        }
    }

    /// Current RGB hue.
    pub const fn hue(&self) -> u8 {
        self.hue
    }

    /// Current RGB effect mode index.
    pub const fn mode(&self) -> u8 {
        self.mode
    }

    fn press_slot(&mut self, key: Keycode) {
        if let Some(bit) = key.mod_bit() {
            self.live.mods |= bit;
        } else if key.is_consumer() {
            if !self.consumer_held.contains(&key) {
                self.consumer_held.push(key);
                self.trace.push(ReportEvent::Consumer { key, pressed: true });
            }
        } else if !self.live.add_key(key) && !self.live.contains(key) {
            warn!(key = %key, "keyboard report full, key dropped");
        }
    }

    fn release_slot(&mut self, key: Keycode) {
        if let Some(bit) = key.mod_bit() {
            self.live.mods = self.live.mods & !bit;
        } else if key.is_consumer() {
            if let Some(pos) = self.consumer_held.iter().position(|held| *held == key) {
                self.consumer_held.remove(pos);
                self.trace.push(ReportEvent::Consumer {
                    key,
                    pressed: false,
                });
            }
        } else {
            self.live.del_key(key);
        }
    }

    /// Host OS reaction to lock keys changing between two reports.
    fn apply_lock_keys(&mut self, before: &KeyboardReport, after: &KeyboardReport) {
        let mut num = self.host_leds.num_lock();
        let mut caps = self.host_leds.caps_lock();
        let scroll = self.host_leds.scroll_lock();

        for key in after.keys().filter(|key| !before.contains(*key)) {
            match key {
                Keycode::NumLock => num = !num,
                Keycode::LockingNumLock => num = true,
                Keycode::CapsLock => caps = !caps,
                _ => {}
            }
        }
        for key in before.keys().filter(|key| !after.contains(*key)) {
            if key == Keycode::LockingNumLock {
                num = false;
            }
        }

        let leds = LedState::from_bits(
            LedState::from_locks(num, caps, scroll).bits()
                | (self.host_leds.bits() & !(LedState::NUM_LOCK | LedState::CAPS_LOCK)),
        );
        self.set_host_leds(leds);
    }
}

impl Host for SimulatedKeyboard {
    fn mods(&self) -> ModBits {
        self.live.mods
    }

    fn register_code(&mut self, key: Keycode) {
        self.press_slot(key);
    }

    fn unregister_code(&mut self, key: Keycode) {
        self.release_slot(key);
    }

    fn add_key(&mut self, key: Keycode) {
        self.press_slot(key);
    }

    fn del_key(&mut self, key: Keycode) {
        self.release_slot(key);
    }

    fn send_keyboard_report(&mut self) {
        let report = self.live;
        trace!(report = %report, "send report");
        self.trace.push(ReportEvent::Report { report });
        self.flushes += 1;

        let before = self.sent;
        self.apply_lock_keys(&before, &report);
        if let Some(typed) = self.decoder.observe(&report) {
            self.typed.push(typed);
        }
        self.sent = report;
    }
}

impl LayerHost for SimulatedKeyboard {
    fn layer_state(&self) -> LayerState {
        self.layer_state
    }

    fn default_layer_state(&self) -> LayerState {
        self.default_layer_state
    }

    fn default_layer_set(&mut self, state: LayerState) {
        self.default_layer_state = state;
        self.trace.push(ReportEvent::DefaultLayer { state });
    }

    fn layer_on(&mut self, layer: LayerId) {
        self.layer_state = self.layer_state.with(layer);
        self.trace.push(ReportEvent::Layer {
            state: self.layer_state,
        });
    }

    fn layer_off(&mut self, layer: LayerId) {
        self.layer_state = self.layer_state.without(layer);
        self.trace.push(ReportEvent::Layer {
            state: self.layer_state,
        });
    }
}

impl LightingHost for SimulatedKeyboard {
    fn rgb_matrix_step_hue(&mut self, direction: Direction) {
        self.hue = match direction {
            Direction::Increase => self.hue.wrapping_add(HUE_STEP),
            Direction::Decrease => self.hue.wrapping_sub(HUE_STEP),
        };
        self.trace.push(ReportEvent::RgbHue { direction });
    }

    fn rgb_matrix_step_mode(&mut self, direction: Direction) {
        self.mode = match direction {
            Direction::Increase => self.mode.wrapping_add(1),
            Direction::Decrease => self.mode.wrapping_sub(1),
        };
        self.trace.push(ReportEvent::RgbMode { direction });
    }
}
