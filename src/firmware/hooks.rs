//! User hooks the firmware runtime calls: key records, LED changes, the
//! dip switch and the rotary encoder.

use crate::altcode::{AccentKey, AltCode, AltCodeInjector, SavedInputState};
use crate::firmware::host::{Direction, Host, LayerHost, LightingHost, RecordOutcome};
use crate::firmware::led::NumLockShadow;
use crate::models::action::{KeyAction, LayerId, LayerState};
use crate::models::keycode::{Keycode, LedState, ModBits};
use tracing::{debug, trace};

/// State owned by the user layer of the firmware.
#[derive(Debug, Default)]
pub struct UserHooks {
    num_lock: NumLockShadow,
    injector: AltCodeInjector,
}

impl UserHooks {
    /// Creates hooks with num lock assumed off until the host reports it.
    pub const fn new() -> Self {
        Self {
            num_lock: NumLockShadow::new(),
            injector: AltCodeInjector::new(),
        }
    }

    /// Host LED report callback. Only the num lock bit is kept.
    pub fn led_set_user(&mut self, leds: LedState) {
        trace!(leds = leds.bits(), "led report");
        self.num_lock.update(leds);
    }

    /// Current num lock shadow.
    pub const fn num_lock(&self) -> &NumLockShadow {
        &self.num_lock
    }

    /// The alt-code injector, for inspecting what it has sent.
    pub const fn injector(&self) -> &AltCodeInjector {
        &self.injector
    }

    /// Types an alt code directly.
    pub fn send_altcode<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        code: AltCode,
    ) -> SavedInputState {
        self.injector.send(host, &self.num_lock, code)
    }

    /// Key record handler.
    ///
    /// Accent keys are handled on press and swallowed on release; every other
    /// action continues to default processing untouched.
    pub fn process_record_user<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        action: &KeyAction,
        pressed: bool,
    ) -> RecordOutcome {
        let Some(accent) = action.accent() else {
            return RecordOutcome::Continue;
        };
        if pressed {
            self.type_accent(host, accent);
        }
        RecordOutcome::Handled
    }

    fn type_accent<H: Host + ?Sized>(&mut self, host: &mut H, accent: AccentKey) {
        let shift = host.mods() & ModBits::SHIFT_MASK;
        let upper = !shift.is_empty();
        let code = accent.code(upper);
        debug!(key = %accent, upper, code = code.value(), shift = %shift, "accent key");

        if !upper {
            self.send_altcode(host, code);
            return;
        }

        // A held shift would turn the keypad digits into navigation keys.
        host.unregister_code(Keycode::LShift);
        host.unregister_code(Keycode::RShift);
        host.send_keyboard_report();

        self.send_altcode(host, code);

        if shift.contains(ModBits::LSFT) {
            host.register_code(Keycode::LShift);
        }
        if shift.contains(ModBits::RSFT) {
            host.register_code(Keycode::RShift);
        }
        host.send_keyboard_report();
    }

    /// Dip switch handler: switch 0 picks QWERTY or QWERTY2 as the default
    /// layer. Returns false so the keyboard-level handler does not run.
    pub fn dip_switch_update_user<H: LayerHost + ?Sized>(
        &mut self,
        host: &mut H,
        index: u8,
        active: bool,
    ) -> bool {
        if index == 0 {
            let layer = if active {
                LayerId::Qwerty2
            } else {
                LayerId::Qwerty
            };
            debug!(layer = %layer, "dip switch selects default layer");
            host.default_layer_set(LayerState::only(layer));
        }
        false
    }

    /// Encoder handler: hue on the Num/Config layers, volume otherwise.
    /// Returns false so the keyboard-level handler does not run.
    pub fn encoder_update_user<H: Host + LayerHost + LightingHost + ?Sized>(
        &mut self,
        host: &mut H,
        index: u8,
        clockwise: bool,
    ) -> bool {
        if index != 0 {
            return false;
        }
        if host.highest_layer() > LayerId::Qwerty2.index() {
            let direction = if clockwise {
                Direction::Increase
            } else {
                Direction::Decrease
            };
            host.rgb_matrix_step_hue(direction);
        } else if clockwise {
            host.tap_code(Keycode::AudioVolUp);
        } else {
            host.tap_code(Keycode::AudioVolDown);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firmware::simulator::SimulatedKeyboard;
    use crate::firmware::report::ReportEvent;
    use crate::models::action::RgbAction;

    fn press_with_shift(shift: ModBits, accent: AccentKey) -> (SimulatedKeyboard, UserHooks) {
        let mut keyboard = SimulatedKeyboard::new();
        let mut hooks = UserHooks::new();
        for key in shift.keys() {
            keyboard.register_code(key);
        }
        keyboard.send_keyboard_report();
        keyboard.clear_trace();

        let outcome = hooks.process_record_user(&mut keyboard, &KeyAction::Custom(accent), true);
        assert_eq!(outcome, RecordOutcome::Handled);
        (keyboard, hooks)
    }

    #[test]
    fn test_lower_case_without_shift() {
        for accent in AccentKey::ALL {
            let (keyboard, hooks) = press_with_shift(ModBits::NONE, accent);
            assert_eq!(hooks.injector().sent_count(), 1);
            assert_eq!(
                keyboard.typed(),
                &[crate::altcode::DecodedInput::Char(accent.character(false))]
            );
        }
    }

    #[test]
    fn test_upper_case_restores_exact_shift_mask() {
        for shift in [ModBits::LSFT, ModBits::RSFT, ModBits::SHIFT_MASK] {
            for accent in AccentKey::ALL {
                let (keyboard, _) = press_with_shift(shift, accent);
                assert_eq!(keyboard.mods() & ModBits::SHIFT_MASK, shift);
                assert_eq!(
                    keyboard.typed(),
                    &[crate::altcode::DecodedInput::Char(accent.character(true))]
                );
            }
        }
    }

    #[test]
    fn test_shift_released_during_digits() {
        let (keyboard, _) = press_with_shift(ModBits::LSFT, AccentKey::E);
        let digit_reports_with_shift = keyboard
            .trace()
            .iter()
            .filter(|event| match event {
                ReportEvent::Report { report } => {
                    report.keys().any(|key| key.keypad_value().is_some())
                        && report.mods.intersects(ModBits::SHIFT_MASK)
                }
                _ => false,
            })
            .count();
        assert_eq!(digit_reports_with_shift, 0);
    }

    #[test]
    fn test_release_and_other_keys() {
        let mut keyboard = SimulatedKeyboard::new();
        let mut hooks = UserHooks::new();

        let outcome =
            hooks.process_record_user(&mut keyboard, &KeyAction::Custom(AccentKey::A), false);
        assert_eq!(outcome, RecordOutcome::Handled);

        for action in [
            KeyAction::Key(Keycode::A),
            KeyAction::Transparent,
            KeyAction::Momentary(LayerId::Config),
            KeyAction::Rgb(RgbAction::HueUp),
        ] {
            let outcome = hooks.process_record_user(&mut keyboard, &action, true);
            assert!(outcome.continue_processing());
        }

        assert_eq!(hooks.injector().sent_count(), 0);
        assert!(keyboard.trace().is_empty());
    }

    #[test]
    fn test_led_set_user_updates_shadow() {
        let mut hooks = UserHooks::new();
        hooks.led_set_user(LedState::from_locks(true, false, false));
        assert!(hooks.num_lock().is_on());
        hooks.led_set_user(LedState::from_locks(false, true, false));
        assert!(!hooks.num_lock().is_on());
    }

    #[test]
    fn test_dip_switch_selects_default_layer() {
        let mut keyboard = SimulatedKeyboard::new();
        let mut hooks = UserHooks::new();

        assert!(!hooks.dip_switch_update_user(&mut keyboard, 0, true));
        assert_eq!(keyboard.default_layer_state(), LayerState::only(LayerId::Qwerty2));

        assert!(!hooks.dip_switch_update_user(&mut keyboard, 0, false));
        assert_eq!(keyboard.default_layer_state(), LayerState::only(LayerId::Qwerty));

        hooks.dip_switch_update_user(&mut keyboard, 1, true);
        assert_eq!(keyboard.default_layer_state(), LayerState::only(LayerId::Qwerty));
    }

    #[test]
    fn test_encoder_volume_on_base_layers() {
        let mut keyboard = SimulatedKeyboard::new();
        let mut hooks = UserHooks::new();

        assert!(!hooks.encoder_update_user(&mut keyboard, 0, true));
        assert!(keyboard.trace().contains(&ReportEvent::Consumer {
            key: Keycode::AudioVolUp,
            pressed: true
        }));

        keyboard.clear_trace();
        hooks.encoder_update_user(&mut keyboard, 0, false);
        assert!(keyboard.trace().contains(&ReportEvent::Consumer {
            key: Keycode::AudioVolDown,
            pressed: true
        }));
    }

    #[test]
    fn test_encoder_hue_on_upper_layers() {
        let mut keyboard = SimulatedKeyboard::new();
        let mut hooks = UserHooks::new();
        keyboard.layer_on(LayerId::Num);
        keyboard.clear_trace();

        hooks.encoder_update_user(&mut keyboard, 0, true);
        hooks.encoder_update_user(&mut keyboard, 0, false);
        assert_eq!(
            keyboard.trace(),
            &[
                ReportEvent::RgbHue {
                    direction: Direction::Increase
                },
                ReportEvent::RgbHue {
                    direction: Direction::Decrease
                },
            ]
        );

        keyboard.clear_trace();
        hooks.encoder_update_user(&mut keyboard, 1, true);
        assert!(keyboard.trace().is_empty());
    }
}
