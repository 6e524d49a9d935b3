//! Send command: type one alt code on a fresh simulated keyboard.

use crate::altcode::{AltCode, SavedInputState};
use crate::cli::common::{load_config, print_json, CliError, CliResult, TraceOutput};
use crate::firmware::hooks::UserHooks;
use crate::firmware::host::Host;
use crate::firmware::simulator::SimulatedKeyboard;
use crate::models::keycode::{Keycode, LedState, ModBits};
use clap::Args;
use serde::Serialize;
use std::str::FromStr;

/// Run the alt-code injector for one code and show what the host saw
#[derive(Debug, Clone, Args)]
pub struct SendArgs {
    /// Alt code in 0..=9999 (leading zeros allowed)
    #[arg(value_name = "CODE")]
    pub code: String,

    /// Start with left alt already held
    #[arg(long)]
    pub alt_held: bool,

    /// Start with host num lock on
    #[arg(long)]
    pub num_lock: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Lock and modifier state after the sequence.
#[derive(Debug, Clone, Copy, Serialize)]
struct RestoredState {
    alt_held: bool,
    num_lock_on: bool,
}

#[derive(Debug, Serialize)]
struct SendResponse {
    code: AltCode,
    digits: [u8; 4],
    saved: SavedInputState,
    restored: RestoredState,
    #[serde(flatten)]
    output: TraceOutput,
    /// Digits the host holds until the user lets go of alt
    pending: Option<String>,
}

/// Prepares a keyboard whose alt and num lock state match the flags.
pub(crate) fn prepare(alt_held: bool, num_lock: bool) -> (SimulatedKeyboard, UserHooks) {
    let mut keyboard = SimulatedKeyboard::new();
    let mut hooks = UserHooks::new();

    if num_lock {
        keyboard.set_host_leds(LedState::from_locks(true, false, false));
    }
    if alt_held {
        keyboard.register_code(Keycode::LAlt);
        keyboard.send_keyboard_report();
    }
    for leds in keyboard.take_led_reports() {
        hooks.led_set_user(leds);
    }
    keyboard.clear_trace();
    (keyboard, hooks)
}

impl SendArgs {
    /// Execute the send command
    pub fn execute(&self) -> CliResult<()> {
        let code = AltCode::from_str(&self.code)
            .map_err(|e| CliError::validation(format!("Invalid alt code '{}': {e}", self.code)))?;
        let config = load_config()?;

        let (mut keyboard, mut hooks) = prepare(self.alt_held, self.num_lock);
        let saved = hooks.send_altcode(&mut keyboard, code);
        for leds in keyboard.take_led_reports() {
            hooks.led_set_user(leds);
        }

        let restored = RestoredState {
            alt_held: keyboard.mods().contains(ModBits::LALT),
            num_lock_on: keyboard.host_leds().num_lock(),
        };
        let response = SendResponse {
            code,
            digits: code.digits(),
            saved,
            restored,
            output: TraceOutput::new(keyboard.trace(), keyboard.flush_count(), keyboard.typed()),
            pending: keyboard.pending_altcode_digits().map(str::to_string),
        };

        if self.json || config.trace.default_json {
            return print_json(&response);
        }

        println!("Alt code {code} (value {})", code.value());
        println!(
            "Before:  alt={} num_lock={}",
            on_off(saved.alt_held),
            on_off(saved.num_lock_on)
        );
        println!(
            "After:   alt={} num_lock={}",
            on_off(restored.alt_held),
            on_off(restored.num_lock_on)
        );
        println!();
        response.output.print(config.trace.show_flushes);
        if let Some(pending) = &response.pending {
            println!("Pending: {pending} (typed when alt is released)");
        }
        Ok(())
    }
}

pub(crate) const fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}
