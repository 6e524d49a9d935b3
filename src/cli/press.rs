//! Press command: dispatch one key press through the user record handler.

use crate::cli::common::{load_config, load_db, print_json, CliResult, TraceOutput};
use crate::cli::send::{on_off, prepare};
use crate::firmware::host::{Host, RecordOutcome};
use crate::models::keycode::{Keycode, ModBits};
use clap::{Args, ValueEnum};
use serde::Serialize;

/// Shift keys held while the key is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShiftArg {
    /// Left shift
    Left,
    /// Right shift
    Right,
    /// Both shift keys
    Both,
}

impl ShiftArg {
    fn keys(self) -> &'static [Keycode] {
        match self {
            Self::Left => &[Keycode::LShift],
            Self::Right => &[Keycode::RShift],
            Self::Both => &[Keycode::LShift, Keycode::RShift],
        }
    }
}

/// Press one key (e.g. KX_A) and show what the record handler did
#[derive(Debug, Clone, Args)]
pub struct PressArgs {
    /// Keycode name, e.g. KX_A or KC_A
    #[arg(value_name = "KEYCODE")]
    pub keycode: String,

    /// Hold shift while pressing
    #[arg(long, value_enum, value_name = "SIDE")]
    pub shift: Option<ShiftArg>,

    /// Start with host num lock on
    #[arg(long)]
    pub num_lock: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct PressResponse {
    keycode: String,
    outcome: RecordOutcome,
    shift_before: ModBits,
    shift_after: ModBits,
    num_lock_after: bool,
    #[serde(flatten)]
    output: TraceOutput,
}

impl PressArgs {
    /// Execute the press command
    pub fn execute(&self) -> CliResult<()> {
        let db = load_db()?;
        let config = load_config()?;
        let json = self.json || config.trace.default_json;

        let (mut keyboard, mut hooks) = prepare(false, self.num_lock);
        for key in self.shift.map(ShiftArg::keys).unwrap_or_default() {
            keyboard.register_code(*key);
        }
        if self.shift.is_some() {
            keyboard.send_keyboard_report();
        }
        keyboard.clear_trace();

        let shift_before = keyboard.mods() & ModBits::SHIFT_MASK;
        let outcome = db.parse(&self.keycode).map_or(RecordOutcome::Continue, |action| {
            hooks.process_record_user(&mut keyboard, &action, true)
        });
        for leds in keyboard.take_led_reports() {
            hooks.led_set_user(leds);
        }

        let response = PressResponse {
            keycode: self.keycode.clone(),
            outcome,
            shift_before,
            shift_after: keyboard.mods() & ModBits::SHIFT_MASK,
            num_lock_after: keyboard.host_leds().num_lock(),
            output: TraceOutput::new(keyboard.trace(), keyboard.flush_count(), keyboard.typed()),
        };

        if json {
            return print_json(&response);
        }

        if outcome.continue_processing() {
            println!("continue");
            return Ok(());
        }

        println!("{} handled", self.keycode);
        println!(
            "Shift:   {} -> {}",
            response.shift_before, response.shift_after
        );
        println!("NumLock: {}", on_off(response.num_lock_after));
        println!();
        response.output.print(config.trace.show_flushes);
        Ok(())
    }
}
