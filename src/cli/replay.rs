//! Replay command: run a TOML event script through the simulated runtime.

use crate::cli::common::{
    load_config, load_db, load_keymap, print_json, CliError, CliResult, TraceOutput,
};
use crate::cli::send::on_off;
use crate::firmware::host::{Host, LayerHost};
use crate::firmware::runtime::{Runtime, Script};
use crate::models::action::LayerState;
use crate::models::keycode::{LedState, ModBits};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Replay key, LED, dip switch and encoder events from a script
#[derive(Debug, Clone, Args)]
pub struct ReplayArgs {
    /// Script file (TOML)
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Keymap TOML file (defaults to the configured or built-in keymap)
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Runtime state once the script has finished.
#[derive(Debug, Serialize)]
struct FinalState {
    num_lock_shadow: bool,
    host_leds: LedState,
    mods: ModBits,
    layer_state: LayerState,
    default_layer_state: LayerState,
    auto_shift: bool,
    hue: u8,
    mode: u8,
    altcodes_sent: u64,
}

#[derive(Debug, Serialize)]
struct ReplayResponse {
    events: usize,
    #[serde(flatten)]
    output: TraceOutput,
    state: FinalState,
}

impl ReplayArgs {
    /// Execute the replay command
    pub fn execute(&self) -> CliResult<()> {
        let script = Script::from_file(&self.script)
            .map_err(|e| CliError::io(format!("{e:#}")))?;
        let config = load_config()?;
        let db = load_db()?;
        let keymap = load_keymap(self.file.as_deref(), &db)?;

        let mut runtime = Runtime::new(keymap, db);
        runtime
            .run(&script)
            .map_err(|e| CliError::validation(format!("{e:#}")))?;

        let keyboard = runtime.keyboard();
        let hooks = runtime.hooks();
        let response = ReplayResponse {
            events: script.events.len(),
            output: TraceOutput::new(keyboard.trace(), keyboard.flush_count(), keyboard.typed()),
            state: FinalState {
                num_lock_shadow: hooks.num_lock().is_on(),
                host_leds: keyboard.host_leds(),
                mods: keyboard.mods(),
                layer_state: keyboard.layer_state(),
                default_layer_state: keyboard.default_layer_state(),
                auto_shift: keyboard.auto_shift(),
                hue: keyboard.hue(),
                mode: keyboard.mode(),
                altcodes_sent: hooks.injector().sent_count(),
            },
        };

        if self.json || config.trace.default_json {
            return print_json(&response);
        }

        println!("Replayed {} events from {}", response.events, self.script.display());
        println!();
        response.output.print(config.trace.show_flushes);
        println!("Text:    {}", response.output.text);
        println!();
        let state = &response.state;
        println!("Final state:");
        println!("  num lock (host):   {}", on_off(state.host_leds.num_lock()));
        println!("  num lock (shadow): {}", on_off(state.num_lock_shadow));
        println!("  modifiers:         {}", state.mods);
        println!("  layers:            {:#010x}", state.layer_state.bits());
        println!("  default layer:     {:#010x}", state.default_layer_state.bits());
        println!("  auto shift:        {}", on_off(state.auto_shift));
        println!("  rgb hue/mode:      {}/{}", state.hue, state.mode);
        println!("  alt codes sent:    {}", state.altcodes_sent);
        Ok(())
    }
}
