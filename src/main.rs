//! altkeys - alt-code accent keys for a Keychron Q2 QMK keymap
//!
//! Runs the keymap's user hooks against a simulated keyboard and host so the
//! alt-code sequences, the num lock shadow and the layer handling can be
//! inspected and scripted, and generates the keymap's build files.

use altkeys::cli::{
    ConfigArgs, GenerateArgs, KeycodeArgs, KeymapArgs, PressArgs, ReplayArgs, SendArgs,
    ValidateArgs,
};
use altkeys::constants::APP_NAME;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Alt-code accent keys, keymap tables and build flags
#[derive(Parser, Debug)]
#[command(name = APP_NAME, author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Type one alt code on a simulated keyboard
    Send(SendArgs),
    /// Press one key through the user record handler
    Press(PressArgs),
    /// Show the keymap layer by layer
    Keymap(KeymapArgs),
    /// Replay an event script through the simulated runtime
    Replay(ReplayArgs),
    /// Write config.h and the keymap TOML
    Generate(GenerateArgs),
    /// Validate a keymap
    Validate(ValidateArgs),
    /// Search keycodes or explain a keycode expression
    Keycode(KeycodeArgs),
    /// Show or change the configuration
    Config(ConfigArgs),
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so --json output stays clean
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match &cli.command {
        Command::Send(args) => args.execute(),
        Command::Press(args) => args.execute(),
        Command::Keymap(args) => args.execute(),
        Command::Replay(args) => args.execute(),
        Command::Generate(args) => args.execute(),
        Command::Validate(args) => args.execute(),
        Command::Keycode(args) => args.execute(),
        Command::Config(args) => args.execute(),
    };

    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(err.exit_code().code());
    }
}
