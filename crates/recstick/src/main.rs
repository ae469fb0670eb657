//! recstick CLI — recording-status LED indicator for BlinkStick peripherals.

use std::path::PathBuf;

use clap::Parser;

mod cli;

#[derive(Parser)]
#[command(
    name = "recstick",
    version,
    about = "Recording-status LED indicator for BlinkStick peripherals"
)]
struct Args {
    /// Output as JSON (for set, off, devices, config)
    #[arg(long, global = true)]
    json: bool,

    /// Alternate config file (default: <config dir>/recstick/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: cli::Command,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let args = Args::parse();

    if let Err(e) = cli::run(args.command, args.json, args.config.as_deref()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
