//! CLI subcommands — one-shot LED control, discovery, and the watch loop.

mod config_cmd;
mod devices;
mod set;
mod watch;

use std::path::Path;

use clap::Subcommand;
use serde::Serialize;

pub(super) use recstick_lib::config::Config;
pub(super) use recstick_lib::device::DiscoveredStick;
pub(super) use recstick_lib::error::Result;

const PADDING: usize = 2;

/// Compute alignment width for a command's key-value output: at least
/// PADDING spaces after the longest key.
pub(super) fn kv_width(keys: &[&str]) -> usize {
    keys.iter().map(|k| k.len()).max().unwrap_or(0) + PADDING
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{key:<width$}{value}", width = w);
}

pub(super) fn kv_indent(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("  {key:<width$}{value}", width = w.saturating_sub(2));
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct SetOutput {
    pub status: String,
    pub color: String,
    pub applied: bool,
}

#[derive(Serialize)]
pub(super) struct DevicesOutput {
    pub count: usize,
    pub devices: Vec<DiscoveredStick>,
}

#[derive(Serialize)]
pub(super) struct ConfigOutput {
    pub config_file: Option<String>,
    pub config_file_exists: bool,
    pub settings: Config,
}

#[derive(Subcommand)]
pub enum Command {
    /// Light the stick for a recorder status
    Set {
        /// One of: init, preview, recording, paused, error, upcoming
        status: String,
    },

    /// Darken all LEDs
    Off,

    /// Run the indicator, reading status events from stdin
    Watch {
        /// Self-heal repaint interval in milliseconds
        #[arg(long, default_value_t = 10_000)]
        tick_ms: u64,
    },

    /// Show current configuration and file path
    Config,

    /// List attached BlinkStick devices
    Devices,
}

/// Warn if `--json` was passed to a command that doesn't support it.
fn warn_json_unsupported(cmd_name: &str) {
    log::warn!("--json is not supported for `{cmd_name}` (ignored)");
}

pub fn run(cmd: Command, json: bool, config_path: Option<&Path>) -> Result<()> {
    match cmd {
        Command::Set { status } => set::cmd_set(&status, json, config_path),
        Command::Off => set::cmd_off(json, config_path),
        Command::Watch { tick_ms } => {
            if json {
                warn_json_unsupported("watch");
            }
            watch::cmd_watch(tick_ms, config_path)
        }
        Command::Config => config_cmd::cmd_config(json, config_path),
        Command::Devices => devices::cmd_devices(json),
    }
}
