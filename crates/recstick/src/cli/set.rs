//! `set` and `off` subcommands — one-shot color applies.

use std::path::Path;

use recstick_lib::RecstickError;
use recstick_lib::color::Color;
use recstick_lib::connection::{DeviceConnection, UsbSource};
use recstick_lib::device::DeviceError;
use recstick_lib::policy::ColorPolicy;
use recstick_lib::status::Status;

use super::{Config, Result, SetOutput};

/// Apply one color to every LED and report the outcome. Unlike the watch
/// loop, a one-shot invocation treats a missing stick as an error: there
/// is no later retry to pick it up.
fn apply_once(label: &str, color: Color, alt: Color, json: bool) -> Result<()> {
    let mut conn = DeviceConnection::new(UsbSource, alt);
    conn.apply(color, false);
    if !conn.is_connected() {
        return Err(RecstickError::Device(DeviceError::NotFound));
    }

    if json {
        let out = SetOutput {
            status: label.to_string(),
            color: color.to_string(),
            applied: true,
        };
        let json = serde_json::to_string_pretty(&out)
            .map_err(|e| RecstickError::Config(format!("JSON serialization failed: {e}")))?;
        println!("{json}");
    } else {
        println!("{label} -> {color}");
    }
    Ok(())
}

pub(super) fn cmd_set(status_arg: &str, json: bool, config_path: Option<&Path>) -> Result<()> {
    let status: Status = status_arg.parse()?;
    let palette = Config::load_or_default(config_path)?.resolve()?;
    let color = ColorPolicy::new(&palette).resolve(status, false);
    apply_once(status.as_str(), color, palette.preview, json)
}

pub(super) fn cmd_off(json: bool, config_path: Option<&Path>) -> Result<()> {
    let palette = Config::load_or_default(config_path)?.resolve()?;
    apply_once("off", palette.off, palette.preview, json)
}
