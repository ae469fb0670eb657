//! `devices` subcommand — list attached BlinkStick devices.

use recstick_lib::device::enumerate_devices;

use super::{DevicesOutput, Result};

pub(super) fn cmd_devices(json: bool) -> Result<()> {
    let devices = enumerate_devices();

    if json {
        let output = DevicesOutput {
            count: devices.len(),
            devices,
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
        return Ok(());
    }

    if devices.is_empty() {
        println!("No BlinkStick devices found.");
        return Ok(());
    }

    println!(
        "Found {} BlinkStick device{}:",
        devices.len(),
        if devices.len() == 1 { "" } else { "s" }
    );
    println!();

    for (i, dev) in devices.iter().enumerate() {
        println!("  [{}] {}", i + 1, dev.path);
        if let Some(ref serial) = dev.serial {
            println!("      Serial: {serial}");
        }
    }

    Ok(())
}
