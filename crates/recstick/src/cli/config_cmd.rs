//! `config` subcommand — show current configuration and file path.

use std::path::Path;

use recstick_lib::color::Color;

use super::{Config, ConfigOutput, Result, kv, kv_indent, kv_width};

pub(super) fn cmd_config(json: bool, custom_path: Option<&Path>) -> Result<()> {
    let config = Config::load_or_default(custom_path)?;
    let config_path = custom_path.map(|p| p.to_path_buf()).or_else(Config::path);
    let config_exists = config_path.as_ref().map(|p| p.exists()).unwrap_or(false);

    if json {
        let output = ConfigOutput {
            config_file: config_path.as_ref().map(|p| p.display().to_string()),
            config_file_exists: config_exists,
            settings: config,
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
        return Ok(());
    }

    // Indented settings keys lose 2 chars of inner width to the "  " prefix.
    let w = kv_width(&[
        "Config file:",
        "preview_color:",
        "rec_color:",
        "pause_color:",
        "pause_delay_ms:",
        "upcoming_color:",
        "error_color:",
        "off_color:",
        "upcoming_lookahead_secs:",
    ]) + 2;

    match &config_path {
        Some(p) => {
            if config_exists {
                kv("Config file:", format_args!("{} (loaded)", p.display()), w);
            } else {
                kv(
                    "Config file:",
                    format_args!("{} (not found, using defaults)", p.display()),
                    w,
                );
            }
        }
        None => kv("Config file:", "(no config directory)", w),
    }
    println!();

    let color_display = |raw: &str| match Color::parse(raw) {
        Ok(c) => c.to_string(),
        Err(_) => format!("{raw} (invalid)"),
    };

    println!("Settings:");
    kv_indent("preview_color:", color_display(&config.preview_color), w);
    kv_indent("rec_color:", color_display(&config.rec_color), w);
    kv_indent("pause_color:", color_display(&config.pause_color), w);
    kv_indent("pause_delay_ms:", config.pause_delay_ms, w);
    kv_indent("upcoming_color:", color_display(&config.upcoming_color), w);
    kv_indent("error_color:", color_display(&config.error_color), w);
    kv_indent("off_color:", color_display(&config.off_color), w);
    kv_indent(
        "upcoming_lookahead_secs:",
        config.upcoming_lookahead_secs,
        w,
    );
    Ok(())
}
