//! Application configuration — TOML-based, platform-aware paths.
//!
//! The raw [`Config`] keeps colors as strings so the file stays hand-editable;
//! [`Config::resolve`] parses it once into an immutable [`Palette`] that the
//! controller is constructed with.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Header comment prepended to saved config files.
const CONFIG_HEADER: &str =
    "# recstick configuration — status colors and timing for the indicator.\n\n";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Color while previewing (idle). Default: "#000000" (dark).
    #[serde(default = "default_preview_color")]
    pub preview_color: String,

    /// Color while recording. Default: "#ff0000".
    #[serde(default = "default_rec_color")]
    pub rec_color: String,

    /// "On" phase color while paused (alternates with the preview color).
    /// Default: "#ff0000".
    #[serde(default = "default_pause_color")]
    pub pause_color: String,

    /// Flash toggle interval while paused, in milliseconds. Default: 1000.
    #[serde(default = "default_pause_delay_ms")]
    pub pause_delay_ms: u64,

    /// Color when a scheduled recording is imminent. Default: "#ffff00".
    #[serde(default = "default_upcoming_color")]
    pub upcoming_color: String,

    /// Color when the recorder reports an error. Default: "#aa00aa".
    #[serde(default = "default_error_color")]
    pub error_color: String,

    /// Color applied on shutdown. Default: "#000000".
    #[serde(default = "default_off_color")]
    pub off_color: String,

    /// How far ahead a scheduled recording counts as "upcoming", in seconds.
    /// Default: 60.
    #[serde(default = "default_upcoming_lookahead_secs")]
    pub upcoming_lookahead_secs: u64,
}

fn default_preview_color() -> String {
    "#000000".into()
}
fn default_rec_color() -> String {
    "#ff0000".into()
}
fn default_pause_color() -> String {
    "#ff0000".into()
}
fn default_pause_delay_ms() -> u64 {
    1000
}
fn default_upcoming_color() -> String {
    "#ffff00".into()
}
fn default_error_color() -> String {
    "#aa00aa".into()
}
fn default_off_color() -> String {
    "#000000".into()
}
fn default_upcoming_lookahead_secs() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Config {
            preview_color: default_preview_color(),
            rec_color: default_rec_color(),
            pause_color: default_pause_color(),
            pause_delay_ms: default_pause_delay_ms(),
            upcoming_color: default_upcoming_color(),
            error_color: default_error_color(),
            off_color: default_off_color(),
            upcoming_lookahead_secs: default_upcoming_lookahead_secs(),
        }
    }
}

impl Config {
    /// Default config file path: `<config dir>/recstick/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("recstick").join("config.toml"))
    }

    /// Load config from a TOML file.
    pub fn load(path: &Path) -> crate::error::Result<Config> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| crate::RecstickError::Config(e.to_string()))
    }

    /// Load from the given path, or the default location, or fall back to
    /// defaults when no file exists. A file that exists but fails to parse
    /// is an error — silently ignoring it would mask typos.
    pub fn load_or_default(path: Option<&Path>) -> crate::error::Result<Config> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Config::path() {
                Some(p) => p,
                None => return Ok(Config::default()),
            },
        };
        if path.exists() {
            Config::load(&path)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to a TOML file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body =
            toml::to_string_pretty(self).map_err(|e| crate::RecstickError::Config(e.to_string()))?;
        std::fs::write(path, format!("{CONFIG_HEADER}{body}"))?;
        Ok(())
    }

    /// Parse the string-valued fields into an immutable [`Palette`].
    pub fn resolve(&self) -> crate::error::Result<Palette> {
        let palette = Palette {
            preview: parse_field("preview_color", &self.preview_color)?,
            rec: parse_field("rec_color", &self.rec_color)?,
            pause: parse_field("pause_color", &self.pause_color)?,
            upcoming: parse_field("upcoming_color", &self.upcoming_color)?,
            error: parse_field("error_color", &self.error_color)?,
            off: parse_field("off_color", &self.off_color)?,
            pause_delay: Duration::from_millis(self.pause_delay_ms),
            upcoming_lookahead: Duration::from_secs(self.upcoming_lookahead_secs),
        };
        log::debug!(
            "palette: preview={} rec={} pause={} upcoming={} error={} off={} \
             pause_delay={}ms lookahead={}s",
            palette.preview,
            palette.rec,
            palette.pause,
            palette.upcoming,
            palette.error,
            palette.off,
            self.pause_delay_ms,
            self.upcoming_lookahead_secs,
        );
        Ok(palette)
    }
}

fn parse_field(name: &str, value: &str) -> crate::error::Result<Color> {
    Color::parse(value)
        .map_err(|_| crate::RecstickError::Config(format!("invalid {name}: {value:?}")))
}

/// Resolved, immutable color and timing configuration.
///
/// Built once by [`Config::resolve`]; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Palette {
    pub preview: Color,
    pub rec: Color,
    pub pause: Color,
    pub upcoming: Color,
    pub error: Color,
    pub off: Color,
    pub pause_delay: Duration,
    pub upcoming_lookahead: Duration,
}
