//! Color parsing and formatting.
//!
//! Colors travel through the controller as plain RGB triples and render as
//! lowercase `#rrggbb` strings, the format the config file uses.

use std::fmt;

/// An RGB color as sent to the indicator peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// All LEDs dark.
    pub const OFF: Color = Color::new(0, 0, 0);

    /// Parse a color string.
    ///
    /// Accepts:
    /// - Hex: `"#ff0000"`, `"ff0000"`, `"#FF0000"`
    /// - Named: `"red"`, `"green"`, `"blue"`, `"white"`, `"yellow"`,
    ///   `"purple"`, `"cyan"`, `"orange"`, `"off"`/`"black"`
    pub fn parse(s: &str) -> crate::error::Result<Color> {
        let s = s.trim();

        // Named colors
        match s.to_lowercase().as_str() {
            "red" => return Ok(Color::new(0xff, 0x00, 0x00)),
            "green" => return Ok(Color::new(0x00, 0xff, 0x00)),
            "blue" => return Ok(Color::new(0x00, 0x00, 0xff)),
            "white" => return Ok(Color::new(0xff, 0xff, 0xff)),
            "yellow" => return Ok(Color::new(0xff, 0xff, 0x00)),
            "purple" => return Ok(Color::new(0x80, 0x00, 0xff)),
            "cyan" => return Ok(Color::new(0x00, 0xff, 0xff)),
            "orange" => return Ok(Color::new(0xff, 0x80, 0x00)),
            "off" | "black" => return Ok(Color::OFF),
            _ => {}
        }

        // Hex color
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 {
            return Err(crate::RecstickError::Color(format!(
                "Invalid color: {s} (use #rrggbb or a color name)"
            )));
        }
        let val = u32::from_str_radix(hex, 16)
            .map_err(|_| crate::RecstickError::Color(format!("Invalid hex color: {s}")))?;
        Ok(Color::new(
            (val >> 16) as u8,
            (val >> 8) as u8,
            val as u8,
        ))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── parse ──

    #[test]
    fn parse_named_red() {
        assert_eq!(Color::parse("red").unwrap(), Color::new(0xff, 0, 0));
    }

    #[test]
    fn parse_named_off() {
        assert_eq!(Color::parse("off").unwrap(), Color::OFF);
        assert_eq!(Color::parse("black").unwrap(), Color::OFF);
    }

    #[test]
    fn parse_named_case_insensitive() {
        assert_eq!(Color::parse("RED").unwrap(), Color::new(0xff, 0, 0));
        assert_eq!(Color::parse("  Red  ").unwrap(), Color::new(0xff, 0, 0));
    }

    #[test]
    fn parse_hex_with_hash() {
        assert_eq!(Color::parse("#ff0000").unwrap(), Color::new(0xff, 0, 0));
        assert_eq!(Color::parse("#aa00aa").unwrap(), Color::new(0xaa, 0, 0xaa));
    }

    #[test]
    fn parse_hex_without_hash() {
        assert_eq!(Color::parse("ffff00").unwrap(), Color::new(0xff, 0xff, 0));
    }

    #[test]
    fn parse_hex_uppercase() {
        assert_eq!(Color::parse("#ABCDEF").unwrap(), Color::new(0xab, 0xcd, 0xef));
    }

    #[test]
    fn parse_invalid_short() {
        assert!(Color::parse("#fff").is_err());
    }

    #[test]
    fn parse_invalid_long() {
        assert!(Color::parse("#ff000000").is_err());
    }

    #[test]
    fn parse_invalid_name() {
        assert!(Color::parse("chartreuse").is_err());
    }

    #[test]
    fn parse_invalid_hex_chars() {
        assert!(Color::parse("#gghhii").is_err());
    }

    // ── display ──

    #[test]
    fn display_lowercase_hex() {
        assert_eq!(Color::new(0xff, 0, 0).to_string(), "#ff0000");
        assert_eq!(Color::new(0xaa, 0, 0xaa).to_string(), "#aa00aa");
        assert_eq!(Color::OFF.to_string(), "#000000");
    }

    #[test]
    fn parse_display_roundtrip() {
        let c = Color::parse("#12ab34").unwrap();
        assert_eq!(Color::parse(&c.to_string()).unwrap(), c);
    }
}
