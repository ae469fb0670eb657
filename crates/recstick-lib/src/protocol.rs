//! BlinkStick USB protocol constants.
//!
//! The BlinkStick family enumerates as a USB HID device; colors are written
//! with class-level SET_REPORT control transfers carrying feature reports.

/// BlinkStick vendor ID (Agile Innovative).
pub const BLINKSTICK_VID: u16 = 0x20a0;
/// BlinkStick product ID.
pub const BLINKSTICK_PID: u16 = 0x41e5;

/// Number of LEDs on the BlinkStick Square.
pub const LED_COUNT: u8 = 8;

/// HID class request: SET_REPORT.
pub const HID_SET_REPORT: u8 = 0x09;
/// High byte of wValue for a feature report.
pub const HID_FEATURE_REPORT: u16 = 0x0300;

/// Feature report id for an indexed single-LED color write.
/// Payload: `[report_id, channel, index, r, g, b]`.
pub const REPORT_SET_INDEXED: u8 = 5;
/// LED channel (the Square wires all LEDs on channel 0).
pub const LED_CHANNEL: u8 = 0;

/// Per-transfer timeout. Writes are 6 bytes, so this is generous.
pub const USB_TIMEOUT_MS: u64 = 250;
