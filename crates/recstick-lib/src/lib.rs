//! recstick-lib — recording-status LED indicator for BlinkStick peripherals.
//!
//! Turns a capture host's recorder state into colors on an 8-LED BlinkStick:
//! red while recording, blinking red while paused, yellow when a scheduled
//! recording is imminent, purple on error, dark otherwise. The device is
//! treated as strictly optional hardware; it may be absent, unplugged, or
//! misbehaving at any time without disturbing the host.
//!
//! The pieces, bottom up: [`protocol`] holds the USB constants, [`device`]
//! the raw HID transfers, [`connection`] the fault-absorbing apply loop,
//! [`policy`] and [`flash`] the color decisions, [`coordinator`] the state
//! machine, and [`runtime`] the single-threaded event loop tying it all
//! together.

pub mod color;
pub mod config;
pub mod connection;
pub mod coordinator;
pub mod device;
pub mod error;
pub mod flash;
pub mod policy;
pub mod protocol;
pub mod runtime;
pub mod status;

pub use error::{RecstickError, Result};
