//! Unified error type for the recstick-lib crate.
//!
//! [`RecstickError`] wraps the device-layer error (`DeviceError`) and
//! domain-specific error kinds (`Config`, `Color`, `Status`). `From` impls
//! allow `?` to propagate across module boundaries seamlessly.
//!
//! Note that the live apply path ([`DeviceConnection::apply`]) absorbs all
//! device faults internally; these errors surface only from setup-time
//! operations (config loading, one-shot CLI commands, explicit opens).
//!
//! [`DeviceConnection::apply`]: crate::connection::DeviceConnection::apply

use std::fmt;

use crate::device::DeviceError;

/// Unified error type for recstick-lib operations.
#[derive(Debug)]
pub enum RecstickError {
    /// Device communication error (open, control transfer).
    Device(DeviceError),
    /// Standard I/O error (config file read/write).
    Io(std::io::Error),
    /// Configuration parsing or validation error.
    Config(String),
    /// Color parsing error.
    Color(String),
    /// Unknown status name.
    Status(String),
}

impl fmt::Display for RecstickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecstickError::Device(e) => write!(f, "{e}"),
            RecstickError::Io(e) => write!(f, "I/O error: {e}"),
            RecstickError::Config(e) => write!(f, "Config error: {e}"),
            RecstickError::Color(e) => write!(f, "Color error: {e}"),
            RecstickError::Status(s) => write!(f, "Unknown status: {s}"),
        }
    }
}

impl std::error::Error for RecstickError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecstickError::Device(e) => Some(e),
            RecstickError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DeviceError> for RecstickError {
    fn from(e: DeviceError) -> Self {
        RecstickError::Device(e)
    }
}

impl From<std::io::Error> for RecstickError {
    fn from(e: std::io::Error) -> Self {
        RecstickError::Io(e)
    }
}

/// Crate-level Result alias using [`RecstickError`].
pub type Result<T> = std::result::Result<T, RecstickError>;
