//! # Error Types
//!
//! Custom error types for joycam using `thiserror`.
//!
//! Fatal at session start: [`JoycamError::DeviceOpen`] and
//! [`JoycamError::Allocation`]. Everything else is reported and the session
//! carries on with defaults or stale input.

use thiserror::Error;

/// Main error type for joycam
#[derive(Debug, Error)]
pub enum JoycamError {
    /// Device node missing, unreadable, or not answering
    #[error("Failed to open joystick device {path}: {source}")]
    DeviceOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A metadata query (name, counts, driver version) failed
    #[error("Device info query failed: {0}")]
    DeviceInfo(String),

    /// Sample buffers could not be sized
    #[error("Failed to allocate sample buffers: {0}")]
    Allocation(String),

    /// Axis index outside the discovered range
    #[error("Invalid axis index {index} (device has {count} axes)")]
    AxisIndex { index: usize, count: usize },

    /// Button index outside the discovered range
    #[error("Invalid button index {index} (device has {count} buttons)")]
    ButtonIndex { index: usize, count: usize },

    /// A single event read failed
    #[error("Transient read error: {0}")]
    ReadTransient(std::io::Error),

    /// Correction coefficients were rejected by the driver
    #[error("Calibration error: {0}")]
    Calibration(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Pose trace errors
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for joycam
pub type Result<T> = std::result::Result<T, JoycamError>;
