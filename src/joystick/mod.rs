//! # Joystick Module
//!
//! Linux joystick (joydev) input handling.
//!
//! This module handles:
//! - Opening `/dev/input/jsN` in non-blocking mode
//! - Querying name, driver version, axis and button counts
//! - Decoding driver event records
//! - Caching the latest axis/button values
//! - Passing correction coefficients through to the driver

pub mod calibration;
pub mod device;
pub mod event;
pub mod source;
pub mod state;

pub use device::{DeviceInfo, JoystickDevice};
pub use event::{EventKind, JoystickEvent};
pub use source::EventSource;
pub use state::{DeviceState, DrainStats};
