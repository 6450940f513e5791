//! # Joystick Event Decoding
//!
//! Decodes the fixed-size event record produced by the Linux joystick
//! driver (`struct js_event` in `<linux/joystick.h>`).
//!
//! ## Record Layout
//!
//! | Offset | Size | Field | Description |
//! |--------|------|-------|-------------|
//! | 0 | 4 | time | Event timestamp in milliseconds |
//! | 4 | 2 | value | New axis position or button state |
//! | 6 | 1 | type | Event type bits |
//! | 7 | 1 | number | Axis/button index |
//!
//! All fields are in native byte order.
//!
//! ## Event Types
//!
//! - `JS_EVENT_BUTTON (0x01)`: a button changed
//! - `JS_EVENT_AXIS (0x02)`: an axis moved
//! - `JS_EVENT_INIT (0x80)`: OR-ed in for the synthetic events the driver
//!   emits right after open to report the initial state

/// Size of one kernel event record in bytes.
pub const JS_EVENT_SIZE: usize = 8;

/// Button pressed/released.
pub const JS_EVENT_BUTTON: u8 = 0x01;

/// Axis moved.
pub const JS_EVENT_AXIS: u8 = 0x02;

/// Initial state of device.
pub const JS_EVENT_INIT: u8 = 0x80;

/// What an event reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// An axis reading.
    Axis,
    /// A button reading.
    Button,
    /// Anything else the driver sends; carries the raw type with the init bit cleared.
    Unknown(u8),
}

impl EventKind {
    /// Classifies a raw type byte.
    ///
    /// The init flag is stripped first: synthetic and live events are
    /// treated the same.
    ///
    /// # Examples
    ///
    /// ```
    /// use joycam::joystick::event::{EventKind, JS_EVENT_AXIS, JS_EVENT_INIT};
    ///
    /// assert_eq!(EventKind::from_raw(JS_EVENT_AXIS), EventKind::Axis);
    /// assert_eq!(EventKind::from_raw(JS_EVENT_AXIS | JS_EVENT_INIT), EventKind::Axis);
    /// ```
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        match raw & !JS_EVENT_INIT {
            JS_EVENT_AXIS => EventKind::Axis,
            JS_EVENT_BUTTON => EventKind::Button,
            other => EventKind::Unknown(other),
        }
    }
}

/// One decoded joystick event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoystickEvent {
    /// Driver timestamp in milliseconds.
    pub timestamp_ms: u32,
    /// New value: -32768..=32767 for axes, 0/1 for buttons.
    pub value: i16,
    /// Event classification (init flag already stripped).
    pub kind: EventKind,
    /// Axis or button index.
    pub index: u8,
}

impl JoystickEvent {
    /// Creates an axis event.
    #[must_use]
    pub fn axis(index: u8, value: i16) -> Self {
        Self {
            timestamp_ms: 0,
            value,
            kind: EventKind::Axis,
            index,
        }
    }

    /// Creates a button event.
    #[must_use]
    pub fn button(index: u8, value: i16) -> Self {
        Self {
            timestamp_ms: 0,
            value,
            kind: EventKind::Button,
            index,
        }
    }

    /// Decodes a raw kernel record.
    ///
    /// # Examples
    ///
    /// ```
    /// use joycam::joystick::event::{EventKind, JoystickEvent};
    ///
    /// let mut raw = [0u8; 8];
    /// raw[0..4].copy_from_slice(&1234u32.to_ne_bytes());
    /// raw[4..6].copy_from_slice(&(-20000i16).to_ne_bytes());
    /// raw[6] = 0x82; // axis | init
    /// raw[7] = 3;
    ///
    /// let event = JoystickEvent::from_bytes(&raw);
    /// assert_eq!(event.kind, EventKind::Axis);
    /// assert_eq!(event.value, -20000);
    /// assert_eq!(event.index, 3);
    /// ```
    #[must_use]
    pub fn from_bytes(raw: &[u8; JS_EVENT_SIZE]) -> Self {
        Self {
            timestamp_ms: u32::from_ne_bytes([raw[0], raw[1], raw[2], raw[3]]),
            value: i16::from_ne_bytes([raw[4], raw[5]]),
            kind: EventKind::from_raw(raw[6]),
            index: raw[7],
        }
    }
}
