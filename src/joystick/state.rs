//! # Device State Cache
//!
//! Holds the latest reading of every axis and button and applies queued
//! driver events to it.
//!
//! There is no history: a new event for an index overwrites the previous
//! value. Buffer sizes are fixed when the cache is created and never change
//! for the lifetime of a session.
//!
//! ## Usage
//!
//! ```
//! use joycam::joystick::state::DeviceState;
//!
//! let state = DeviceState::new(6, 11)?;
//! assert_eq!(state.axis(0)?, 0);
//! assert!(state.axis(6).is_err());
//! # Ok::<(), joycam::error::JoycamError>(())
//! ```

use tracing::{debug, warn};

use super::event::{EventKind, JoystickEvent};
use super::source::EventSource;
use crate::error::{JoycamError, Result};

/// Outcome of one [`DeviceState::drain`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainStats {
    /// Events written into the cache.
    pub applied: usize,
    /// Events dropped (unknown kind or index outside the discovered range).
    pub ignored: usize,
    /// Whether the drain stopped on a read error.
    pub read_error: bool,
}

/// Latest axis/button readings of one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    axes: Vec<i16>,
    buttons: Vec<i16>,
}

impl DeviceState {
    /// Allocates zeroed buffers for the given counts.
    ///
    /// Counts come from single-byte driver queries, so both are below 256.
    ///
    /// # Errors
    ///
    /// Returns [`JoycamError::Allocation`] if the buffers cannot be reserved.
    pub fn new(axis_count: u8, button_count: u8) -> Result<Self> {
        Ok(Self {
            axes: zeroed_buffer(axis_count, "axes")?,
            buttons: zeroed_buffer(button_count, "buttons")?,
        })
    }

    /// Number of axes discovered at open time.
    #[must_use]
    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    /// Number of buttons discovered at open time.
    #[must_use]
    pub fn button_count(&self) -> usize {
        self.buttons.len()
    }

    /// Returns the latest value of axis `index`.
    ///
    /// # Errors
    ///
    /// Returns [`JoycamError::AxisIndex`] unless `index < axis_count`.
    pub fn axis(&self, index: usize) -> Result<i16> {
        self.axes
            .get(index)
            .copied()
            .ok_or(JoycamError::AxisIndex {
                index,
                count: self.axes.len(),
            })
    }

    /// Returns the latest value of button `index`.
    ///
    /// # Errors
    ///
    /// Returns [`JoycamError::ButtonIndex`] unless `index < button_count`.
    pub fn button(&self, index: usize) -> Result<i16> {
        self.buttons
            .get(index)
            .copied()
            .ok_or(JoycamError::ButtonIndex {
                index,
                count: self.buttons.len(),
            })
    }

    /// Like [`DeviceState::axis`], but logs the failure and reads as 0.
    #[must_use]
    pub fn axis_or_zero(&self, index: usize) -> i16 {
        self.axis(index).unwrap_or_else(|e| {
            warn!("{}", e);
            0
        })
    }

    /// Like [`DeviceState::button`], but logs the failure and reads as 0.
    #[must_use]
    pub fn button_or_zero(&self, index: usize) -> i16 {
        self.button(index).unwrap_or_else(|e| {
            warn!("{}", e);
            0
        })
    }

    /// Applies one event to the cache.
    ///
    /// Returns `false` when the event was dropped.
    pub fn apply(&mut self, event: &JoystickEvent) -> bool {
        let slot = match event.kind {
            EventKind::Axis => self.axes.get_mut(usize::from(event.index)),
            EventKind::Button => self.buttons.get_mut(usize::from(event.index)),
            EventKind::Unknown(kind) => {
                debug!("Ignoring event of unknown type 0x{:02x}", kind);
                return false;
            }
        };

        match slot {
            Some(value) => {
                *value = event.value;
                true
            }
            None => {
                debug!(
                    "Ignoring {:?} event for index {} outside discovered range",
                    event.kind, event.index
                );
                false
            }
        }
    }

    /// Consumes every queued event from `source` without blocking.
    ///
    /// Stops as soon as the source reports an empty queue. A read error is
    /// logged and ends this drain; the cache keeps its last known values, so
    /// an unplugged controller freezes input instead of failing the session.
    pub fn drain<S: EventSource + ?Sized>(&mut self, source: &mut S) -> DrainStats {
        let mut stats = DrainStats::default();

        loop {
            match source.next_event() {
                Ok(Some(event)) => {
                    if self.apply(&event) {
                        stats.applied += 1;
                    } else {
                        stats.ignored += 1;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("{}", JoycamError::ReadTransient(e));
                    stats.read_error = true;
                    break;
                }
            }
        }

        if stats.applied > 0 || stats.ignored > 0 {
            debug!(
                "Drained {} events ({} ignored)",
                stats.applied + stats.ignored,
                stats.ignored
            );
        }

        stats
    }
}

fn zeroed_buffer(count: u8, what: &str) -> Result<Vec<i16>> {
    let len = usize::from(count);
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|e| JoycamError::Allocation(format!("{} {}: {}", len, what, e)))?;
    buffer.resize(len, 0);
    Ok(buffer)
}
