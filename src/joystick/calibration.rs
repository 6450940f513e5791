//! # Correction Coefficients
//!
//! Builds the per-axis correction table the joystick driver accepts through
//! `JSIOCSCORR`. Values are handed to the driver as configured; nothing here
//! interprets them.
//!
//! The same job can be done from the shell with `jscal` or `jstest-gtk`.
//!
//! ## Usage
//!
//! ```
//! use joycam::joystick::calibration::{Correction, CorrectionTable};
//!
//! let entry = Correction::new(1, 255, [24617, 40917, 21844, 21844]);
//! let table = CorrectionTable::uniform(6, entry);
//! assert_eq!(table.len(), 6);
//! ```

use serde::Deserialize;

/// Number of coefficient slots per axis in the driver structure.
pub const JS_CORR_COEFFICIENTS: usize = 8;

/// No correction.
pub const JS_CORR_NONE: u16 = 0x00;

/// Broken line correction.
pub const JS_CORR_BROKEN: u16 = 0x01;

/// Mirror of `struct js_corr`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawCorrection {
    pub coef: [i32; JS_CORR_COEFFICIENTS],
    pub prec: i16,
    pub kind: u16,
}

/// Correction entry for one axis, as configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Correction {
    /// Correction type (`0` none, `1` broken line).
    #[serde(rename = "type")]
    pub kind: u16,
    /// Precision field passed to the driver.
    pub precision: i16,
    /// The four coefficients the broken-line correction uses.
    pub coefficients: [i32; 4],
}

impl Correction {
    /// Creates a correction entry.
    #[must_use]
    pub fn new(kind: u16, precision: i16, coefficients: [i32; 4]) -> Self {
        Self {
            kind,
            precision,
            coefficients,
        }
    }

    /// Converts into the driver layout; unused coefficient slots are zero.
    #[must_use]
    pub fn to_raw(&self) -> RawCorrection {
        let mut coef = [0i32; JS_CORR_COEFFICIENTS];
        coef[..4].copy_from_slice(&self.coefficients);
        RawCorrection {
            coef,
            prec: self.precision,
            kind: self.kind,
        }
    }
}

/// One correction entry per axis, in driver layout.
///
/// The driver copies exactly one entry per axis it reported, so the table
/// must be built for the discovered axis count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionTable {
    entries: Vec<RawCorrection>,
}

impl CorrectionTable {
    /// Uses the same entry for every axis.
    #[must_use]
    pub fn uniform(axis_count: u8, entry: Correction) -> Self {
        Self {
            entries: vec![entry.to_raw(); usize::from(axis_count)],
        }
    }

    /// Number of axes covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table covers no axes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Driver-layout entries, one per axis.
    #[must_use]
    pub fn entries(&self) -> &[RawCorrection] {
        &self.entries
    }
}
