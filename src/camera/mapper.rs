//! # Axis-to-Angle Mapper
//!
//! Turns a raw stick deflection into a per-frame rotation increment.
//!
//! ## Curve
//!
//! ```text
//! |angle| = ln(max(1, |raw| * frame_factor)) / normalization
//! ```
//!
//! - Deflections inside the dead zone (`-1000 < raw < 1000`) count as 0.
//! - The logarithm compresses large deflections, which keeps every
//!   per-frame increment small.
//! - The floor of 1 keeps the logarithm's argument defined and the result
//!   non-negative, whatever the raw value or frame factor.
//! - The sign follows `raw`; non-positive raw values give non-positive angles.
//!
//! ## Usage
//!
//! ```
//! use joycam::camera::mapper::axis_to_angle;
//!
//! assert_eq!(axis_to_angle(500, 0.016), 0.0);
//!
//! let angle = axis_to_angle(20000, 0.016);
//! assert!((angle - (20000.0f64 * 0.016).ln() / 2000.0).abs() < 1e-12);
//! ```

/// Raw deflection below which input is treated as rest noise.
pub const DEFAULT_DEAD_ZONE: i16 = 1000;

/// Divisor applied after the logarithm.
pub const DEFAULT_TURN_NORMALIZATION: f64 = 2000.0;

/// Largest frame factor honored; larger values are clamped.
pub const MAX_FRAME_FACTOR: f64 = 1.0e6;

/// Maps raw axis values to rotation angles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleMapper {
    dead_zone: i16,
    normalization: f64,
}

impl Default for AngleMapper {
    fn default() -> Self {
        Self {
            dead_zone: DEFAULT_DEAD_ZONE,
            normalization: DEFAULT_TURN_NORMALIZATION,
        }
    }
}

impl AngleMapper {
    /// Creates a mapper.
    ///
    /// Negative dead zones are treated as 0, and a normalization that is not
    /// a positive finite number falls back to the default.
    #[must_use]
    pub fn new(dead_zone: i16, normalization: f64) -> Self {
        let normalization = if normalization.is_finite() && normalization > 0.0 {
            normalization
        } else {
            DEFAULT_TURN_NORMALIZATION
        };
        Self {
            dead_zone: dead_zone.max(0),
            normalization,
        }
    }

    /// Configured dead zone.
    #[must_use]
    pub fn dead_zone(&self) -> i16 {
        self.dead_zone
    }

    /// Configured normalization.
    #[must_use]
    pub fn normalization(&self) -> f64 {
        self.normalization
    }

    /// Maps `raw` to an angle for a frame scaled by `frame_factor`.
    ///
    /// Always finite. NaN and non-positive frame factors yield 0; frame
    /// factors above [`MAX_FRAME_FACTOR`] are clamped.
    #[must_use]
    pub fn angle(&self, raw: i16, frame_factor: f64) -> f64 {
        let raw = if raw > -self.dead_zone && raw < self.dead_zone {
            0
        } else {
            raw
        };

        let factor = if frame_factor.is_nan() {
            0.0
        } else {
            frame_factor.clamp(0.0, MAX_FRAME_FACTOR)
        };

        let magnitude = (f64::from(raw).abs() * factor).max(1.0).ln() / self.normalization;

        if raw <= 0 {
            -magnitude
        } else {
            magnitude
        }
    }
}

/// [`AngleMapper::angle`] with the default dead zone and normalization.
#[must_use]
pub fn axis_to_angle(raw: i16, frame_factor: f64) -> f64 {
    AngleMapper::default().angle(raw, frame_factor)
}
