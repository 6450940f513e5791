//! # Translation Integrator
//!
//! Moves the camera from four independent axes.
//!
//! | Binding | Default axis | Offset | Direction |
//! |---------|--------------|--------|-----------|
//! | forward | 4 | 0 (inverted) | view, flattened to the horizontal plane |
//! | strafe | 3 | 0 | side, flattened to the horizontal plane |
//! | rise | 2 | 32768 | world up `(0, 1, 0)` |
//! | sink | 5 | 32768 | world down `(0, -1, 0)` |
//!
//! Each contribution is `±(raw + offset) / normalization` along its
//! direction. Offsets compensate for axes whose rest position is not zero,
//! such as analog triggers resting at -32768.

use nalgebra::{Unit, Vector3};
use serde::Deserialize;

use super::orientation::DEGENERATE_EPSILON;

/// Default divisor applied to translation axes.
pub const DEFAULT_TRANSLATION_NORMALIZATION: f64 = 500_000.0;

/// Offset that moves a trigger resting at -32768 to zero.
pub const TRIGGER_REST_OFFSET: i32 = 32768;

/// One translation axis binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AxisBinding {
    /// Device axis index.
    pub axis: u8,
    /// Added to the raw value before scaling.
    #[serde(default)]
    pub offset: i32,
    /// Flips the direction of travel.
    #[serde(default)]
    pub invert: bool,
}

impl AxisBinding {
    /// Creates a binding.
    #[must_use]
    pub const fn new(axis: u8, offset: i32, invert: bool) -> Self {
        Self {
            axis,
            offset,
            invert,
        }
    }

    /// Scaled contribution of a raw reading, before applying a direction.
    #[must_use]
    pub fn scale(&self, raw: i16, normalization: f64) -> f64 {
        let centered = f64::from(i32::from(raw) + self.offset) / normalization;
        if self.invert {
            -centered
        } else {
            centered
        }
    }
}

/// Axis bindings for the four translation directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TranslationBindings {
    pub forward: AxisBinding,
    pub strafe: AxisBinding,
    pub rise: AxisBinding,
    pub sink: AxisBinding,
}

impl Default for TranslationBindings {
    fn default() -> Self {
        Self {
            forward: AxisBinding::new(4, 0, true),
            strafe: AxisBinding::new(3, 0, false),
            rise: AxisBinding::new(2, TRIGGER_REST_OFFSET, false),
            sink: AxisBinding::new(5, TRIGGER_REST_OFFSET, false),
        }
    }
}

impl TranslationBindings {
    /// Every axis index read by these bindings.
    #[must_use]
    pub fn axes(&self) -> [u8; 4] {
        [
            self.forward.axis,
            self.strafe.axis,
            self.rise.axis,
            self.sink.axis,
        ]
    }
}

/// Accumulates translation from stick input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranslationIntegrator {
    bindings: TranslationBindings,
    normalization: f64,
}

impl Default for TranslationIntegrator {
    fn default() -> Self {
        Self {
            bindings: TranslationBindings::default(),
            normalization: DEFAULT_TRANSLATION_NORMALIZATION,
        }
    }
}

impl TranslationIntegrator {
    /// Creates an integrator.
    ///
    /// A normalization that is not a positive finite number falls back to
    /// the default.
    #[must_use]
    pub fn new(bindings: TranslationBindings, normalization: f64) -> Self {
        let normalization = if normalization.is_finite() && normalization > 0.0 {
            normalization
        } else {
            DEFAULT_TRANSLATION_NORMALIZATION
        };
        Self {
            bindings,
            normalization,
        }
    }

    /// Configured bindings.
    #[must_use]
    pub fn bindings(&self) -> &TranslationBindings {
        &self.bindings
    }

    /// Computes this frame's translation increment.
    ///
    /// `read_axis` supplies the raw value of a device axis. Forward and
    /// strafe motion stays in the horizontal plane; a view or side vector
    /// with no horizontal component contributes nothing.
    pub fn delta<F>(
        &self,
        view: &Vector3<f64>,
        side: Option<&Unit<Vector3<f64>>>,
        mut read_axis: F,
    ) -> Vector3<f64>
    where
        F: FnMut(u8) -> i16,
    {
        let up = Vector3::new(0.0, 1.0, 0.0);
        let down = Vector3::new(0.0, -1.0, 0.0);
        let n = self.normalization;
        let b = &self.bindings;

        let forward = horizontal(view) * b.forward.scale(read_axis(b.forward.axis), n);
        let strafe = side
            .map(|s| horizontal(s))
            .unwrap_or_else(Vector3::zeros)
            * b.strafe.scale(read_axis(b.strafe.axis), n);
        let rise = up * b.rise.scale(read_axis(b.rise.axis), n);
        let sink = down * b.sink.scale(read_axis(b.sink.axis), n);

        forward + strafe + rise + sink
    }
}

/// Drops the vertical component and renormalizes; zero when nothing is left.
fn horizontal(v: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(v.x, 0.0, v.z)
        .try_normalize(DEGENERATE_EPSILON)
        .unwrap_or_else(Vector3::zeros)
}
