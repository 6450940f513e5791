//! # Orientation Integrator
//!
//! Rotates the view vector once per frame from two stick axes: the jaw
//! axis pitches the view about the camera's side vector, the turn axis yaws
//! it about world up `(0, 1, 0)`. The camera's up vector only shapes the
//! side vector and the pole limits.
//!
//! ## Per-frame step
//!
//! 1. `side = normalize(view × up)`. A zero-length cross product (view
//!    parallel to up) skips the rotation for this frame.
//! 2. Jaw limits from the current angle between view and up, in degrees:
//!    `max = max_angle - ∠(view, up)`, `min = min_angle - ∠(view, up)`. A
//!    limit that crosses zero is pinned at `∓pole_limit`.
//! 3. Map both axes through [`AngleMapper`].
//! 4. Drop a pitch increment that lies in `(0, min)` or `(max, 0)`, so the
//!    view never tips over the up vector or its antipode.
//! 5. Build one rotation per angle and combine them by [`Composition`].
//! 6. Rotate the view and renormalize it.
//!
//! Per-frame increments are far below one radian, so once the view is
//! within `min_angle` of up (or `180 - max_angle` of down) every increment
//! that would move it further toward that pole is suppressed.

use nalgebra::{Quaternion, Unit, UnitQuaternion, Vector3};
use serde::Deserialize;

use super::mapper::AngleMapper;

/// Length below which a vector or quaternion is considered degenerate.
pub const DEGENERATE_EPSILON: f64 = 1.0e-12;

/// Default upper jaw limit in degrees.
pub const DEFAULT_MAX_ANGLE: f64 = 179.0;

/// Default lower jaw limit in degrees.
pub const DEFAULT_MIN_ANGLE: f64 = 1.0;

/// Default magnitude a jaw limit is pinned at once it crosses zero.
pub const DEFAULT_POLE_LIMIT: f64 = 1.0;

/// How the pitch and yaw rotations of one frame are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Composition {
    /// Component-wise quaternion sum, then normalize. For small angles this
    /// is the half-way rotation between the two, i.e. roughly half of their
    /// product.
    #[default]
    Additive,
    /// Exact composition: yaw applied after pitch.
    Multiplicative,
}

/// Jaw limits in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JawLimits {
    pub max_angle: f64,
    pub min_angle: f64,
    pub pole_limit: f64,
}

impl Default for JawLimits {
    fn default() -> Self {
        Self {
            max_angle: DEFAULT_MAX_ANGLE,
            min_angle: DEFAULT_MIN_ANGLE,
            pole_limit: DEFAULT_POLE_LIMIT,
        }
    }
}

impl JawLimits {
    /// Returns `(min, max)` for a view that is `angle_to_up` degrees from up.
    #[must_use]
    pub fn bounds(&self, angle_to_up: f64) -> (f64, f64) {
        let max = self.max_angle - angle_to_up;
        let min = self.min_angle - angle_to_up;

        let max = if max < 0.0 { -self.pole_limit } else { max };
        let min = if min > 0.0 { self.pole_limit } else { min };

        (min, max)
    }

    /// Zeroes a pitch increment that would move the view past a pole.
    #[must_use]
    pub fn clamp_pitch(pitch: f64, min: f64, max: f64) -> f64 {
        if (pitch > 0.0 && pitch < min) || (pitch < 0.0 && pitch > max) {
            0.0
        } else {
            pitch
        }
    }
}

/// Result of one orientation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationStep {
    /// New unit view vector.
    pub view: Vector3<f64>,
    /// Side vector of the view before rotation; `None` when degenerate.
    pub side: Option<Unit<Vector3<f64>>>,
    /// Pitch applied this frame, after clamping.
    pub pitch: f64,
    /// Yaw applied this frame.
    pub yaw: f64,
}

/// Normalizes `q`, falling back to identity for zero-length or non-finite input.
#[must_use]
pub fn normalize_or_identity(q: Quaternion<f64>) -> UnitQuaternion<f64> {
    if !q.coords.iter().all(|c| c.is_finite()) {
        return UnitQuaternion::identity();
    }
    UnitQuaternion::try_new(q, DEGENERATE_EPSILON).unwrap_or_else(UnitQuaternion::identity)
}

/// Applies stick input to the view vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrientationIntegrator {
    mapper: AngleMapper,
    limits: JawLimits,
    composition: Composition,
}

impl OrientationIntegrator {
    /// Creates an integrator.
    #[must_use]
    pub fn new(mapper: AngleMapper, limits: JawLimits, composition: Composition) -> Self {
        Self {
            mapper,
            limits,
            composition,
        }
    }

    /// Configured composition policy.
    #[must_use]
    pub fn composition(&self) -> Composition {
        self.composition
    }

    /// Configured jaw limits.
    #[must_use]
    pub fn limits(&self) -> &JawLimits {
        &self.limits
    }

    /// Combines the two rotations of one frame into a unit quaternion.
    #[must_use]
    pub fn combine(&self, pitch: UnitQuaternion<f64>, yaw: UnitQuaternion<f64>) -> UnitQuaternion<f64> {
        match self.composition {
            Composition::Additive => normalize_or_identity(yaw.into_inner() + pitch.into_inner()),
            Composition::Multiplicative => normalize_or_identity((yaw * pitch).into_inner()),
        }
    }

    /// Runs one frame of orientation integration.
    ///
    /// `turn_raw` yaws about world up, `jaw_raw` pitches about `view × up`.
    #[must_use]
    pub fn step(
        &self,
        view: &Vector3<f64>,
        up: &Vector3<f64>,
        turn_raw: i16,
        jaw_raw: i16,
        frame_factor: f64,
    ) -> OrientationStep {
        let unchanged = OrientationStep {
            view: *view,
            side: None,
            pitch: 0.0,
            yaw: 0.0,
        };

        let Some(side) = Unit::try_new(view.cross(up), DEGENERATE_EPSILON) else {
            return unchanged;
        };

        let (min, max) = self.limits.bounds(view.angle(up).to_degrees());

        let pitch = JawLimits::clamp_pitch(self.mapper.angle(jaw_raw, frame_factor), min, max);
        let yaw = self.mapper.angle(turn_raw, frame_factor);

        let q_pitch = UnitQuaternion::from_axis_angle(&side, pitch);
        let q_yaw = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -yaw);
        let rotation = self.combine(q_pitch, q_yaw);

        let rotated = rotation * view;
        let view = rotated
            .try_normalize(DEGENERATE_EPSILON)
            .unwrap_or(*view);

        OrientationStep {
            view,
            side: Some(side),
            pitch,
            yaw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn up() -> Vector3<f64> {
        Vector3::new(0.0, 1.0, 0.0)
    }

    fn start_view() -> Vector3<f64> {
        Vector3::new(-30.0, 0.0, 70.0).normalize()
    }

    /// View `degrees` away from +Y, in the XY plane.
    fn view_from_up(degrees: f64) -> Vector3<f64> {
        let r = degrees.to_radians();
        Vector3::new(r.sin(), r.cos(), 0.0)
    }

    // ==================== Limits Tests ====================

    #[test]
    fn test_bounds_for_horizontal_view() {
        let (min, max) = JawLimits::default().bounds(90.0);
        assert_relative_eq!(min, -89.0);
        assert_relative_eq!(max, 89.0);
    }

    #[test]
    fn test_bounds_pin_near_poles() {
        let limits = JawLimits::default();

        let (min, _) = limits.bounds(0.5);
        assert_eq!(min, DEFAULT_POLE_LIMIT);

        let (_, max) = limits.bounds(179.5);
        assert_eq!(max, -DEFAULT_POLE_LIMIT);
    }

    #[test]
    fn test_clamp_pitch() {
        assert_eq!(JawLimits::clamp_pitch(0.5, 1.0, 89.0), 0.0);
        assert_eq!(JawLimits::clamp_pitch(-0.5, -89.0, -1.0), 0.0);
        assert_eq!(JawLimits::clamp_pitch(0.5, -89.0, 89.0), 0.5);
        assert_eq!(JawLimits::clamp_pitch(-0.5, -89.0, 89.0), -0.5);
        assert_eq!(JawLimits::clamp_pitch(0.0, 1.0, -1.0), 0.0);
    }

    // ==================== Quaternion Tests ====================

    #[test]
    fn test_normalize_or_identity_fallbacks() {
        let zero = Quaternion::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(normalize_or_identity(zero), UnitQuaternion::identity());

        let nan = Quaternion::new(f64::NAN, 0.0, 0.0, 0.0);
        assert_eq!(normalize_or_identity(nan), UnitQuaternion::identity());

        let scaled = normalize_or_identity(Quaternion::new(2.0, 0.0, 0.0, 0.0));
        assert_relative_eq!(scaled.into_inner().norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_additive_is_half_the_product_for_small_angles() {
        let axis_x = Vector3::x_axis();
        let axis_y = Vector3::y_axis();
        let pitch = UnitQuaternion::from_axis_angle(&axis_x, 0.003);
        let yaw = UnitQuaternion::from_axis_angle(&axis_y, -0.004);

        let additive = OrientationIntegrator::default().combine(pitch, yaw);
        let multiplicative = OrientationIntegrator::new(
            AngleMapper::default(),
            JawLimits::default(),
            Composition::Multiplicative,
        )
        .combine(pitch, yaw);

        assert_relative_eq!(
            additive.scaled_axis(),
            multiplicative.scaled_axis() / 2.0,
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_additive_of_identities_is_identity() {
        let identity = UnitQuaternion::identity();
        let combined = OrientationIntegrator::default().combine(identity, identity);
        assert_relative_eq!(combined.angle(), 0.0, epsilon = 1e-12);
    }

    // ==================== Step Tests ====================

    #[test]
    fn test_centered_sticks_leave_view_unchanged() {
        let integrator = OrientationIntegrator::default();
        let view = start_view();

        let step = integrator.step(&view, &up(), 0, 0, 0.016);
        assert_eq!(step.pitch, 0.0);
        assert_eq!(step.yaw, 0.0);
        assert_relative_eq!(step.view, view, epsilon = 1e-12);
    }

    #[test]
    fn test_dead_zone_noise_leaves_view_unchanged() {
        let integrator = OrientationIntegrator::default();
        let view = start_view();

        let step = integrator.step(&view, &up(), 999, -999, 0.016);
        assert_relative_eq!(step.view, view, epsilon = 1e-12);
    }

    #[test]
    fn test_view_parallel_to_up_skips_rotation() {
        let integrator = OrientationIntegrator::default();

        for view in [up(), -up()] {
            let step = integrator.step(&view, &up(), 32767, 32767, 0.016);
            assert!(step.side.is_none());
            assert_eq!(step.view, view);
        }
    }

    #[test]
    fn test_degenerate_up_skips_rotation() {
        let integrator = OrientationIntegrator::default();
        let view = start_view();

        let step = integrator.step(&view, &Vector3::zeros(), 32767, 32767, 0.016);
        assert_eq!(step.view, view);
    }

    #[test]
    fn test_positive_jaw_pitches_toward_up() {
        let integrator = OrientationIntegrator::default();
        let view = Vector3::new(1.0, 0.0, 0.0);

        let step = integrator.step(&view, &up(), 0, 20000, 0.016);
        assert!(step.pitch > 0.0);
        assert!(step.view.y > 0.0);
        // Summed with an identity yaw, the pitch rotation lands half way
        assert_relative_eq!(step.view.angle(&view), step.pitch / 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_turn_yaws_around_world_up_for_tilted_camera_up() {
        let integrator = OrientationIntegrator::default();
        let view = Vector3::new(1.0, 0.0, 0.0);
        let camera_up = Vector3::new(0.0, 0.0, 1.0);

        let step = integrator.step(&view, &camera_up, 30000, 0, 0.016);
        assert!(step.yaw > 0.0);
        assert_relative_eq!(step.view.y, 0.0, epsilon = 1e-12);
        assert!(step.view.z > 0.0);

        // Side still comes from the camera's up
        let side = step.side.unwrap();
        assert_relative_eq!(side.into_inner(), Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_turn_yaws_around_up() {
        let integrator = OrientationIntegrator::default();
        let view = Vector3::new(1.0, 0.0, 0.0);

        let step = integrator.step(&view, &up(), 20000, 0, 0.016);
        assert!(step.yaw > 0.0);
        assert_relative_eq!(step.view.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(step.view.angle(&view), step.yaw / 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_pitch_toward_up_suppressed_near_pole() {
        let integrator = OrientationIntegrator::default();
        let view = view_from_up(0.5);

        // ln(20000 * 0.016) / 2000 ≈ 0.00288 is below the pinned min of 1.0
        let step = integrator.step(&view, &up(), 0, 20000, 0.016);
        assert_eq!(step.pitch, 0.0);
        assert_relative_eq!(step.view, view, epsilon = 1e-12);

        // Moving away from the pole is still allowed
        let step = integrator.step(&view, &up(), 0, -20000, 0.016);
        assert!(step.pitch < 0.0);
        assert!(step.view.angle(&up()) > view.angle(&up()));
    }

    #[test]
    fn test_pitch_toward_down_suppressed_near_antipode() {
        let integrator = OrientationIntegrator::default();
        let view = view_from_up(179.5);

        let step = integrator.step(&view, &up(), 0, -20000, 0.016);
        assert_eq!(step.pitch, 0.0);

        let step = integrator.step(&view, &up(), 0, 20000, 0.016);
        assert!(step.pitch > 0.0);
    }

    #[test]
    fn test_view_stays_off_pole_under_full_jaw() {
        let integrator = OrientationIntegrator::default();
        let mut view = Vector3::new(1.0, 0.0, 0.0);

        for _ in 0..20_000 {
            view = integrator.step(&view, &up(), 0, 32767, 0.016).view;
        }

        let degrees = view.angle(&up()).to_degrees();
        assert!(degrees > 0.0 && degrees < 1.0, "ended {} degrees from up", degrees);
    }

    #[test]
    fn test_view_stays_unit_length() {
        for composition in [Composition::Additive, Composition::Multiplicative] {
            let integrator =
                OrientationIntegrator::new(AngleMapper::default(), JawLimits::default(), composition);
            let mut view = start_view();
            let mut seed: u32 = 0x1234_5678;

            for _ in 0..10_000 {
                seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                let turn = (seed >> 16) as i16;
                seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                let jaw = (seed >> 16) as i16;

                view = integrator.step(&view, &up(), turn, jaw, 0.016).view;
                assert_relative_eq!(view.norm(), 1.0, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_composition_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            composition: Composition,
        }

        let w: Wrapper = toml::from_str(r#"composition = "multiplicative""#).unwrap();
        assert_eq!(w.composition, Composition::Multiplicative);

        let w: Wrapper = toml::from_str(r#"composition = "additive""#).unwrap();
        assert_eq!(w.composition, Composition::Additive);
    }
}
