//! Camera pose consumed by the renderer.

use nalgebra::Vector3;

use super::orientation::DEGENERATE_EPSILON;

/// Camera pose.
///
/// `up` is fixed after creation, `view` is kept at unit length, and
/// `position` always equals `translation`: translation is an absolute
/// accumulator, not a velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub up: Vector3<f64>,
    pub view: Vector3<f64>,
    pub translation: Vector3<f64>,
    pub position: Vector3<f64>,
}

impl CameraState {
    /// Creates a pose at `position` looking along `view`.
    ///
    /// Both `up` and `view` are normalized; a degenerate `view` falls back
    /// to looking at the origin, then to `-Z`.
    #[must_use]
    pub fn new(position: Vector3<f64>, up: Vector3<f64>, view: Vector3<f64>) -> Self {
        let up = up
            .try_normalize(DEGENERATE_EPSILON)
            .unwrap_or_else(|| Vector3::new(0.0, 1.0, 0.0));
        let view = view
            .try_normalize(DEGENERATE_EPSILON)
            .or_else(|| (-position).try_normalize(DEGENERATE_EPSILON))
            .unwrap_or_else(|| Vector3::new(0.0, 0.0, -1.0));

        Self {
            up,
            view,
            translation: position,
            position,
        }
    }

    /// Creates a pose at `position` looking at the origin.
    #[must_use]
    pub fn looking_at_origin(position: Vector3<f64>, up: Vector3<f64>) -> Self {
        Self::new(position, up, -position)
    }

    /// Point one unit ahead of the camera, for look-at style view matrices.
    #[must_use]
    pub fn look_at_center(&self) -> Vector3<f64> {
        self.position + self.view
    }

    /// Adds to the translation accumulator and mirrors it into `position`.
    pub fn translate(&mut self, delta: &Vector3<f64>) {
        self.translation += delta;
        self.position = self.translation;
    }
}
