//! # Camera Module
//!
//! Derives a camera pose from joystick axes.
//!
//! This module handles:
//! - Mapping stick deflection to per-frame rotation angles
//! - Rotating the view vector with pole clamping
//! - Accumulating translation from four axes
//! - Holding the pose read by the renderer

pub mod mapper;
pub mod orientation;
pub mod state;
pub mod translation;

pub use mapper::{axis_to_angle, AngleMapper};
pub use orientation::{Composition, JawLimits, OrientationIntegrator, OrientationStep};
pub use state::CameraState;
pub use translation::{AxisBinding, TranslationBindings, TranslationIntegrator};
