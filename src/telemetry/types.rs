//! Pose trace record types

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::camera::CameraState;

/// One line of the pose trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseRecord {
    /// RFC 3339 wall-clock time of the sample
    pub timestamp: String,
    /// Session tick the pose was sampled after
    pub tick: u64,
    pub position: [f64; 3],
    pub view: [f64; 3],
    pub up: [f64; 3],
}

impl PoseRecord {
    /// Samples `camera` now.
    pub fn new(tick: u64, camera: &CameraState) -> Self {
        Self::at(Utc::now(), tick, camera)
    }

    /// Samples `camera` with an explicit timestamp.
    pub fn at(time: DateTime<Utc>, tick: u64, camera: &CameraState) -> Self {
        Self {
            timestamp: time.to_rfc3339_opts(SecondsFormat::Millis, true),
            tick,
            position: camera.position.into(),
            view: camera.view.into(),
            up: camera.up.into(),
        }
    }
}
