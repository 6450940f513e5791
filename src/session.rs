//! # Session
//!
//! One explicit object owning the device, its sample cache and the camera.
//!
//! This module handles:
//! - Opening the device and sizing the cache from its reported counts
//! - Per-frame drain, orientation and translation integration
//! - Exposing the pose to the render loop
//! - Releasing the device on shutdown

use nalgebra::Vector3;
use tracing::{debug, info, warn};

use crate::camera::{CameraState, OrientationIntegrator, TranslationIntegrator};
use crate::config::Config;
use crate::error::Result;
use crate::joystick::calibration::CorrectionTable;
use crate::joystick::{DeviceInfo, DeviceState, DrainStats, EventSource, JoystickDevice};

/// Default axis driving yaw (left stick X on xpad).
pub const DEFAULT_TURN_AXIS: u8 = 0;

/// Default axis driving pitch (left stick Y on xpad).
pub const DEFAULT_JAW_AXIS: u8 = 1;

/// Everything a session needs besides the event source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    pub turn_axis: u8,
    pub jaw_axis: u8,
    pub orientation: OrientationIntegrator,
    pub translation: TranslationIntegrator,
    pub camera: CameraState,
}

impl SessionSettings {
    /// Default curve, limits and bindings, looking from `start_position`
    /// toward the origin.
    #[must_use]
    pub fn new(start_position: Vector3<f64>, start_up: Vector3<f64>) -> Self {
        Self {
            turn_axis: DEFAULT_TURN_AXIS,
            jaw_axis: DEFAULT_JAW_AXIS,
            orientation: OrientationIntegrator::default(),
            translation: TranslationIntegrator::default(),
            camera: CameraState::looking_at_origin(start_position, start_up),
        }
    }

    /// Settings described by a loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            turn_axis: config.rotation.turn_axis,
            jaw_axis: config.rotation.jaw_axis,
            orientation: config.orientation_integrator(),
            translation: config.translation_integrator(),
            camera: config.camera_state(),
        }
    }
}

/// A running joystick camera.
///
/// Owned by the render loop; call [`Session::tick`] once per frame and read
/// the pose afterwards.
#[derive(Debug)]
pub struct Session<S: EventSource = JoystickDevice> {
    source: Option<S>,
    info: DeviceInfo,
    state: DeviceState,
    camera: CameraState,
    orientation: OrientationIntegrator,
    translation: TranslationIntegrator,
    turn_axis: u8,
    jaw_axis: u8,
    ticks: u64,
}

impl Session<JoystickDevice> {
    /// Opens `device_path` and starts a camera at `start_position`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::JoycamError::DeviceOpen`] if the device cannot
    /// be opened, or [`crate::error::JoycamError::Allocation`] if the sample
    /// cache cannot be sized.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use joycam::session::Session;
    /// use nalgebra::Vector3;
    ///
    /// let mut session = Session::init(
    ///     "/dev/input/js0",
    ///     Vector3::new(-30.0, 0.0, 70.0),
    ///     Vector3::new(0.0, 1.0, 0.0),
    /// )?;
    /// session.tick(0.016);
    /// println!("camera at {:?}", session.position());
    /// session.shutdown()?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn init(
        device_path: &str,
        start_position: Vector3<f64>,
        start_up: Vector3<f64>,
    ) -> Result<Self> {
        let device = JoystickDevice::open(device_path)?;
        let info = device.info().clone();
        Self::with_source(device, info, SessionSettings::new(start_position, start_up))
    }

    /// Opens the configured device, applies any configured calibration and
    /// builds the camera from the configuration.
    ///
    /// A rejected calibration is logged and the session continues without it.
    ///
    /// # Errors
    ///
    /// Same as [`Session::init`].
    pub fn from_config(config: &Config) -> Result<Self> {
        let device = JoystickDevice::open(&config.device.path)?;
        let info = device.info().clone();

        if let Some(correction) = config.device.calibration {
            let table = CorrectionTable::uniform(info.axis_count, correction);
            if let Err(e) = device.set_calibration(&table) {
                warn!("{}", e);
            }
        }

        Self::with_source(device, info, SessionSettings::from_config(config))
    }
}

impl<S: EventSource> Session<S> {
    /// Builds a session around any event source.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::JoycamError::Allocation`] if the sample cache
    /// cannot be sized.
    pub fn with_source(source: S, info: DeviceInfo, settings: SessionSettings) -> Result<Self> {
        let state = DeviceState::new(info.axis_count, info.button_count)?;

        let bound = [settings.turn_axis, settings.jaw_axis]
            .into_iter()
            .chain(settings.translation.bindings().axes());
        for axis in bound {
            if usize::from(axis) >= state.axis_count() {
                warn!(
                    "Axis {} is bound but {} only reports {} axes; it will read as 0",
                    axis,
                    info.name,
                    state.axis_count()
                );
            }
        }

        info!(
            "Session started at {:?} looking along {:?}",
            settings.camera.position, settings.camera.view
        );

        Ok(Self {
            source: Some(source),
            info,
            state,
            camera: settings.camera,
            orientation: settings.orientation,
            translation: settings.translation,
            turn_axis: settings.turn_axis,
            jaw_axis: settings.jaw_axis,
            ticks: 0,
        })
    }

    /// Advances the camera by one frame.
    ///
    /// Drains every queued event, then rotates the view from the turn and
    /// jaw axes and moves the camera from the translation axes.
    /// `frame_delta_seconds` scales rotation only. After [`Session::shutdown`]
    /// this does nothing.
    pub fn tick(&mut self, frame_delta_seconds: f64) -> DrainStats {
        let Some(source) = self.source.as_mut() else {
            return DrainStats::default();
        };

        let stats = self.state.drain(source);
        self.ticks += 1;

        let state = &self.state;
        let read_axis = |axis: u8| state.axis(usize::from(axis)).unwrap_or(0);

        let step = self.orientation.step(
            &self.camera.view,
            &self.camera.up,
            read_axis(self.turn_axis),
            read_axis(self.jaw_axis),
            frame_delta_seconds,
        );
        self.camera.view = step.view;

        let delta = self
            .translation
            .delta(&self.camera.view, step.side.as_ref(), read_axis);
        self.camera.translate(&delta);

        if step.pitch != 0.0 || step.yaw != 0.0 {
            debug!(
                "tick {}: pitch={:.6} yaw={:.6} move={:?}",
                self.ticks, step.pitch, step.yaw, delta
            );
        }

        stats
    }

    /// Camera position.
    pub fn position(&self) -> Vector3<f64> {
        self.camera.position
    }

    /// Camera up vector.
    pub fn up(&self) -> Vector3<f64> {
        self.camera.up
    }

    /// Unit view direction.
    pub fn view(&self) -> Vector3<f64> {
        self.camera.view
    }

    /// Point one unit along the view, for look-at matrices.
    pub fn look_at_center(&self) -> Vector3<f64> {
        self.camera.look_at_center()
    }

    /// Copy of the whole pose.
    pub fn camera(&self) -> CameraState {
        self.camera
    }

    /// Latest value of an axis.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::JoycamError::AxisIndex`] past the device's
    /// axis count.
    pub fn axis(&self, index: usize) -> Result<i16> {
        self.state.axis(index)
    }

    /// Latest value of a button.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::JoycamError::ButtonIndex`] past the device's
    /// button count.
    pub fn button(&self, index: usize) -> Result<i16> {
        self.state.button(index)
    }

    /// Device metadata discovered at open.
    pub fn device_info(&self) -> &DeviceInfo {
        &self.info
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Whether the event source is still held.
    pub fn is_active(&self) -> bool {
        self.source.is_some()
    }

    /// Releases the device. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Currently infallible; the signature leaves room for sources whose
    /// release can fail.
    pub fn shutdown(&mut self) -> Result<()> {
        if let Some(mut source) = self.source.take() {
            source.close();
            info!("Session shut down after {} ticks", self.ticks);
        }
        Ok(())
    }
}
