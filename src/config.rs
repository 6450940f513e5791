//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and field is optional; missing values take the defaults
//! below, which match an Xbox 360 pad on the stock `xpad` driver.

use nalgebra::Vector3;
use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::camera::translation::{AxisBinding, TRIGGER_REST_OFFSET};
use crate::camera::{
    AngleMapper, CameraState, Composition, JawLimits, OrientationIntegrator, TranslationBindings,
    TranslationIntegrator,
};
use crate::error::{JoycamError, Result};
use crate::joystick::calibration::Correction;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub rotation: RotationConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Joystick device configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DeviceConfig {
    #[serde(default = "default_device_path")]
    pub path: String,

    /// Correction applied to every axis at open, passed through untouched.
    #[serde(default)]
    pub calibration: Option<Correction>,
}

/// Starting pose and pole limits
#[derive(Debug, Deserialize, Clone)]
pub struct CameraConfig {
    #[serde(default = "default_start_position")]
    pub start_position: [f64; 3],

    #[serde(default = "default_start_up")]
    pub start_up: [f64; 3],

    /// Initial view direction; looks at the origin when absent.
    #[serde(default)]
    pub start_view: Option<[f64; 3]>,

    #[serde(default = "default_max_angle")]
    pub max_angle: f64,

    #[serde(default = "default_min_angle")]
    pub min_angle: f64,

    #[serde(default = "default_pole_limit")]
    pub pole_limit: f64,
}

/// Rotation axes and curve
#[derive(Debug, Deserialize, Clone)]
pub struct RotationConfig {
    #[serde(default = "default_turn_axis")]
    pub turn_axis: u8,

    #[serde(default = "default_jaw_axis")]
    pub jaw_axis: u8,

    #[serde(default = "default_dead_zone")]
    pub dead_zone: i16,

    #[serde(default = "default_turn_normalization")]
    pub normalization: f64,

    #[serde(default)]
    pub composition: Composition,
}

/// Translation axes
#[derive(Debug, Deserialize, Clone)]
pub struct TranslationConfig {
    #[serde(default = "default_translation_normalization")]
    pub normalization: f64,

    #[serde(default = "default_forward_binding")]
    pub forward: AxisBinding,

    #[serde(default = "default_strafe_binding")]
    pub strafe: AxisBinding,

    #[serde(default = "default_rise_binding")]
    pub rise: AxisBinding,

    #[serde(default = "default_sink_binding")]
    pub sink: AxisBinding,
}

/// Frame loop configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_tick_rate_hz")]
    pub tick_rate_hz: u32,

    #[serde(default = "default_status_interval_ticks")]
    pub status_interval_ticks: u64,
}

/// Pose trace configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,

    #[serde(default = "default_log_interval_ticks")]
    pub log_interval_ticks: u64,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Diagnostic log output
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    /// Directory for a daily rolling log file; stderr only when absent.
    #[serde(default)]
    pub file_dir: Option<String>,
}

// Default value functions
fn default_device_path() -> String { crate::joystick::device::DEFAULT_DEVICE_PATH.to_string() }

fn default_start_position() -> [f64; 3] { [-30.0, 0.0, 70.0] }
fn default_start_up() -> [f64; 3] { [0.0, 1.0, 0.0] }
fn default_max_angle() -> f64 { crate::camera::orientation::DEFAULT_MAX_ANGLE }
fn default_min_angle() -> f64 { crate::camera::orientation::DEFAULT_MIN_ANGLE }
fn default_pole_limit() -> f64 { crate::camera::orientation::DEFAULT_POLE_LIMIT }

fn default_turn_axis() -> u8 { 0 }
fn default_jaw_axis() -> u8 { 1 }
fn default_dead_zone() -> i16 { crate::camera::mapper::DEFAULT_DEAD_ZONE }
fn default_turn_normalization() -> f64 { crate::camera::mapper::DEFAULT_TURN_NORMALIZATION }

fn default_translation_normalization() -> f64 { crate::camera::translation::DEFAULT_TRANSLATION_NORMALIZATION }
fn default_forward_binding() -> AxisBinding { AxisBinding::new(4, 0, true) }
fn default_strafe_binding() -> AxisBinding { AxisBinding::new(3, 0, false) }
fn default_rise_binding() -> AxisBinding { AxisBinding::new(2, TRIGGER_REST_OFFSET, false) }
fn default_sink_binding() -> AxisBinding { AxisBinding::new(5, TRIGGER_REST_OFFSET, false) }

fn default_tick_rate_hz() -> u32 { 60 }
fn default_status_interval_ticks() -> u64 { 600 }

fn default_telemetry_enabled() -> bool { false }
fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }
fn default_log_interval_ticks() -> u64 { 6 }
fn default_log_format() -> String { "jsonl".to_string() }

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: default_device_path(),
            calibration: None,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            start_position: default_start_position(),
            start_up: default_start_up(),
            start_view: None,
            max_angle: default_max_angle(),
            min_angle: default_min_angle(),
            pole_limit: default_pole_limit(),
        }
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            turn_axis: default_turn_axis(),
            jaw_axis: default_jaw_axis(),
            dead_zone: default_dead_zone(),
            normalization: default_turn_normalization(),
            composition: Composition::default(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            normalization: default_translation_normalization(),
            forward: default_forward_binding(),
            strafe: default_strafe_binding(),
            rise: default_rise_binding(),
            sink: default_sink_binding(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: default_tick_rate_hz(),
            status_interval_ticks: default_status_interval_ticks(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_telemetry_enabled(),
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
            log_interval_ticks: default_log_interval_ticks(),
            format: default_log_format(),
        }
    }
}

fn invalid(msg: impl std::fmt::Display) -> JoycamError {
    JoycamError::Config(toml::de::Error::custom(msg))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use joycam::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.device.path.is_empty() {
            return Err(invalid("device path cannot be empty"));
        }

        let camera = &self.camera;
        for (name, v) in [("start_position", camera.start_position), ("start_up", camera.start_up)] {
            if v.iter().any(|c| !c.is_finite()) {
                return Err(invalid(format!("{} must be finite", name)));
            }
        }

        if Vector3::from(camera.start_up).norm() < 1e-9 {
            return Err(invalid("start_up must not be a zero vector"));
        }

        if let Some(view) = camera.start_view {
            let view = Vector3::from(view);
            if view.iter().any(|c| !c.is_finite()) || view.norm() < 1e-9 {
                return Err(invalid("start_view must be a finite non-zero vector"));
            }
        }

        if !(0.0..=180.0).contains(&camera.min_angle) || !(0.0..=180.0).contains(&camera.max_angle) {
            return Err(invalid("min_angle and max_angle must be between 0 and 180"));
        }

        if camera.min_angle >= camera.max_angle {
            return Err(invalid("min_angle must be less than max_angle"));
        }

        if !camera.pole_limit.is_finite() || camera.pole_limit <= 0.0 {
            return Err(invalid("pole_limit must be greater than 0"));
        }

        if self.rotation.dead_zone < 0 {
            return Err(invalid("dead_zone must be between 0 and 32767"));
        }

        for (name, value) in [
            ("rotation normalization", self.rotation.normalization),
            ("translation normalization", self.translation.normalization),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(format!("{} must be greater than 0", name)));
            }
        }

        if self.session.tick_rate_hz == 0 || self.session.tick_rate_hz > 1000 {
            return Err(invalid("tick_rate_hz must be between 1 and 1000"));
        }

        if self.session.status_interval_ticks == 0 {
            return Err(invalid("status_interval_ticks must be greater than 0"));
        }

        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(invalid("telemetry log_dir cannot be empty when enabled"));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(invalid("max_records_per_file must be greater than 0"));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(invalid("max_files_to_keep must be greater than 0"));
        }

        if self.telemetry.log_interval_ticks == 0 {
            return Err(invalid("log_interval_ticks must be greater than 0"));
        }

        if self.telemetry.format != "jsonl" {
            return Err(invalid("log format must be 'jsonl' (only supported format)"));
        }

        Ok(())
    }

    /// Initial camera pose
    pub fn camera_state(&self) -> CameraState {
        let position = Vector3::from(self.camera.start_position);
        let up = Vector3::from(self.camera.start_up);
        match self.camera.start_view {
            Some(view) => CameraState::new(position, up, Vector3::from(view)),
            None => CameraState::looking_at_origin(position, up),
        }
    }

    /// Orientation integrator for the configured curve, limits and policy
    pub fn orientation_integrator(&self) -> OrientationIntegrator {
        OrientationIntegrator::new(
            AngleMapper::new(self.rotation.dead_zone, self.rotation.normalization),
            JawLimits {
                max_angle: self.camera.max_angle,
                min_angle: self.camera.min_angle,
                pole_limit: self.camera.pole_limit,
            },
            self.rotation.composition,
        )
    }

    /// Translation integrator for the configured bindings
    pub fn translation_integrator(&self) -> TranslationIntegrator {
        let t = &self.translation;
        TranslationIntegrator::new(
            TranslationBindings {
                forward: t.forward,
                strafe: t.strafe,
                rise: t.rise,
                sink: t.sink,
            },
            t.normalization,
        )
    }
}
