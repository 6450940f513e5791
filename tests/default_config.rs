//! The shipped configuration file must load and describe the stock pad.

use joycam::camera::{Composition, TranslationBindings};
use joycam::config::Config;
use joycam::session::SessionSettings;
use nalgebra::Vector3;

fn shipped_config() -> Config {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml");
    Config::load(path).unwrap()
}

#[test]
fn test_shipped_config_matches_defaults() {
    let config = shipped_config();
    let defaults = Config::default();

    assert_eq!(config.device.path, defaults.device.path);
    assert_eq!(config.camera.start_position, defaults.camera.start_position);
    assert_eq!(config.rotation.turn_axis, 0);
    assert_eq!(config.rotation.jaw_axis, 1);
    assert_eq!(config.rotation.composition, Composition::Additive);
    assert_eq!(config.session.tick_rate_hz, defaults.session.tick_rate_hz);
    assert!(!config.telemetry.enabled);
    assert!(config.logging.file_dir.is_none());
}

#[test]
fn test_shipped_bindings_match_defaults() {
    let settings = SessionSettings::from_config(&shipped_config());
    assert_eq!(settings.translation.bindings(), &TranslationBindings::default());
}

#[test]
fn test_shipped_camera_looks_at_origin() {
    let camera = shipped_config().camera_state();
    let expected = Vector3::new(30.0, 0.0, -70.0).normalize();
    assert!((camera.view - expected).norm() < 1e-12);
    assert_eq!(camera.up, Vector3::new(0.0, 1.0, 0.0));
}
