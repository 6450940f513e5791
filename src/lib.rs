//! # joycam Library
//!
//! Fly a 3D camera with a Linux joystick.
//!
//! This library reads events from a joydev device (`/dev/input/jsN`), keeps
//! the latest value of every axis and button, and turns stick deflection
//! into a camera pose that a render loop can read every frame.

pub mod camera;
pub mod config;
pub mod error;
pub mod joystick;
pub mod session;
pub mod telemetry;
