//! # Telemetry Module
//!
//! Handles pose trace logging to JSONL files with rotation.
//!
//! This module handles:
//! - Sampling the camera pose with a wall-clock timestamp
//! - Formatting as JSONL (JSON Lines)
//! - Writing to rotating log files
//! - Managing file rotation (max N records per file)
//! - Retaining only last M files

pub mod logger;
pub mod types;

pub use logger::PoseLogger;
pub use types::PoseRecord;
