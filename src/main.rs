//! # joycam
//!
//! Fly a 3D camera with a Linux joystick.
//!
//! Stands in for a render loop: ticks a [`Session`] at a fixed rate, logs
//! the pose periodically and optionally records a JSONL pose trace.

use anyhow::{Context, Result};
use std::path::Path;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use joycam::config::{Config, LoggingConfig};
use joycam::session::Session;
use joycam::telemetry::{PoseLogger, PoseRecord};

/// Configuration file used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main entry point for joycam
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, or `config/default.toml`)
///    - Set up logging to stderr and optionally a daily log file
///    - Open the joystick and build the session
///
/// 2. **Main Loop**
///    - Tick the session at `tick_rate_hz` with the measured frame delta
///    - Record the pose every `log_interval_ticks` when the trace is enabled
///    - Log status every `status_interval_ticks`
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Graceful Shutdown**
///    - Release the joystick
///    - Flush the pose trace
///
/// # Errors
///
/// Returns error if:
/// - The configuration cannot be read or is invalid
/// - The joystick cannot be opened
/// - The pose trace directory cannot be created
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    let _log_guard = init_logging(&config.logging)?;

    info!("joycam v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut session = Session::from_config(&config)
        .with_context(|| format!("Failed to start session on {}", config.device.path))?;
    info!("Joystick: {}", session.device_info());

    let mut recorder = if config.telemetry.enabled {
        Some(PoseLogger::new(&config.telemetry).context("Failed to start pose trace")?)
    } else {
        None
    };

    let tick_rate = config.session.tick_rate_hz;
    let mut ticker = interval(Duration::from_secs_f64(1.0 / f64::from(tick_rate)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("Starting camera loop at {}Hz", tick_rate);
    info!("Press Ctrl+C to exit");

    let mut last_frame = Instant::now();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Instant::now();
                let frame_delta = now.duration_since(last_frame).as_secs_f64();
                last_frame = now;

                let stats = session.tick(frame_delta);
                if stats.read_error {
                    debug!("Read error during tick {}", session.ticks());
                }

                let ticks = session.ticks();

                if let Some(logger) = recorder.as_mut() {
                    if ticks % config.telemetry.log_interval_ticks == 0 {
                        if let Err(e) = logger.log(&PoseRecord::new(ticks, &session.camera())) {
                            warn!("{}", e);
                        }
                    }
                }

                if ticks % config.session.status_interval_ticks == 0 {
                    let camera = session.camera();
                    info!(
                        "tick {}: position=({:.2}, {:.2}, {:.2}) view=({:.3}, {:.3}, {:.3})",
                        ticks,
                        camera.position.x, camera.position.y, camera.position.z,
                        camera.view.x, camera.view.y, camera.view.z
                    );
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total ticks: {}", session.ticks());
                break;
            }
        }
    }

    session.shutdown()?;
    if let Some(logger) = recorder.as_mut() {
        logger.flush()?;
    }

    Ok(())
}

/// Loads the configuration named on the command line.
///
/// Without an argument, `config/default.toml` is used if present and
/// built-in defaults otherwise.
fn load_config() -> Result<Config> {
    match std::env::args().nth(1) {
        Some(path) => {
            Config::load(&path).with_context(|| format!("Failed to load config from {}", path))
        }
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(DEFAULT_CONFIG_PATH)
            .with_context(|| format!("Failed to load config from {}", DEFAULT_CONFIG_PATH)),
        None => Ok(Config::default()),
    }
}

/// Installs the tracing subscriber.
///
/// The returned guard must stay alive for file output to be flushed.
fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::from_default_env().add_directive(Level::INFO.into());

    let Some(dir) = config.file_dir.as_deref() else {
        fmt().with_env_filter(filter).init();
        return Ok(None);
    };

    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create log dir {}", dir))?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "joycam.log"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();

    Ok(Some(guard))
}
