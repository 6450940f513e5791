//! # Joystick Device Module
//!
//! Opens a Linux joystick device node (`/dev/input/jsN`) in non-blocking
//! mode and queries its metadata through the joydev ioctls.
//!
//! ## Queries
//!
//! | ioctl | Result |
//! |-------|--------|
//! | `JSIOCGVERSION` | Driver version (`u32`, `0xMMmmpp`) |
//! | `JSIOCGAXES` | Axis count (`u8`) |
//! | `JSIOCGBUTTONS` | Button count (`u8`) |
//! | `JSIOCGNAME(len)` | Device name |
//! | `JSIOCSCORR` | Set correction coefficients |

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use tracing::{debug, info, warn};

use super::calibration::CorrectionTable;
use super::event::{JoystickEvent, JS_EVENT_SIZE};
use super::source::EventSource;
use crate::error::{JoycamError, Result};

/// Default device node of the first joystick.
pub const DEFAULT_DEVICE_PATH: &str = "/dev/input/js0";

/// Buffer length used for the name query.
pub const JOY_NAME_LENGTH: usize = 80;

/// Name reported when the driver does not answer the name query.
pub const UNKNOWN_DEVICE_NAME: &str = "Unknown Device";

mod ioctl {
    use crate::joystick::calibration::RawCorrection;

    nix::ioctl_read!(js_get_version, b'j', 0x01, u32);
    nix::ioctl_read!(js_get_axes, b'j', 0x11, u8);
    nix::ioctl_read!(js_get_buttons, b'j', 0x12, u8);
    nix::ioctl_read_buf!(js_get_name, b'j', 0x13, u8);
    nix::ioctl_write_ptr!(js_set_correction, b'j', 0x21, RawCorrection);
}

/// Metadata discovered at open time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Human-readable device name.
    pub name: String,
    /// Driver version, `0xMMmmpp`.
    pub driver_version: u32,
    /// Number of axes.
    pub axis_count: u8,
    /// Number of buttons.
    pub button_count: u8,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            name: UNKNOWN_DEVICE_NAME.to_string(),
            driver_version: 0,
            axis_count: 0,
            button_count: 0,
        }
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (driver {}.{}.{}, {} axes, {} buttons)",
            self.name,
            self.driver_version >> 16,
            (self.driver_version >> 8) & 0xff,
            self.driver_version & 0xff,
            self.axis_count,
            self.button_count
        )
    }
}

/// Open joystick device handle.
pub struct JoystickDevice {
    file: Option<File>,
    device_path: String,
    info: DeviceInfo,
}

impl fmt::Debug for JoystickDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoystickDevice")
            .field("device_path", &self.device_path)
            .field("info", &self.info)
            .field("open", &self.file.is_some())
            .finish()
    }
}

impl JoystickDevice {
    /// Opens a joystick device node for non-blocking reads.
    ///
    /// Metadata queries that fail are logged and replaced by defaults; only
    /// failing to open the node itself is an error.
    ///
    /// # Errors
    ///
    /// Returns [`JoycamError::DeviceOpen`] if the path does not exist, is not
    /// readable, or the driver does not respond.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use joycam::joystick::device::JoystickDevice;
    ///
    /// let device = JoystickDevice::open("/dev/input/js0")?;
    /// println!("Opened: {}", device.info());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let device_path = path.to_string_lossy().to_string();

        debug!("Opening joystick device: {}", device_path);

        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)
            .map_err(|source| JoycamError::DeviceOpen {
                path: device_path.clone(),
                source,
            })?;

        let info = query_info(&file);
        info!("Opened joystick at {}: {}", device_path, info);

        Ok(Self {
            file: Some(file),
            device_path,
            info,
        })
    }

    /// Path this device was opened from.
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Metadata discovered at open time.
    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    /// Whether the handle is still open.
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Hands correction coefficients to the driver.
    ///
    /// # Errors
    ///
    /// Returns [`JoycamError::Calibration`] if the device is closed, the
    /// table does not cover every axis, or the driver rejects it.
    pub fn set_calibration(&self, table: &CorrectionTable) -> Result<()> {
        let file = self
            .file
            .as_ref()
            .ok_or_else(|| JoycamError::Calibration("device is closed".to_string()))?;

        if table.len() != usize::from(self.info.axis_count) {
            return Err(JoycamError::Calibration(format!(
                "table covers {} axes, device has {}",
                table.len(),
                self.info.axis_count
            )));
        }

        if table.is_empty() {
            return Ok(());
        }

        for (axis, entry) in table.entries().iter().enumerate() {
            debug!(
                "Correction axis {}: type={} prec={} coef={:?}",
                axis, entry.kind, entry.prec, &entry.coef[..4]
            );
        }

        // SAFETY: the driver reads one `js_corr` per reported axis and the
        // table length was checked against the axis count above.
        unsafe { ioctl::js_set_correction(file.as_raw_fd(), table.entries().as_ptr()) }
            .map_err(|e| JoycamError::Calibration(e.to_string()))?;

        info!("Applied correction coefficients to {} axes", table.len());
        Ok(())
    }

    /// Releases the device handle. Safe to call more than once.
    pub fn close(&mut self) {
        if self.file.take().is_some() {
            info!("Closed joystick at {}", self.device_path);
        }
    }
}

impl EventSource for JoystickDevice {
    fn next_event(&mut self) -> io::Result<Option<JoystickEvent>> {
        let Some(file) = self.file.as_mut() else {
            return Ok(None);
        };

        let mut raw = [0u8; JS_EVENT_SIZE];
        loop {
            match file.read(&mut raw) {
                Ok(n) if n == JS_EVENT_SIZE => return Ok(Some(JoystickEvent::from_bytes(&raw))),
                Ok(0) => return Ok(None),
                Ok(n) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("short event read: {} of {} bytes", n, JS_EVENT_SIZE),
                    ))
                }
                Err(e) => match classify_read_error(e) {
                    ReadOutcome::Retry => {}
                    ReadOutcome::Empty => return Ok(None),
                    ReadOutcome::Failed(e) => return Err(e),
                },
            }
        }
    }

    fn close(&mut self) {
        JoystickDevice::close(self);
    }
}

/// What a failed read means for the drain.
#[derive(Debug)]
enum ReadOutcome {
    /// Signal arrived before any data; read again.
    Retry,
    /// Queue is empty.
    Empty,
    Failed(io::Error),
}

fn classify_read_error(e: io::Error) -> ReadOutcome {
    match e.kind() {
        io::ErrorKind::Interrupted => ReadOutcome::Retry,
        io::ErrorKind::WouldBlock => ReadOutcome::Empty,
        _ => ReadOutcome::Failed(e),
    }
}

impl Drop for JoystickDevice {
    fn drop(&mut self) {
        self.close();
    }
}

fn query_info(file: &File) -> DeviceInfo {
    let fd = file.as_raw_fd();
    let mut info = DeviceInfo::default();

    let mut name = [0u8; JOY_NAME_LENGTH];
    // SAFETY: the name query writes at most `name.len()` bytes.
    match unsafe { ioctl::js_get_name(fd, &mut name) } {
        Ok(_) => info.name = parse_name(&name),
        Err(e) => warn!("{}", JoycamError::DeviceInfo(format!("name: {}", e))),
    }

    let mut axes: u8 = 0;
    // SAFETY: writes a single byte into `axes`.
    match unsafe { ioctl::js_get_axes(fd, &mut axes) } {
        Ok(_) => info.axis_count = axes,
        Err(e) => warn!("{}", JoycamError::DeviceInfo(format!("axis count: {}", e))),
    }

    let mut buttons: u8 = 0;
    // SAFETY: writes a single byte into `buttons`.
    match unsafe { ioctl::js_get_buttons(fd, &mut buttons) } {
        Ok(_) => info.button_count = buttons,
        Err(e) => warn!("{}", JoycamError::DeviceInfo(format!("button count: {}", e))),
    }

    let mut version: u32 = 0;
    // SAFETY: writes a u32 into `version`.
    match unsafe { ioctl::js_get_version(fd, &mut version) } {
        Ok(_) => info.driver_version = version,
        Err(e) => warn!("{}", JoycamError::DeviceInfo(format!("driver version: {}", e))),
    }

    info
}

fn parse_name(buffer: &[u8]) -> String {
    let end = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
    let name = String::from_utf8_lossy(&buffer[..end]).trim().to_string();
    if name.is_empty() {
        UNKNOWN_DEVICE_NAME.to_string()
    } else {
        name
    }
}
