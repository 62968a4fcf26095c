//! HID channel backends
//!
//! Both backends open a device node the caller names (e.g. `/dev/hidraw3`);
//! neither enumerates devices.

use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use hidapi::{HidApi, HidDevice};
use tracing::debug;

use crate::channel::Channel;
use crate::error::TransportError;

/// Channel backed by hidapi, opened by device path
///
/// Reads block indefinitely unless a read timeout is configured. A timed-out
/// read returns zero bytes, which the framer reports as a short read.
pub struct HidChannel {
    device: HidDevice,
    read_timeout: Option<Duration>,
}

impl HidChannel {
    /// Open the HID device at `path` without enumerating the bus
    pub fn open(path: &Path, read_timeout: Option<Duration>) -> Result<Self, TransportError> {
        let api = HidApi::new_without_enumerate()?;
        let c_path = CString::new(path.as_os_str().as_encoded_bytes()).map_err(|_| {
            TransportError::InvalidArgument(format!("device path {} contains NUL", path.display()))
        })?;
        let device = api.open_path(&c_path)?;
        // Transfers rely on blocking reads
        device.set_blocking_mode(true)?;
        debug!("Opened HID device {} (timeout {:?})", path.display(), read_timeout);
        Ok(Self::new(device, read_timeout))
    }

    /// Wrap an already-open hidapi device
    pub fn new(device: HidDevice, read_timeout: Option<Duration>) -> Self {
        Self {
            device,
            read_timeout,
        }
    }
}

impl Channel for HidChannel {
    fn write(&mut self, frame: &[u8]) -> Result<usize, TransportError> {
        Ok(self.device.write(frame)?)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let n = match self.read_timeout {
            Some(timeout) => {
                let ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
                self.device.read_timeout(buf, ms)?
            }
            None => self.device.read(buf)?,
        };
        Ok(n)
    }
}

/// Channel backed by a raw hidraw character device
///
/// Equivalent to `open(path, O_RDWR)` followed by plain `write`/`read` calls.
pub struct HidrawChannel {
    file: File,
}

impl HidrawChannel {
    /// Open the hidraw node at `path` for reading and writing
    pub fn open(path: &Path) -> Result<Self, TransportError> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        debug!("Opened hidraw node {}", path.display());
        Ok(Self { file })
    }
}

impl Channel for HidrawChannel {
    fn write(&mut self, frame: &[u8]) -> Result<usize, TransportError> {
        Ok(self.file.write(frame)?)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        Ok(self.file.read(buf)?)
    }
}
