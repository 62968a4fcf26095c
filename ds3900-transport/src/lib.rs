//! Transport layer for DS3900-class USB-HID I2C/SMBus bridge adapters
//!
//! This crate turns adapter commands into HID reports and builds SMBus
//! operations on top of them:
//!
//! - [`framer`]: one request frame out, one validated response frame in
//! - [`command`]: the fixed table of adapter command descriptors
//! - [`smbus`]: byte/word register access and 2-wire block reads
//! - [`hid`]: hidapi and raw hidraw channel backends
//!
//! The `test-util` feature exposes [`emulator`], in-memory adapters for tests
//! of this crate and the crates built on it.
//!
//! Everything is synchronous and blocking. A channel must not be shared
//! between concurrent callers.

pub mod channel;
pub mod command;
#[cfg(any(test, feature = "test-util"))]
pub mod emulator;
pub mod error;
pub mod framer;
pub mod monitor;
pub mod protocol;
pub mod smbus;

mod hid;

pub use channel::{BoxedChannel, Channel};
pub use command::CommandDescriptor;
pub use error::{ErrorKind, TransportError};
pub use framer::{
    execute, read_revision, set_device_address, transfer, Revision, TransferRequest,
};
pub use hid::{HidChannel, HidrawChannel};
pub use monitor::{FrameFilter, MonitorChannel, MonitorConfig};
pub use smbus::{read_block, read_byte, read_word, write_byte, write_word};
