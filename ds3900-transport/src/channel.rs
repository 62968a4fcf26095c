//! The byte channel the framer talks through
//!
//! A channel moves exactly one HID report per call in each direction. It does
//! no buffering: every transfer is a fresh write followed by a fresh read.

use crate::error::TransportError;

/// Blocking, report-oriented duplex channel to the adapter
///
/// Implementations must not buffer across calls. Callers own the channel and
/// are responsible for serializing access to it.
pub trait Channel {
    /// Write one complete output report, returning the number of bytes sent
    fn write(&mut self, frame: &[u8]) -> Result<usize, TransportError>;

    /// Read one input report into `buf`, returning the number of bytes received
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;
}

impl<C: Channel + ?Sized> Channel for &mut C {
    fn write(&mut self, frame: &[u8]) -> Result<usize, TransportError> {
        (**self).write(frame)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        (**self).read(buf)
    }
}

impl<C: Channel + ?Sized> Channel for Box<C> {
    fn write(&mut self, frame: &[u8]) -> Result<usize, TransportError> {
        (**self).write(frame)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        (**self).read(buf)
    }
}

/// Type alias for a boxed channel
pub type BoxedChannel = Box<dyn Channel>;
