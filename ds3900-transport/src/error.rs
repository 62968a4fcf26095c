//! Transport error types

use thiserror::Error;

/// Coarse classification of a [`TransportError`]
///
/// Several variants carry extra detail (short write vs. short read, hidapi vs.
/// std I/O), but callers deciding what to do next only care about the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A precondition on the request was violated; no I/O was attempted
    InvalidArgument,
    /// The channel failed or transferred fewer bytes than required
    Io,
    /// The adapter answered with the `0xFA` "bad command" trailer
    ProtocolNak,
    /// The trailer did not match the command that was issued
    ProtocolMismatch,
    /// A receive buffer could not be allocated
    OutOfMemory,
}

/// Errors that can occur during transport operations
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Short write: sent {actual} of {expected} bytes")]
    ShortWrite { expected: usize, actual: usize },

    #[error("Short read: received {actual} of {expected} bytes")]
    ShortRead { expected: usize, actual: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // HID-specific errors
    #[error("HID error: {0}")]
    Hid(String),

    #[error("HID permission denied: {0}")]
    HidPermissionDenied(String),

    // Adapter-reported failures
    #[error("Adapter rejected command 0x{opcode:02X} (NAK)")]
    ProtocolNak { opcode: u8 },

    #[error("Invalid response: expected status 0x{expected:02X}, got 0x{actual:02X}")]
    ProtocolMismatch { expected: u8, actual: u8 },

    #[error("Out of memory allocating {requested} bytes")]
    OutOfMemory { requested: usize },
}

impl TransportError {
    /// Collapse the variant into its [`ErrorKind`]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::ShortWrite { .. }
            | Self::ShortRead { .. }
            | Self::Io(_)
            | Self::Hid(_)
            | Self::HidPermissionDenied(_) => ErrorKind::Io,
            Self::ProtocolNak { .. } => ErrorKind::ProtocolNak,
            Self::ProtocolMismatch { .. } => ErrorKind::ProtocolMismatch,
            Self::OutOfMemory { .. } => ErrorKind::OutOfMemory,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl From<hidapi::HidError> for TransportError {
    fn from(e: hidapi::HidError) -> Self {
        let msg = e.to_string();
        if msg.contains("Permission denied") || msg.contains("EPERM") {
            TransportError::HidPermissionDenied(msg)
        } else {
            TransportError::Hid(msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_groups_io_failures() {
        let short = TransportError::ShortRead {
            expected: 2,
            actual: 0,
        };
        assert_eq!(short.kind(), ErrorKind::Io);
        assert_eq!(TransportError::Hid("gone".into()).kind(), ErrorKind::Io);
        let io: TransportError = std::io::Error::other("broken pipe").into();
        assert_eq!(io.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_display_includes_opcodes() {
        let e = TransportError::ProtocolMismatch {
            expected: 0x91,
            actual: 0x90,
        };
        assert_eq!(
            e.to_string(),
            "Invalid response: expected status 0x91, got 0x90"
        );
    }
}
