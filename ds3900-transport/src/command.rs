//! Adapter command descriptors
//!
//! Every adapter operation is described by an immutable [`CommandDescriptor`]:
//! the opcode and data byte that go out, and the status trailer and response
//! length that must come back. Operations that take parameters (register,
//! width, bus byte) derive a modified copy from one of the table constants
//! below; the constants themselves are never mutated.

use crate::error::TransportError;
use crate::protocol::{self, opcode, status, MAX_PACKET_WIDTH};

/// One adapter operation: request encoding plus expected response shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDescriptor {
    request_opcode: u8,
    request_payload_byte: u8,
    expected_response_opcode: u8,
    expected_response_length: u8,
}

impl CommandDescriptor {
    /// Build a descriptor from raw values
    pub const fn new(
        request_opcode: u8,
        request_payload_byte: u8,
        expected_response_opcode: u8,
        expected_response_length: u8,
    ) -> Self {
        Self {
            request_opcode,
            request_payload_byte,
            expected_response_opcode,
            expected_response_length,
        }
    }

    pub fn request_opcode(&self) -> u8 {
        self.request_opcode
    }

    pub fn request_payload_byte(&self) -> u8 {
        self.request_payload_byte
    }

    pub fn expected_response_opcode(&self) -> u8 {
        self.expected_response_opcode
    }

    /// Response length in bytes, including the status trailer
    pub fn expected_response_length(&self) -> usize {
        self.expected_response_length as usize
    }

    /// Whether request payload bytes follow the header on the wire
    pub fn is_packet_write(&self) -> bool {
        opcode::is_packet_write(self.request_opcode)
    }

    pub fn is_packet_read(&self) -> bool {
        opcode::is_packet_read(self.request_opcode)
    }

    /// Human-readable opcode name
    pub fn name(&self) -> &'static str {
        opcode::name(self.request_opcode)
    }

    /// Copy of this descriptor with a different request data byte
    pub const fn with_data(mut self, data: u8) -> Self {
        self.request_payload_byte = data;
        self
    }

    /// Parameterize a packet command for `register` and `width` data bytes
    ///
    /// The opcode and status low nibbles carry `width - 1`. For the packet-read
    /// family the response grows to `width` data bytes plus the trailer; packet
    /// writes keep a trailer-only response. A 16-byte read derives a 17-byte
    /// response, which [`transfer`](crate::transfer) refuses.
    pub fn packet_op(mut self, register: u8, width: u8) -> Result<Self, TransportError> {
        if !(1..=MAX_PACKET_WIDTH).contains(&width) {
            return Err(TransportError::invalid(format!(
                "packet width {width} out of range (1-{MAX_PACKET_WIDTH})"
            )));
        }
        let nibble = (width - 1) & opcode::WIDTH_MASK;
        self.request_opcode |= nibble;
        self.expected_response_opcode |= nibble;
        self.request_payload_byte = register;
        if self.is_packet_read() {
            self.expected_response_length = width + 1;
        }
        Ok(self)
    }
}

// =============================================================================
// Command table
// =============================================================================

pub const PACKET_WRITE: CommandDescriptor =
    CommandDescriptor::new(opcode::PACKET_WRITE, 0x00, status::PACKET_WRITE, 1);

pub const PACKET_READ: CommandDescriptor =
    CommandDescriptor::new(opcode::PACKET_READ, 0x00, status::PACKET_READ, 1);

pub const TWO_WIRE_START: CommandDescriptor =
    CommandDescriptor::new(opcode::TWO_WIRE_START, 0x00, status::TWO_WIRE_START, 1);

/// Repeated start; encoded identically to a plain start
pub const TWO_WIRE_START_REPEAT: CommandDescriptor = TWO_WIRE_START;

pub const TWO_WIRE_WRITE_BYTE: CommandDescriptor = CommandDescriptor::new(
    opcode::TWO_WIRE_WRITE_BYTE,
    0x00,
    status::TWO_WIRE_WRITE_BYTE,
    1,
);

/// Reads one byte off the bus; the data byte selects ACK or NACK afterwards
pub const TWO_WIRE_READ_BYTE: CommandDescriptor = CommandDescriptor::new(
    opcode::TWO_WIRE_READ_BYTE,
    protocol::READ_BYTE_NACK,
    status::TWO_WIRE_READ_BYTE,
    2,
);

pub const TWO_WIRE_STOP: CommandDescriptor =
    CommandDescriptor::new(opcode::TWO_WIRE_STOP, 0x00, status::TWO_WIRE_STOP, 1);

pub const TWO_WIRE_RECOVER: CommandDescriptor =
    CommandDescriptor::new(opcode::TWO_WIRE_RECOVER, 0x00, status::TWO_WIRE_RECOVER, 1);

/// Sets the 7-bit target address used by subsequent packet operations
pub const DEVICE_ADDRESS: CommandDescriptor =
    CommandDescriptor::new(opcode::DEVICE_ADDRESS, 0x00, status::DEVICE_ADDRESS, 1);

/// Returns major and minor revision bytes before the trailer
pub const READ_REVISION: CommandDescriptor =
    CommandDescriptor::new(opcode::READ_REVISION, 0x00, status::READ_REVISION, 3);

/// Every fixed descriptor, for table-wide checks
pub const ALL: [CommandDescriptor; 10] = [
    PACKET_WRITE,
    PACKET_READ,
    TWO_WIRE_START,
    TWO_WIRE_START_REPEAT,
    TWO_WIRE_WRITE_BYTE,
    TWO_WIRE_READ_BYTE,
    TWO_WIRE_STOP,
    TWO_WIRE_RECOVER,
    DEVICE_ADDRESS,
    READ_REVISION,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::protocol::MAX_RESPONSE_LEN;

    #[test]
    fn test_table_response_lengths_in_range() {
        for cmd in ALL {
            let len = cmd.expected_response_length();
            assert!((1..=MAX_RESPONSE_LEN).contains(&len), "{cmd:?}");
        }
    }

    #[test]
    fn test_packet_read_width_derivation() {
        for width in 1..=MAX_PACKET_WIDTH {
            let cmd = PACKET_READ.packet_op(0x3A, width).unwrap();
            assert_eq!(cmd.expected_response_length(), width as usize + 1);
            assert_eq!(cmd.request_opcode() & 0x0F, width - 1);
            assert_eq!(cmd.request_opcode() & 0xF0, 0x90);
            assert_eq!(cmd.expected_response_opcode(), 0x90 | (width - 1));
            assert_eq!(cmd.request_payload_byte(), 0x3A);
        }
    }

    #[test]
    fn test_packet_write_keeps_trailer_only_response() {
        let cmd = PACKET_WRITE.packet_op(0x3B, 2).unwrap();
        assert_eq!(cmd.request_opcode(), 0x81);
        assert_eq!(cmd.expected_response_opcode(), 0x81);
        assert_eq!(cmd.expected_response_length(), 1);
        assert!(cmd.is_packet_write());
    }

    #[test]
    fn test_packet_op_rejects_bad_width() {
        let err = PACKET_READ.packet_op(0, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = PACKET_WRITE.packet_op(0, 17).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_with_data_leaves_table_untouched() {
        let cmd = TWO_WIRE_WRITE_BYTE.with_data(0xA4);
        assert_eq!(cmd.request_payload_byte(), 0xA4);
        assert_eq!(TWO_WIRE_WRITE_BYTE.request_payload_byte(), 0x00);
    }
}
