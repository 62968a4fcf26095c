//! Protocol constants for DS3900 adapter communication

/// HID report number used for every request (unnumbered reports)
pub const REPORT_ID: u8 = 0x00;

/// Largest response the adapter can produce, excluding the status trailer
pub const MAX_RESPONSE_LEN: usize = 16;

/// Receive buffer capacity: up to 16 data bytes plus the status trailer
pub const RX_BUFFER_SIZE: usize = MAX_RESPONSE_LEN + 1;

/// Fixed request header: report ID, opcode, data byte
pub const HEADER_SIZE: usize = 3;

/// Status trailer value signalling a rejected command
pub const RSP_BAD: u8 = 0xFA;

/// Highest 7-bit SMBus target address
pub const MAX_DEVICE_ADDRESS: u8 = 0x7F;

/// Widest packet read/write the adapter supports
pub const MAX_PACKET_WIDTH: u8 = 16;

/// Data byte for a 2-wire read-byte: NACK after the byte (last byte)
pub const READ_BYTE_NACK: u8 = 0x00;
/// Data byte for a 2-wire read-byte: ACK after the byte (more to follow)
pub const READ_BYTE_ACK: u8 = 0x01;

/// Adapter opcodes (request side)
pub mod opcode {
    pub const PACKET_WRITE: u8 = 0x80;
    pub const PACKET_READ: u8 = 0x90;
    pub const TWO_WIRE_START: u8 = 0xA0;
    pub const TWO_WIRE_WRITE_BYTE: u8 = 0xA1;
    pub const TWO_WIRE_READ_BYTE: u8 = 0xA2;
    pub const TWO_WIRE_STOP: u8 = 0xA3;
    pub const TWO_WIRE_RECOVER: u8 = 0xA4;
    pub const DEVICE_ADDRESS: u8 = 0xA5;
    pub const READ_REVISION: u8 = 0xC2;

    /// High nibble identifying an opcode family
    pub const FAMILY_MASK: u8 = 0xF0;
    /// Low nibble carrying `width - 1` on packet operations
    pub const WIDTH_MASK: u8 = 0x0F;

    /// Packet writes carry their payload after the header
    pub fn is_packet_write(op: u8) -> bool {
        op & FAMILY_MASK == PACKET_WRITE
    }

    /// Packet reads return `width` data bytes before the trailer
    pub fn is_packet_read(op: u8) -> bool {
        op & FAMILY_MASK == PACKET_READ
    }

    /// Get human-readable name for a request opcode
    pub fn name(op: u8) -> &'static str {
        match op {
            op if is_packet_write(op) => "PACKET_WRITE",
            op if is_packet_read(op) => "PACKET_READ",
            TWO_WIRE_START => "2WIRE_START",
            TWO_WIRE_WRITE_BYTE => "2WIRE_WRITE_BYTE",
            TWO_WIRE_READ_BYTE => "2WIRE_READ_BYTE",
            TWO_WIRE_STOP => "2WIRE_STOP",
            TWO_WIRE_RECOVER => "2WIRE_RECOVER",
            DEVICE_ADDRESS => "DEVICE_ADDRESS",
            READ_REVISION => "READ_REVISION",
            _ => "UNKNOWN",
        }
    }
}

/// Adapter status trailers (response side)
pub mod status {
    pub const PACKET_WRITE: u8 = 0x80;
    pub const PACKET_READ: u8 = 0x90;
    pub const TWO_WIRE_START: u8 = 0xB0;
    pub const TWO_WIRE_WRITE_BYTE: u8 = 0xB1;
    pub const TWO_WIRE_READ_BYTE: u8 = 0xB2;
    pub const TWO_WIRE_STOP: u8 = 0xB3;
    pub const TWO_WIRE_RECOVER: u8 = 0xB4;
    pub const DEVICE_ADDRESS: u8 = 0xB5;
    pub const READ_REVISION: u8 = 0xD2;

    /// Get human-readable name for a status trailer
    pub fn name(status: u8) -> &'static str {
        match status {
            super::RSP_BAD => "BAD",
            s if s & 0xF0 == PACKET_WRITE => "PACKET_WRITE_OK",
            s if s & 0xF0 == PACKET_READ => "PACKET_READ_OK",
            TWO_WIRE_START => "2WIRE_START_OK",
            TWO_WIRE_WRITE_BYTE => "2WIRE_WRITE_BYTE_OK",
            TWO_WIRE_READ_BYTE => "2WIRE_READ_BYTE_OK",
            TWO_WIRE_STOP => "2WIRE_STOP_OK",
            TWO_WIRE_RECOVER => "2WIRE_RECOVER_OK",
            DEVICE_ADDRESS => "DEVICE_ADDRESS_OK",
            READ_REVISION => "READ_REVISION_OK",
            _ => "UNKNOWN",
        }
    }
}
