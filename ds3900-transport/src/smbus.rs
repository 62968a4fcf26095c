//! SMBus operations built on framed adapter transfers
//!
//! Byte and word access use the adapter's packet commands against the target
//! selected with [`set_device_address`](crate::set_device_address). Block reads
//! drive the bus directly with 2-wire commands:
//!
//! ```text
//! START | addr+W | command | START | addr+R | count (ACK) | data.. (ACK, last NACK) | STOP
//! ```
//!
//! Any failure during a block read issues a best-effort bus recover before the
//! original error is returned.

use tracing::{trace, warn};

use crate::channel::Channel;
use crate::command::{
    PACKET_READ, PACKET_WRITE, TWO_WIRE_READ_BYTE, TWO_WIRE_RECOVER, TWO_WIRE_START,
    TWO_WIRE_START_REPEAT, TWO_WIRE_STOP, TWO_WIRE_WRITE_BYTE,
};
use crate::error::TransportError;
use crate::framer::{check_device_address, execute, transfer, TransferRequest};
use crate::protocol::{READ_BYTE_ACK, READ_BYTE_NACK};

/// Read a byte register
pub fn read_byte<C: Channel + ?Sized>(channel: &mut C, register: u8) -> Result<u8, TransportError> {
    let cmd = PACKET_READ.packet_op(register, 1)?;
    let reply = transfer(channel, &TransferRequest::new(cmd).reply_len(1))?;
    Ok(reply[0])
}

/// Write a byte register
pub fn write_byte<C: Channel + ?Sized>(
    channel: &mut C,
    register: u8,
    value: u8,
) -> Result<(), TransportError> {
    let cmd = PACKET_WRITE.packet_op(register, 1)?;
    transfer(channel, &TransferRequest::new(cmd).payload(&[value]))?;
    Ok(())
}

/// Read a little-endian word register
pub fn read_word<C: Channel + ?Sized>(channel: &mut C, register: u8) -> Result<u16, TransportError> {
    let cmd = PACKET_READ.packet_op(register, 2)?;
    let reply = transfer(channel, &TransferRequest::new(cmd).reply_len(2))?;
    Ok(u16::from_le_bytes([reply[0], reply[1]]))
}

/// Write a little-endian word register
pub fn write_word<C: Channel + ?Sized>(
    channel: &mut C,
    register: u8,
    value: u16,
) -> Result<(), TransportError> {
    let cmd = PACKET_WRITE.packet_op(register, 2)?;
    let payload = value.to_le_bytes();
    transfer(channel, &TransferRequest::new(cmd).payload(&payload))?;
    Ok(())
}

/// SMBus block read of `register` on the 7-bit target `device_address`
///
/// Returns exactly as many bytes as the target's count byte announced.
///
/// Hardware reports show every returned data byte as `0xFF`. The bus sequence
/// here matches the SMBus block-read definition (ACK all but the final byte,
/// NACK the final byte) but has not been validated against a logic analyser;
/// see the `block_read_conformance` hardware test before changing the ACK/NACK
/// polarity.
pub fn read_block<C: Channel + ?Sized>(
    channel: &mut C,
    device_address: u8,
    register: u8,
) -> Result<Vec<u8>, TransportError> {
    check_device_address(device_address)?;
    match block_read_sequence(channel, device_address, register) {
        Ok(data) => Ok(data),
        Err(e) => {
            trace!("Block read failed ({e}), recovering bus");
            if let Err(recover_err) = execute(channel, TWO_WIRE_RECOVER) {
                warn!("Bus recover after failed block read also failed: {recover_err}");
            }
            Err(e)
        }
    }
}

fn block_read_sequence<C: Channel + ?Sized>(
    channel: &mut C,
    device_address: u8,
    register: u8,
) -> Result<Vec<u8>, TransportError> {
    trace!("Block read 0x{device_address:02X}:0x{register:02X}");
    execute(channel, TWO_WIRE_START)?;
    write_bus_byte(channel, device_address << 1)?;
    write_bus_byte(channel, register)?;
    execute(channel, TWO_WIRE_START_REPEAT)?;
    write_bus_byte(channel, (device_address << 1) | 1)?;

    let count = read_bus_byte(channel, true)? as usize;
    trace!("Block count {count}");

    let mut data = Vec::new();
    data.try_reserve_exact(count)
        .map_err(|_| TransportError::OutOfMemory { requested: count })?;
    for index in 0..count {
        let more = index + 1 < count;
        data.push(read_bus_byte(channel, more)?);
    }

    execute(channel, TWO_WIRE_STOP)?;
    Ok(data)
}

/// Clock one byte out onto the bus
fn write_bus_byte<C: Channel + ?Sized>(channel: &mut C, byte: u8) -> Result<(), TransportError> {
    execute(channel, TWO_WIRE_WRITE_BYTE.with_data(byte))
}

/// Clock one byte in from the bus, then ACK (more to come) or NACK (last byte)
fn read_bus_byte<C: Channel + ?Sized>(channel: &mut C, ack: bool) -> Result<u8, TransportError> {
    let ack_byte = if ack { READ_BYTE_ACK } else { READ_BYTE_NACK };
    let reply = transfer(
        channel,
        &TransferRequest::new(TWO_WIRE_READ_BYTE.with_data(ack_byte)).reply_len(1),
    )?;
    Ok(reply[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::ScriptedChannel;
    use crate::error::ErrorKind;

    #[test]
    fn test_read_byte_frames() {
        let mut channel = ScriptedChannel::new();
        channel.push_response(vec![0x5C, 0x90]);
        assert_eq!(read_byte(&mut channel, 0x3A).unwrap(), 0x5C);
        assert_eq!(channel.writes(), &[vec![0x00, 0x90, 0x3A]]);
    }

    #[test]
    fn test_write_byte_frames() {
        let mut channel = ScriptedChannel::new();
        channel.push_response(vec![0x80]);
        write_byte(&mut channel, 0x00, 0x03).unwrap();
        assert_eq!(channel.writes(), &[vec![0x00, 0x80, 0x00, 0x03]]);
    }

    #[test]
    fn test_word_is_little_endian() {
        let mut channel = ScriptedChannel::new();
        channel.push_response(vec![0x81]);
        channel.push_response(vec![0x34, 0x12, 0x91]);
        write_word(&mut channel, 0x3B, 0x1234).unwrap();
        assert_eq!(read_word(&mut channel, 0x3B).unwrap(), 0x1234);
        assert_eq!(channel.writes()[0], vec![0x00, 0x81, 0x3B, 0x34, 0x12]);
        assert_eq!(channel.writes()[1], vec![0x00, 0x91, 0x3B]);
    }

    #[test]
    fn test_read_byte_nak() {
        let mut channel = ScriptedChannel::new();
        channel.push_response(vec![0x00, 0xFA]);
        let err = read_byte(&mut channel, 0x3A).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProtocolNak);
    }

    #[test]
    fn test_block_read_recovers_on_address_nak() {
        let mut channel = ScriptedChannel::new();
        channel.push_response(vec![0xB0]); // start
        channel.push_response(vec![0xFA]); // addr+W rejected
        channel.push_response(vec![0xB4]); // recover
        let err = read_block(&mut channel, 0x52, 0x9A).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProtocolNak);
        let ops: Vec<u8> = channel.writes().iter().map(|f| f[1]).collect();
        assert_eq!(ops, vec![0xA0, 0xA1, 0xA4]);
    }

    #[test]
    fn test_block_read_rejects_wide_address_without_io() {
        let mut channel = ScriptedChannel::new();
        let err = read_block(&mut channel, 0xD2, 0x9A).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(channel.writes().is_empty());
    }
}
