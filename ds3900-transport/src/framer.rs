//! Request framing and response validation
//!
//! ```text
//! request:  report_id(1) | opcode(1) | data(1) | [payload(n), packet writes only]
//! response: data(0..16) | status(1)
//! ```
//!
//! One call to [`transfer`] is exactly one channel write followed by exactly
//! one channel read. Nothing is retried; a failed transfer is reported once.

use tracing::{debug, trace};
use zerocopy::{Immutable, IntoBytes, KnownLayout};

use crate::channel::Channel;
use crate::command::{self, CommandDescriptor};
use crate::error::TransportError;
use crate::protocol::{MAX_DEVICE_ADDRESS, MAX_RESPONSE_LEN, REPORT_ID, RSP_BAD, RX_BUFFER_SIZE};

/// Fixed three-byte request header
#[derive(Debug, Clone, Copy, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
struct FrameHeader {
    report_id: u8,
    opcode: u8,
    data: u8,
}

/// A single framed exchange, built per call and consumed by [`transfer`]
///
/// `length` plays the role of the caller's buffer size: the payload length for
/// packet writes, the number of reply bytes wanted otherwise. The command's
/// response (data plus trailer) must fit in `length + 1` bytes.
#[derive(Debug, Clone, Copy)]
pub struct TransferRequest<'a> {
    command: CommandDescriptor,
    payload: Option<&'a [u8]>,
    length: usize,
}

impl<'a> TransferRequest<'a> {
    /// A request with no payload and no reply data
    pub fn new(command: CommandDescriptor) -> Self {
        Self {
            command,
            payload: None,
            length: 0,
        }
    }

    /// Attach payload bytes (transmitted only for packet writes)
    pub fn payload(mut self, payload: &'a [u8]) -> Self {
        self.payload = Some(payload);
        self.length = payload.len();
        self
    }

    /// Request `len` bytes of reply data
    pub fn reply_len(mut self, len: usize) -> Self {
        self.length = len;
        self
    }

    pub fn command(&self) -> &CommandDescriptor {
        &self.command
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Check every precondition; fails before any I/O is attempted
    pub fn validate(&self) -> Result<(), TransportError> {
        let rsp_len = self.command.expected_response_length();
        if rsp_len == 0 {
            return Err(TransportError::invalid("response must include a status byte"));
        }
        if rsp_len > MAX_RESPONSE_LEN {
            return Err(TransportError::InvalidArgument(format!(
                "response length {rsp_len} exceeds adapter capacity {MAX_RESPONSE_LEN}"
            )));
        }
        if self.length == usize::MAX {
            return Err(TransportError::invalid("length overflows"));
        }
        if rsp_len > self.length + 1 {
            return Err(TransportError::InvalidArgument(format!(
                "{} response of {rsp_len} bytes does not fit {} byte buffer",
                self.command.name(),
                self.length
            )));
        }
        if self.command.is_packet_write() {
            match self.payload {
                None if self.length > 0 => {
                    return Err(TransportError::InvalidArgument(format!(
                        "{} of {} bytes has no payload",
                        self.command.name(),
                        self.length
                    )));
                }
                Some(payload) if payload.len() != self.length => {
                    return Err(TransportError::InvalidArgument(format!(
                        "{} declares {} bytes but carries {}",
                        self.command.name(),
                        self.length,
                        payload.len()
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Encode the output report
    pub fn encode(&self) -> Vec<u8> {
        let header = FrameHeader {
            report_id: REPORT_ID,
            opcode: self.command.request_opcode(),
            data: self.command.request_payload_byte(),
        };
        let mut frame = header.as_bytes().to_vec();
        if self.command.is_packet_write() {
            if let Some(payload) = self.payload {
                frame.extend_from_slice(payload);
            }
        }
        frame
    }
}

/// Send one request and validate the adapter's response
///
/// Returns the reply data bytes (never the status trailer): up to
/// `request.length()` bytes taken from the front of the response. Packet
/// writes return an empty reply.
pub fn transfer<C: Channel + ?Sized>(
    channel: &mut C,
    request: &TransferRequest<'_>,
) -> Result<Vec<u8>, TransportError> {
    request.validate()?;

    let cmd = request.command();
    let frame = request.encode();
    debug!("Sending {} 0x{:02X}: {:02X?}", cmd.name(), cmd.request_opcode(), frame);

    let sent = channel.write(&frame)?;
    if sent != frame.len() {
        return Err(TransportError::ShortWrite {
            expected: frame.len(),
            actual: sent,
        });
    }

    let rsp_len = cmd.expected_response_length();
    let mut rx = [0u8; RX_BUFFER_SIZE];
    let received = channel.read(&mut rx[..rsp_len])?;
    if received != rsp_len {
        return Err(TransportError::ShortRead {
            expected: rsp_len,
            actual: received,
        });
    }
    trace!("Response for 0x{:02X}: {:02X?}", cmd.request_opcode(), &rx[..rsp_len]);

    let trailer = rx[rsp_len - 1];
    if trailer == RSP_BAD {
        debug!("{} rejected by adapter", cmd.name());
        return Err(TransportError::ProtocolNak {
            opcode: cmd.request_opcode(),
        });
    }
    if trailer != cmd.expected_response_opcode() {
        debug!(
            "Response mismatch: expected 0x{:02X}, got 0x{:02X}",
            cmd.expected_response_opcode(),
            trailer
        );
        return Err(TransportError::ProtocolMismatch {
            expected: cmd.expected_response_opcode(),
            actual: trailer,
        });
    }

    if request.payload.is_some() {
        return Ok(Vec::new());
    }
    let data_len = request.length().min(rsp_len - 1);
    Ok(rx[..data_len].to_vec())
}

/// Issue a bare command with no payload and no reply data
pub fn execute<C: Channel + ?Sized>(
    channel: &mut C,
    command: CommandDescriptor,
) -> Result<(), TransportError> {
    transfer(channel, &TransferRequest::new(command)).map(|_| ())
}

/// Select the 7-bit target address used by packet operations
pub fn set_device_address<C: Channel + ?Sized>(
    channel: &mut C,
    address: u8,
) -> Result<(), TransportError> {
    check_device_address(address)?;
    debug!("Setting device address 0x{:02X}", address);
    execute(channel, command::DEVICE_ADDRESS.with_data(address << 1))
}

/// Reject addresses that do not fit in 7 bits
pub(crate) fn check_device_address(address: u8) -> Result<(), TransportError> {
    if address > MAX_DEVICE_ADDRESS {
        return Err(TransportError::InvalidArgument(format!(
            "device address 0x{address:02X} exceeds 7 bits"
        )));
    }
    Ok(())
}

/// Adapter firmware revision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Revision {
    pub major: u8,
    pub minor: u8,
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Read the adapter's firmware revision
pub fn read_revision<C: Channel + ?Sized>(channel: &mut C) -> Result<Revision, TransportError> {
    let reply = transfer(
        channel,
        &TransferRequest::new(command::READ_REVISION).reply_len(2),
    )?;
    Ok(Revision {
        major: reply[0],
        minor: reply[1],
    })
}
