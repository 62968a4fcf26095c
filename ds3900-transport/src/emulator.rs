//! In-memory channels for exercising the protocol without hardware
//!
//! - [`ScriptedChannel`] records every frame written and replays canned
//!   responses, for asserting exact wire sequences.
//! - [`Ds3900Emulator`] models the adapter plus one SMBus target behind it
//!   (paged byte/word registers and block registers), for end-to-end tests of
//!   the layers above the framer.

use std::collections::{HashMap, VecDeque};

use crate::channel::Channel;
use crate::error::TransportError;
use crate::protocol::{opcode, status, HEADER_SIZE, READ_BYTE_ACK, RSP_BAD};

enum ScriptedRead {
    Data(Vec<u8>),
    Fail(String),
}

/// Channel that replays queued responses and records every write
///
/// Reads with nothing queued return zero bytes, which the framer treats as a
/// short read.
#[derive(Default)]
pub struct ScriptedChannel {
    writes: Vec<Vec<u8>>,
    responses: VecDeque<ScriptedRead>,
    truncate_next_write: Option<usize>,
    fail_next_write: Option<String>,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the bytes returned by the next unanswered read
    pub fn push_response(&mut self, bytes: Vec<u8>) {
        self.responses.push_back(ScriptedRead::Data(bytes));
    }

    /// Queue a read that fails with an I/O error
    pub fn push_read_error(&mut self, msg: &str) {
        self.responses.push_back(ScriptedRead::Fail(msg.to_string()));
    }

    /// Report only `n` bytes sent on the next write
    pub fn truncate_next_write(&mut self, n: usize) {
        self.truncate_next_write = Some(n);
    }

    /// Fail the next write with an I/O error
    pub fn fail_next_write(&mut self, msg: &str) {
        self.fail_next_write = Some(msg.to_string());
    }

    /// Every frame passed to `write` so far, including failed attempts
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    /// Request opcode of every frame written so far
    pub fn opcodes(&self) -> Vec<u8> {
        self.writes.iter().filter_map(|f| f.get(1).copied()).collect()
    }

    /// Responses queued but never read
    pub fn pending_responses(&self) -> usize {
        self.responses.len()
    }
}

impl Channel for ScriptedChannel {
    fn write(&mut self, frame: &[u8]) -> Result<usize, TransportError> {
        self.writes.push(frame.to_vec());
        if let Some(msg) = self.fail_next_write.take() {
            return Err(std::io::Error::other(msg).into());
        }
        Ok(self.truncate_next_write.take().unwrap_or(frame.len()))
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        match self.responses.pop_front() {
            Some(ScriptedRead::Data(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            Some(ScriptedRead::Fail(msg)) => Err(std::io::Error::other(msg).into()),
            None => Ok(0),
        }
    }
}

// =============================================================================
// Stateful emulator
// =============================================================================

/// Bus-level event observed by the emulated target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    Start,
    Write(u8),
    Read { ack: bool },
    Stop,
    Recover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BusState {
    Idle,
    Started { command: Option<u8> },
    AddressedWrite,
    CommandCode(u8),
    Reading { register: u8, position: usize },
}

/// Register the emulated target treats as the PMBus page selector
const PAGE_REGISTER: u8 = 0x00;

/// DS3900 adapter with a single SMBus target attached
pub struct Ds3900Emulator {
    target_address: u8,
    selected_address: u8,
    revision: (u8, u8),
    page: u8,
    registers: HashMap<(u8, u8), Vec<u8>>,
    blocks: HashMap<(u8, u8), Vec<u8>>,
    bus: BusState,
    bus_log: Vec<BusEvent>,
    /// Opcode -> requests still answered normally before NAKs begin
    nak_opcodes: HashMap<u8, usize>,
    frames: Vec<Vec<u8>>,
    pending: Option<Vec<u8>>,
}

impl Ds3900Emulator {
    /// Emulate an adapter whose bus hosts a target at `target_address`
    pub fn new(target_address: u8) -> Self {
        Self {
            target_address,
            selected_address: 0,
            revision: (1, 0),
            page: 0,
            registers: HashMap::new(),
            blocks: HashMap::new(),
            bus: BusState::Idle,
            bus_log: Vec::new(),
            nak_opcodes: HashMap::new(),
            frames: Vec::new(),
            pending: None,
        }
    }

    pub fn with_revision(mut self, major: u8, minor: u8) -> Self {
        self.revision = (major, minor);
        self
    }

    /// Preload a byte or word register (little-endian bytes)
    pub fn set_register(&mut self, page: u8, register: u8, bytes: &[u8]) {
        self.registers.insert((page, register), bytes.to_vec());
    }

    /// Current contents of a register, if ever written
    pub fn register(&self, page: u8, register: u8) -> Option<&[u8]> {
        self.registers.get(&(page, register)).map(Vec::as_slice)
    }

    /// Preload the data returned by an SMBus block read of `register`
    pub fn set_block(&mut self, page: u8, register: u8, data: &[u8]) {
        self.blocks.insert((page, register), data.to_vec());
    }

    /// Make the adapter reject every request with this opcode
    pub fn nak_opcode(&mut self, op: u8) {
        self.nak_opcode_after(op, 0);
    }

    /// Answer `passes` requests with this opcode normally, then reject the rest
    pub fn nak_opcode_after(&mut self, op: u8, passes: usize) {
        self.nak_opcodes.insert(op, passes);
    }

    /// Stop injecting NAKs
    pub fn clear_faults(&mut self) {
        self.nak_opcodes.clear();
    }

    pub fn page(&self) -> u8 {
        self.page
    }

    pub fn selected_address(&self) -> u8 {
        self.selected_address
    }

    /// Bus events produced by 2-wire commands
    pub fn bus_log(&self) -> &[BusEvent] {
        &self.bus_log
    }

    /// Every request frame received
    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    fn response_len(op: u8) -> usize {
        match op {
            op if opcode::is_packet_read(op) => (op & opcode::WIDTH_MASK) as usize + 2,
            opcode::TWO_WIRE_READ_BYTE => 2,
            opcode::READ_REVISION => 3,
            _ => 1,
        }
    }

    fn nak(op: u8) -> Vec<u8> {
        let mut rsp = vec![0u8; Self::response_len(op)];
        if let Some(last) = rsp.last_mut() {
            *last = RSP_BAD;
        }
        rsp
    }

    fn target_selected(&self) -> bool {
        self.selected_address == self.target_address
    }

    fn respond(&mut self, frame: &[u8]) -> Vec<u8> {
        if frame.len() < HEADER_SIZE {
            return vec![RSP_BAD];
        }
        let op = frame[1];
        let data = frame[2];
        if let Some(passes) = self.nak_opcodes.get_mut(&op) {
            if *passes == 0 {
                return Self::nak(op);
            }
            *passes -= 1;
        }

        match op {
            op if opcode::is_packet_write(op) => self.packet_write(op, data, &frame[HEADER_SIZE..]),
            op if opcode::is_packet_read(op) => self.packet_read(op, data),
            opcode::TWO_WIRE_START => {
                self.bus_log.push(BusEvent::Start);
                self.bus = match self.bus {
                    BusState::CommandCode(register) => BusState::Started {
                        command: Some(register),
                    },
                    _ => BusState::Started { command: None },
                };
                vec![status::TWO_WIRE_START]
            }
            opcode::TWO_WIRE_WRITE_BYTE => {
                self.bus_log.push(BusEvent::Write(data));
                self.bus_write(data)
            }
            opcode::TWO_WIRE_READ_BYTE => {
                self.bus_log.push(BusEvent::Read {
                    ack: data == READ_BYTE_ACK,
                });
                self.bus_read()
            }
            opcode::TWO_WIRE_STOP => {
                self.bus_log.push(BusEvent::Stop);
                self.bus = BusState::Idle;
                vec![status::TWO_WIRE_STOP]
            }
            opcode::TWO_WIRE_RECOVER => {
                self.bus_log.push(BusEvent::Recover);
                self.bus = BusState::Idle;
                vec![status::TWO_WIRE_RECOVER]
            }
            opcode::DEVICE_ADDRESS => {
                self.selected_address = data >> 1;
                vec![status::DEVICE_ADDRESS]
            }
            opcode::READ_REVISION => vec![self.revision.0, self.revision.1, status::READ_REVISION],
            _ => vec![RSP_BAD],
        }
    }

    fn packet_write(&mut self, op: u8, register: u8, payload: &[u8]) -> Vec<u8> {
        let width = (op & opcode::WIDTH_MASK) as usize + 1;
        if !self.target_selected() || payload.len() != width {
            return Self::nak(op);
        }
        if register == PAGE_REGISTER {
            self.page = payload[0];
        } else {
            self.registers.insert((self.page, register), payload.to_vec());
        }
        vec![status::PACKET_WRITE | (op & opcode::WIDTH_MASK)]
    }

    fn packet_read(&mut self, op: u8, register: u8) -> Vec<u8> {
        if !self.target_selected() {
            return Self::nak(op);
        }
        let width = (op & opcode::WIDTH_MASK) as usize + 1;
        let mut rsp = if register == PAGE_REGISTER {
            vec![self.page]
        } else {
            self.registers
                .get(&(self.page, register))
                .cloned()
                .unwrap_or_default()
        };
        rsp.resize(width, 0);
        rsp.push(status::PACKET_READ | (op & opcode::WIDTH_MASK));
        rsp
    }

    fn bus_write(&mut self, byte: u8) -> Vec<u8> {
        let next = match self.bus {
            BusState::Started { command } => {
                if byte >> 1 != self.target_address {
                    None
                } else if byte & 1 == 0 {
                    Some(BusState::AddressedWrite)
                } else {
                    command.map(|register| BusState::Reading {
                        register,
                        position: 0,
                    })
                }
            }
            BusState::AddressedWrite => Some(BusState::CommandCode(byte)),
            _ => None,
        };
        match next {
            Some(state) => {
                self.bus = state;
                vec![status::TWO_WIRE_WRITE_BYTE]
            }
            None => {
                self.bus = BusState::Idle;
                vec![RSP_BAD]
            }
        }
    }

    fn bus_read(&mut self) -> Vec<u8> {
        let BusState::Reading { register, position } = self.bus else {
            return Self::nak(opcode::TWO_WIRE_READ_BYTE);
        };
        let block = self
            .blocks
            .get(&(self.page, register))
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let byte = if position == 0 {
            block.len() as u8
        } else {
            block.get(position - 1).copied().unwrap_or(0xFF)
        };
        self.bus = BusState::Reading {
            register,
            position: position + 1,
        };
        vec![byte, status::TWO_WIRE_READ_BYTE]
    }
}

impl Channel for Ds3900Emulator {
    fn write(&mut self, frame: &[u8]) -> Result<usize, TransportError> {
        self.frames.push(frame.to_vec());
        let response = self.respond(frame);
        self.pending = Some(response);
        Ok(frame.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let Some(response) = self.pending.take() else {
            return Ok(0);
        };
        let n = response.len().min(buf.len());
        buf[..n].copy_from_slice(&response[..n]);
        Ok(n)
    }
}
