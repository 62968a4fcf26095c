//! Integration tests for the SMBus block-read bus sequence.
//!
//! These drive `read_block` against scripted and emulated adapters and check
//! the exact 2-wire command sequence on the wire.

use ds3900_transport::emulator::{BusEvent, Ds3900Emulator, ScriptedChannel};
use ds3900_transport::protocol::{opcode, READ_BYTE_ACK, READ_BYTE_NACK};
use ds3900_transport::{read_block, ErrorKind};

const TARGET: u8 = 0x52;
const MFR_MODEL: u8 = 0x9A;

/// Script a fully successful block read returning `data`
fn script_block(channel: &mut ScriptedChannel, data: &[u8]) {
    channel.push_response(vec![0xB0]); // start
    channel.push_response(vec![0xB1]); // addr+W
    channel.push_response(vec![0xB1]); // command code
    channel.push_response(vec![0xB0]); // repeated start
    channel.push_response(vec![0xB1]); // addr+R
    channel.push_response(vec![data.len() as u8, 0xB2]); // count
    for &b in data {
        channel.push_response(vec![b, 0xB2]);
    }
    channel.push_response(vec![0xB3]); // stop
}

/// Expected request frames for a block read of `count` bytes
fn expected_frames(count: usize) -> Vec<Vec<u8>> {
    let mut frames = vec![
        vec![0x00, opcode::TWO_WIRE_START, 0x00],
        vec![0x00, opcode::TWO_WIRE_WRITE_BYTE, TARGET << 1],
        vec![0x00, opcode::TWO_WIRE_WRITE_BYTE, MFR_MODEL],
        vec![0x00, opcode::TWO_WIRE_START, 0x00],
        vec![0x00, opcode::TWO_WIRE_WRITE_BYTE, (TARGET << 1) | 1],
        vec![0x00, opcode::TWO_WIRE_READ_BYTE, READ_BYTE_ACK],
    ];
    for i in 0..count {
        let ack = if i + 1 < count {
            READ_BYTE_ACK
        } else {
            READ_BYTE_NACK
        };
        frames.push(vec![0x00, opcode::TWO_WIRE_READ_BYTE, ack]);
    }
    frames.push(vec![0x00, opcode::TWO_WIRE_STOP, 0x00]);
    frames
}

#[test]
fn empty_block_sequence() {
    let mut channel = ScriptedChannel::new();
    script_block(&mut channel, &[]);
    let data = read_block(&mut channel, TARGET, MFR_MODEL).unwrap();
    assert!(data.is_empty());
    assert_eq!(channel.writes(), expected_frames(0).as_slice());
    assert_eq!(channel.pending_responses(), 0);
}

#[test]
fn single_byte_block_is_nacked() {
    let mut channel = ScriptedChannel::new();
    script_block(&mut channel, &[0x42]);
    let data = read_block(&mut channel, TARGET, MFR_MODEL).unwrap();
    assert_eq!(data, vec![0x42]);
    assert_eq!(channel.writes(), expected_frames(1).as_slice());
}

#[test]
fn five_byte_block_acks_all_but_last() {
    let payload = b"MAX31";
    let mut channel = ScriptedChannel::new();
    script_block(&mut channel, payload);
    let data = read_block(&mut channel, TARGET, MFR_MODEL).unwrap();
    assert_eq!(data, payload.to_vec());
    assert_eq!(channel.writes(), expected_frames(5).as_slice());
}

#[test]
fn failure_at_every_step_recovers_once() {
    // Steps: start, addr+W, cmd, restart, addr+R, count, 2 data bytes, stop
    let data = [0x10, 0x20];
    let total_steps = 6 + data.len() + 1;

    for failing in 0..total_steps {
        let mut channel = ScriptedChannel::new();
        let mut full = ScriptedChannel::new();
        script_block(&mut full, &data);
        let _ = read_block(&mut full, TARGET, MFR_MODEL);
        let good_frames = full.writes().to_vec();

        // Replay the good responses up to the failing step, then NAK it
        for frame in &good_frames[..failing] {
            let rsp = match frame[1] {
                opcode::TWO_WIRE_START => vec![0xB0],
                opcode::TWO_WIRE_WRITE_BYTE => vec![0xB1],
                opcode::TWO_WIRE_READ_BYTE => vec![data.len() as u8, 0xB2],
                opcode::TWO_WIRE_STOP => vec![0xB3],
                other => panic!("unexpected opcode 0x{other:02X}"),
            };
            channel.push_response(rsp);
        }
        let failing_op = good_frames[failing][1];
        let nak_len = if failing_op == opcode::TWO_WIRE_READ_BYTE { 2 } else { 1 };
        let mut nak = vec![0u8; nak_len];
        nak[nak_len - 1] = 0xFA;
        channel.push_response(nak);
        channel.push_response(vec![0xB4]); // recover

        let err = read_block(&mut channel, TARGET, MFR_MODEL).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProtocolNak, "step {failing}");

        let ops = channel.opcodes();
        assert_eq!(ops.len(), failing + 2, "step {failing}");
        assert_eq!(*ops.last().unwrap(), opcode::TWO_WIRE_RECOVER);
        let recovers = ops
            .iter()
            .filter(|&&op| op == opcode::TWO_WIRE_RECOVER)
            .count();
        assert_eq!(recovers, 1, "step {failing}");
    }
}

#[test]
fn recover_failure_does_not_mask_original_error() {
    let mut channel = ScriptedChannel::new();
    channel.push_response(vec![0xB0]); // start
    channel.push_response(vec![0xB2]); // addr+W answered with wrong trailer
    channel.push_response(vec![0xFA]); // recover rejected too
    let err = read_block(&mut channel, TARGET, MFR_MODEL).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProtocolMismatch);

    let mut channel = ScriptedChannel::new();
    channel.push_read_error("device unplugged"); // start
    channel.push_read_error("device unplugged"); // recover
    let err = read_block(&mut channel, TARGET, MFR_MODEL).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(
        channel.opcodes(),
        vec![opcode::TWO_WIRE_START, opcode::TWO_WIRE_RECOVER]
    );
}

#[test]
fn emulated_target_block_read() {
    let mut emu = Ds3900Emulator::new(TARGET);
    emu.set_block(0, MFR_MODEL, b"31785");
    let data = read_block(&mut emu, TARGET, MFR_MODEL).unwrap();
    assert_eq!(data, b"31785".to_vec());

    let log = emu.bus_log();
    assert_eq!(log[0], BusEvent::Start);
    assert_eq!(log[1], BusEvent::Write(TARGET << 1));
    assert_eq!(log[3], BusEvent::Start);
    assert_eq!(log[5], BusEvent::Read { ack: true });
    assert_eq!(log[log.len() - 2], BusEvent::Read { ack: false });
    assert_eq!(log[log.len() - 1], BusEvent::Stop);
}

#[test]
fn emulated_wrong_address_recovers() {
    let mut emu = Ds3900Emulator::new(TARGET);
    let err = read_block(&mut emu, 0x20, MFR_MODEL).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProtocolNak);
    assert_eq!(emu.bus_log().last(), Some(&BusEvent::Recover));
}

#[test]
fn emulated_nak_mid_data_recovers_then_bus_is_usable() {
    let mut emu = Ds3900Emulator::new(TARGET);
    emu.set_block(0, MFR_MODEL, b"31785");
    // count byte and first two data bytes succeed, the third is rejected
    emu.nak_opcode_after(opcode::TWO_WIRE_READ_BYTE, 3);
    let err = read_block(&mut emu, TARGET, MFR_MODEL).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProtocolNak);

    let log = emu.bus_log();
    let reads = log
        .iter()
        .filter(|e| matches!(e, BusEvent::Read { .. }))
        .count();
    assert_eq!(reads, 3);
    assert_eq!(log.last(), Some(&BusEvent::Recover));
    assert_eq!(
        log.iter().filter(|e| **e == BusEvent::Recover).count(),
        1
    );
    assert!(!log.contains(&BusEvent::Stop));

    emu.clear_faults();
    let data = read_block(&mut emu, TARGET, MFR_MODEL).unwrap();
    assert_eq!(data, b"31785".to_vec());
    assert_eq!(emu.bus_log().last(), Some(&BusEvent::Stop));
}
