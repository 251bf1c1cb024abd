//! Codec Tests
//!
//! These tests verify:
//! - Command byte layout (opcode nibble | immediate nibble)
//! - Payload framing for PUSH_LINE and REG_WRITE
//! - Response lengths per command
//! - Ping response decoding
//! - Register metadata and fixed-point encodings

use line_of_life::protocol::{
    check_register, encode_aspect_ratio, encode_command, encode_duty, encode_noops,
    fixed_to_f64, signed_fixed_to_f64, BufferSize, Command, Opcode, Pong, Register,
};
use line_of_life::{ErrorKind, LolError};

// =============================================================================
// Command Encoding Tests
// =============================================================================

#[test]
fn test_encode_noop() {
    assert_eq!(encode_command(&Command::NoOp).as_ref(), &[0x00]);
}

#[test]
fn test_encode_push_line() {
    let cmd = Command::PushLine {
        payload: vec![0xFF, 0x00, 0xAA],
    };
    assert_eq!(encode_command(&cmd).as_ref(), &[0x10, 0xFF, 0x00, 0xAA]);
}

#[test]
fn test_encode_flush_and_clear() {
    assert_eq!(encode_command(&Command::FlushBuffer).as_ref(), &[0x20]);
    assert_eq!(encode_command(&Command::ClearBuffer).as_ref(), &[0x30]);
}

#[test]
fn test_encode_register_read() {
    let cmd = Command::RegisterRead { register: 0x5 };
    assert_eq!(encode_command(&cmd).as_ref(), &[0x45]);
}

#[test]
fn test_encode_register_write_big_endian() {
    let cmd = Command::RegisterWrite {
        register: 0x3,
        value: 0x0200,
    };
    assert_eq!(encode_command(&cmd).as_ref(), &[0x53, 0x02, 0x00]);
}

#[test]
fn test_encode_ping_masks_nonce() {
    let cmd = Command::Ping { nonce: 0xA7 };
    assert_eq!(encode_command(&cmd).as_ref(), &[0xF7]);
}

#[test]
fn test_command_byte_is_opcode_or_immediate() {
    for immediate in 0..=0xFFu8 {
        let byte = Opcode::RegisterRead.with_immediate(immediate);
        assert_eq!(byte, 0x40 | (immediate & 0x0F));
        assert_eq!(Opcode::from_byte(byte), Some(Opcode::RegisterRead));
    }
}

#[test]
fn test_opcode_from_unknown_byte() {
    assert_eq!(Opcode::from_byte(0x60), None);
    assert_eq!(Opcode::from_byte(0xE3), None);
    assert_eq!(Opcode::from_byte(0xF9), Some(Opcode::Ping));
}

#[test]
fn test_encode_noops() {
    let bytes = encode_noops(100);
    assert_eq!(bytes.len(), 100);
    assert!(bytes.iter().all(|&b| b == 0x00));
}

#[test]
fn test_response_lengths() {
    assert_eq!(Command::NoOp.response_len(), 0);
    assert_eq!(Command::PushLine { payload: vec![] }.response_len(), 1);
    assert_eq!(Command::FlushBuffer.response_len(), 1);
    assert_eq!(Command::ClearBuffer.response_len(), 0);
    assert_eq!(Command::RegisterRead { register: 0 }.response_len(), 2);
    assert_eq!(
        Command::RegisterWrite {
            register: 0,
            value: 0
        }
        .response_len(),
        0
    );
    assert_eq!(Command::Ping { nonce: 0 }.response_len(), 1);
}

// =============================================================================
// Register Address Tests
// =============================================================================

#[test]
fn test_check_register_accepts_nibble() {
    for address in 0..=0x0Fu8 {
        assert_eq!(check_register(address).unwrap(), address);
    }
}

#[test]
fn test_check_register_rejects_wide_address() {
    for address in [0x10u8, 0x15, 0x80, 0xFF] {
        match check_register(address) {
            Err(LolError::InvalidRegister(a)) => assert_eq!(a, address),
            other => panic!("Expected InvalidRegister, got {:?}", other),
        }
    }
}

#[test]
fn test_register_metadata() {
    assert_eq!(Register::ALL.len(), 6);
    for (index, register) in Register::ALL.iter().enumerate() {
        assert_eq!(register.address() as usize, index);
        assert_eq!(Register::from_address(index as u8), Some(*register));
    }
    assert_eq!(Register::from_address(6), None);

    assert!(Register::PixelAspectRatio.is_writable());
    assert!(Register::PixelDuty.is_writable());
    assert!(!Register::DisplayHeight.is_writable());
    assert!(!Register::BufferSize.is_writable());
}

// =============================================================================
// Ping Response Tests
// =============================================================================

#[test]
fn test_pong_from_byte() {
    let pong = Pong::from_byte(0x1C);
    assert_eq!(pong.version, 0x1);
    assert_eq!(pong.nonce, 0xC);
    assert_eq!(pong.to_byte(), 0x1C);
}

// =============================================================================
// Fixed-Point Tests
// =============================================================================

#[test]
fn test_fixed_to_f64() {
    assert_eq!(fixed_to_f64(0x0100), 1.0);
    assert_eq!(fixed_to_f64(0x0200), 2.0);
    assert_eq!(fixed_to_f64(0x0080), 0.5);
}

#[test]
fn test_signed_fixed_to_f64() {
    assert_eq!(signed_fixed_to_f64(0x0180), 1.5);
    assert_eq!(signed_fixed_to_f64(0xFE80), -1.5);
    assert_eq!(signed_fixed_to_f64(0x8000), -128.0);
}

#[test]
fn test_encode_aspect_ratio() {
    assert_eq!(encode_aspect_ratio(2.0).unwrap(), 0x0200);
    assert_eq!(encode_aspect_ratio(1.0).unwrap(), 0x0100);
    assert_eq!(encode_aspect_ratio(0.25).unwrap(), 0x0040);
}

#[test]
fn test_encode_aspect_ratio_rejects_invalid() {
    for ratio in [0.0, -1.0, 256.0, f64::NAN, f64::INFINITY, 0.001] {
        let err = encode_aspect_ratio(ratio).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition, "ratio {}", ratio);
    }
}

#[test]
fn test_encode_duty() {
    assert_eq!(encode_duty(1.0).unwrap(), 0x0100);
    assert_eq!(encode_duty(0.5).unwrap(), 0x0080);
}

#[test]
fn test_encode_duty_rejects_out_of_range() {
    for duty in [0.0, -0.5, 1.01, 2.0, f64::NAN, 0.0001] {
        match encode_duty(duty) {
            Err(LolError::InvalidRegisterValue { register, .. }) => {
                assert_eq!(register, Register::PixelDuty)
            }
            other => panic!("Expected InvalidRegisterValue for {}, got {:?}", duty, other),
        }
    }
}

// =============================================================================
// Buffer Size Tests
// =============================================================================

#[test]
fn test_buffer_size_decode() {
    let size = BufferSize::from_raw(0x0A03);
    assert_eq!(size.capacity, 10);
    assert_eq!(size.occupancy, 3);
    assert_eq!(size.free(), 7);
    assert_eq!(<(u8, u8)>::from(size), (10, 3));
    assert_eq!(size.to_raw(), 0x0A03);
}
