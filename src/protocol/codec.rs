//! Protocol codec
//!
//! Framing of commands and the transport-level read/write helpers.
//!
//! ## Wire Format
//!
//! ### Command
//! ```text
//! ┌───────────┬───────────────────────────────┐
//! │ Cmd (1)   │ Payload (0, 2 or line bytes)  │
//! └───────────┴───────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! - PUSH_LINE: packed pixels, `payload_len(display_height)` bytes
//! - REG_WRITE: value, 2 bytes big-endian
//! - others:    empty
//!
//! Responses carry no header; their length is fixed by the command.

use bytes::{BufMut, Bytes, BytesMut};

use super::{Command, Opcode, IMMEDIATE_MASK};
use crate::error::{LolError, Result};
use crate::transport::Transport;

/// Highest address that fits in the immediate nibble
pub const MAX_REGISTER_ADDRESS: u8 = IMMEDIATE_MASK;

/// Reject register addresses that do not fit in the immediate nibble
pub fn check_register(register: u8) -> Result<u8> {
    if register & IMMEDIATE_MASK != register {
        return Err(LolError::InvalidRegister(register));
    }
    Ok(register)
}

// =============================================================================
// Command Encoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: command byte (1) + payload
pub fn encode_command(command: &Command) -> Bytes {
    let payload_len = match command {
        Command::PushLine { payload } => payload.len(),
        Command::RegisterWrite { .. } => 2,
        _ => 0,
    };

    let mut message = BytesMut::with_capacity(1 + payload_len);
    message.put_u8(command.command_byte());

    match command {
        Command::PushLine { payload } => message.put_slice(payload),
        Command::RegisterWrite { value, .. } => message.put_u16(*value),
        _ => {}
    }

    message.freeze()
}

/// Encode a run of no-ops, as sent by a resync
pub fn encode_noops(count: usize) -> Bytes {
    let mut message = BytesMut::with_capacity(count);
    message.put_bytes(Opcode::NoOp as u8, count);
    message.freeze()
}

// =============================================================================
// Transport I/O helpers
// =============================================================================

/// Write a command to a transport in a single write
pub fn write_command<T: Transport + ?Sized>(transport: &mut T, command: &Command) -> Result<()> {
    let bytes = encode_command(command);
    tracing::trace!("-> {:?} ({} bytes)", command.opcode(), bytes.len());
    transport.send(&bytes)?;
    Ok(())
}

/// Read a single response byte
pub fn read_u8<T: Transport + ?Sized>(transport: &mut T) -> Result<u8> {
    let mut byte = [0u8; 1];
    transport.receive(&mut byte)?;
    tracing::trace!("<- 0x{:02X}", byte[0]);
    Ok(byte[0])
}

/// Read a big-endian 16-bit response
pub fn read_u16<T: Transport + ?Sized>(transport: &mut T) -> Result<u16> {
    let mut bytes = [0u8; 2];
    transport.receive(&mut bytes)?;
    let value = u16::from_be_bytes(bytes);
    tracing::trace!("<- 0x{:04X}", value);
    Ok(value)
}
