//! Protocol Module
//!
//! Defines the wire protocol spoken by the Line of Life controller.
//!
//! ## Command Format
//! ```text
//! ┌──────────────┬────────────────┬─────────────────────────┐
//! │ Opcode (4b)  │ Immediate (4b) │  Payload (0..n bytes)   │
//! └──────────────┴────────────────┴─────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x0_: NO_OPERATION   - no payload, no response
//! - 0x1_: PUSH_LINE      - payload: packed pixels, response: free slots (1)
//! - 0x2_: FLUSH_BUFFER   - no payload, response: undefined byte (1)
//! - 0x3_: CLEAR_BUFFER   - no payload, no response
//! - 0x4r: REG_READ       - no payload, response: value BE (2)
//! - 0x5r: REG_WRITE      - payload: value BE (2), no response
//! - 0xFn: PING           - no payload, response: version << 4 | n (1)
//!
//! Every command has a bounded number of follow-on bytes, which is what makes
//! resynchronisation with a stream of no-ops possible.

mod command;
mod response;
mod register;
mod line;
mod codec;

pub use command::{Command, Opcode, IMMEDIATE_MASK, OPCODE_MASK};
pub use response::Pong;
pub use register::{
    encode_aspect_ratio, encode_duty, fixed_to_f64, signed_fixed_to_f64, BufferSize, Register,
};
pub use line::{pack_line, payload_len, unpack_line};
pub use codec::{
    check_register, encode_command, encode_noops, read_u16, read_u8, write_command,
    MAX_REGISTER_ADDRESS,
};

/// Protocol version spoken by this driver
pub const PROTOCOL_VERSION: u8 = 0x1;
