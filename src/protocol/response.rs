//! Response definitions
//!
//! Most responses are bare integers; only the ping reply has structure.

use super::IMMEDIATE_MASK;

/// Reply to a ping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pong {
    /// Protocol version reported by the controller (high nibble)
    pub version: u8,

    /// Echoed nonce (low nibble)
    pub nonce: u8,
}

impl Pong {
    /// Split a ping response byte into its nibbles
    pub fn from_byte(byte: u8) -> Self {
        Self {
            version: byte >> 4,
            nonce: byte & IMMEDIATE_MASK,
        }
    }

    /// Build the byte a controller would answer with
    pub fn to_byte(self) -> u8 {
        (self.version << 4) | (self.nonce & IMMEDIATE_MASK)
    }
}
