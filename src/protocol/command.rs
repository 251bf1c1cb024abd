//! Command definitions
//!
//! Represents commands sent from the host to the controller.

/// Bits of a command byte selecting the operation
pub const OPCODE_MASK: u8 = 0xF0;

/// Bits of a command byte carrying the immediate argument
pub const IMMEDIATE_MASK: u8 = 0x0F;

/// Operation selected by the top nibble of a command byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    NoOp = 0x00,
    PushLine = 0x10,
    FlushBuffer = 0x20,
    ClearBuffer = 0x30,
    RegisterRead = 0x40,
    RegisterWrite = 0x50,
    Ping = 0xF0,
}

impl Opcode {
    /// Decode the opcode of a command byte, ignoring the immediate
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte & OPCODE_MASK {
            0x00 => Some(Opcode::NoOp),
            0x10 => Some(Opcode::PushLine),
            0x20 => Some(Opcode::FlushBuffer),
            0x30 => Some(Opcode::ClearBuffer),
            0x40 => Some(Opcode::RegisterRead),
            0x50 => Some(Opcode::RegisterWrite),
            0xF0 => Some(Opcode::Ping),
            _ => None,
        }
    }

    /// Build a command byte from this opcode and an immediate nibble
    pub fn with_immediate(self, immediate: u8) -> u8 {
        self as u8 | (immediate & IMMEDIATE_MASK)
    }
}

/// A command ready to be framed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Do nothing
    NoOp,

    /// Append a packed line of pixels to the display buffer
    PushLine { payload: Vec<u8> },

    /// Block until the display buffer has emptied
    FlushBuffer,

    /// Empty the display buffer immediately
    ClearBuffer,

    /// Read a control register
    RegisterRead { register: u8 },

    /// Write a control register
    RegisterWrite { register: u8, value: u16 },

    /// Ping the controller; the nonce is echoed back
    Ping { nonce: u8 },
}

impl Command {
    /// Get the opcode
    pub fn opcode(&self) -> Opcode {
        match self {
            Command::NoOp => Opcode::NoOp,
            Command::PushLine { .. } => Opcode::PushLine,
            Command::FlushBuffer => Opcode::FlushBuffer,
            Command::ClearBuffer => Opcode::ClearBuffer,
            Command::RegisterRead { .. } => Opcode::RegisterRead,
            Command::RegisterWrite { .. } => Opcode::RegisterWrite,
            Command::Ping { .. } => Opcode::Ping,
        }
    }

    /// Get the immediate nibble (zero for commands that ignore it)
    pub fn immediate(&self) -> u8 {
        match self {
            Command::RegisterRead { register } | Command::RegisterWrite { register, .. } => {
                *register & IMMEDIATE_MASK
            }
            Command::Ping { nonce } => *nonce & IMMEDIATE_MASK,
            _ => 0,
        }
    }

    /// The command byte that starts this command on the wire
    pub fn command_byte(&self) -> u8 {
        self.opcode().with_immediate(self.immediate())
    }

    /// Number of bytes the controller answers with
    pub fn response_len(&self) -> usize {
        match self {
            Command::NoOp | Command::ClearBuffer | Command::RegisterWrite { .. } => 0,
            Command::PushLine { .. } | Command::FlushBuffer | Command::Ping { .. } => 1,
            Command::RegisterRead { .. } => 2,
        }
    }
}
