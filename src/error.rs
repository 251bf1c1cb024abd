//! Error types for Line of Life
//!
//! Provides a unified error type for all driver operations. Callers recover
//! differently depending on [`ErrorKind`], so every variant maps to exactly one.

use thiserror::Error;

use crate::protocol::Register;

/// Result type alias using LolError
pub type Result<T> = std::result::Result<T, LolError>;

/// Unified error type for Line of Life operations
#[derive(Debug, Error)]
pub enum LolError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    /// I/O failure or timeout reported by the transport, passed through as-is.
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Precondition Errors (nothing was sent)
    // -------------------------------------------------------------------------
    #[error("Register number 0x{0:X} does not exist")]
    InvalidRegister(u8),

    #[error("Invalid value {value} for register {register:?}: {reason}")]
    InvalidRegisterValue {
        register: Register,
        value: f64,
        reason: &'static str,
    },

    #[error("Line has {actual} pixels, display height is {expected}")]
    LineLength { expected: usize, actual: usize },

    #[error("Line payload has {actual} bytes, display expects {expected}")]
    PayloadLength { expected: usize, actual: usize },

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Unsupported protocol version 0x{actual:X} (expected 0x{expected:X})")]
    VersionMismatch { expected: u8, actual: u8 },

    #[error("Ping returned wrong nonce 0x{actual:X} (expected 0x{expected:X})")]
    NonceMismatch { expected: u8, actual: u8 },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Broad error categories, one per recovery strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller misuse, detected before any byte was written. Fix the input.
    Precondition,
    /// The device disagreed with the host. Resync or reconnect.
    Protocol,
    /// The transport failed or timed out. Reconnect or resync.
    Transport,
    /// The driver configuration is invalid.
    Config,
}

impl LolError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LolError::Transport(_) => ErrorKind::Transport,
            LolError::InvalidRegister(_)
            | LolError::InvalidRegisterValue { .. }
            | LolError::LineLength { .. }
            | LolError::PayloadLength { .. } => ErrorKind::Precondition,
            LolError::VersionMismatch { .. } | LolError::NonceMismatch { .. } => {
                ErrorKind::Protocol
            }
            LolError::Config(_) => ErrorKind::Config,
        }
    }

    /// True if the error was raised before touching the transport
    pub fn is_precondition(&self) -> bool {
        self.kind() == ErrorKind::Precondition
    }

    /// True if the device answered with something the host did not expect
    pub fn is_protocol(&self) -> bool {
        self.kind() == ErrorKind::Protocol
    }
}
