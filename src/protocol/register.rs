//! Register definitions
//!
//! Control register addresses, their access modes, and the fixed-point
//! encodings used by the register values.

use crate::error::{LolError, Result};

/// Control registers exposed by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    /// (RO) Number of vertical pixels, i.e. the number of LEDs
    DisplayHeight = 0x0,

    /// (RO) Horizontal pixels in one full rotation at a 1:1 aspect ratio
    DisplayWidth = 0x1,

    /// (RO) Signed 1/256ths of a revolution per minute, +ve is clockwise
    Rpm = 0x2,

    /// (RW) Pixel width over height, unsigned 8.8 fixed point
    PixelAspectRatio = 0x3,

    /// (RW) Fraction of a pixel's time the LEDs are lit, unsigned 8.8 fixed point
    PixelDuty = 0x4,

    /// (RO) High byte: buffer capacity in lines. Low byte: occupancy.
    BufferSize = 0x5,
}

impl Register {
    /// All named registers, in address order
    pub const ALL: [Register; 6] = [
        Register::DisplayHeight,
        Register::DisplayWidth,
        Register::Rpm,
        Register::PixelAspectRatio,
        Register::PixelDuty,
        Register::BufferSize,
    ];

    /// Wire address of this register
    pub fn address(self) -> u8 {
        self as u8
    }

    /// Look up a named register by address
    pub fn from_address(address: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.address() == address)
    }

    /// Whether the host may write this register
    pub fn is_writable(self) -> bool {
        matches!(self, Register::PixelAspectRatio | Register::PixelDuty)
    }
}

impl From<Register> for u8 {
    fn from(register: Register) -> u8 {
        register.address()
    }
}

// =============================================================================
// Fixed Point
// =============================================================================

/// Decode an unsigned 8.8 fixed-point value
pub fn fixed_to_f64(raw: u16) -> f64 {
    f64::from(raw) / 256.0
}

/// Decode a signed 8.8 fixed-point value (bit 15 is the sign)
pub fn signed_fixed_to_f64(raw: u16) -> f64 {
    f64::from(raw as i16) / 256.0
}

fn to_fixed(register: Register, value: f64) -> Result<u16> {
    if !value.is_finite() {
        return Err(LolError::InvalidRegisterValue {
            register,
            value,
            reason: "not a finite number",
        });
    }
    let raw = (value * 256.0).round();
    if !(0.0..=f64::from(u16::MAX)).contains(&raw) {
        return Err(LolError::InvalidRegisterValue {
            register,
            value,
            reason: "outside the unsigned 8.8 fixed-point range",
        });
    }
    Ok(raw as u16)
}

/// Encode a pixel aspect ratio, which must be positive
pub fn encode_aspect_ratio(ratio: f64) -> Result<u16> {
    if ratio.is_finite() && ratio <= 0.0 {
        return Err(LolError::InvalidRegisterValue {
            register: Register::PixelAspectRatio,
            value: ratio,
            reason: "aspect ratio must be positive",
        });
    }
    let raw = to_fixed(Register::PixelAspectRatio, ratio)?;
    if raw == 0 {
        return Err(LolError::InvalidRegisterValue {
            register: Register::PixelAspectRatio,
            value: ratio,
            reason: "aspect ratio rounds to zero",
        });
    }
    Ok(raw)
}

/// Encode a pixel duty cycle in (0.0, 1.0]
pub fn encode_duty(duty: f64) -> Result<u16> {
    if duty.is_finite() && !(duty > 0.0 && duty <= 1.0) {
        return Err(LolError::InvalidRegisterValue {
            register: Register::PixelDuty,
            value: duty,
            reason: "duty must be in (0.0, 1.0]",
        });
    }
    let raw = to_fixed(Register::PixelDuty, duty)?;
    if raw == 0 {
        return Err(LolError::InvalidRegisterValue {
            register: Register::PixelDuty,
            value: duty,
            reason: "duty rounds to zero",
        });
    }
    Ok(raw)
}

// =============================================================================
// Buffer Size
// =============================================================================

/// Decoded `BufferSize` register.
///
/// Assumes the current firmware revision, where `occupancy` does not count the
/// line currently being displayed. An earlier revision counted it; against such
/// firmware `occupancy` reads one higher while a line is on display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSize {
    /// Number of lines the display buffer can hold
    pub capacity: u8,

    /// Number of lines waiting in the buffer
    pub occupancy: u8,
}

impl BufferSize {
    /// Unpack the raw register value
    pub fn from_raw(raw: u16) -> Self {
        let [capacity, occupancy] = raw.to_be_bytes();
        Self { capacity, occupancy }
    }

    /// Pack into the raw register value
    pub fn to_raw(self) -> u16 {
        u16::from_be_bytes([self.capacity, self.occupancy])
    }

    /// Free slots left in the buffer
    pub fn free(self) -> u8 {
        self.capacity.saturating_sub(self.occupancy)
    }
}

impl From<BufferSize> for (u8, u8) {
    fn from(size: BufferSize) -> (u8, u8) {
        (size.capacity, size.occupancy)
    }
}
