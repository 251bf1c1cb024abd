//! Driver Module
//!
//! The blocking host-side interface to a Line of Life controller.
//!
//! ## Responsibilities
//! - Frame and send commands, block on their responses
//! - Resynchronise with a controller in an unknown state
//! - Verify the protocol version with a ping handshake
//! - Cache the immutable display geometry
//!
//! ## State Machine
//! ```text
//!   Unsynced ──resync──▶ Idle ◀──▶ (any command)
//! ```
//! A command abandoned half-way (e.g. after a transport timeout) leaves the
//! controller in an unknown state; call [`LineOfLife::resync`] to recover.

use crate::config::Config;
use crate::error::{LolError, Result};
use crate::protocol::{
    self, check_register, encode_aspect_ratio, encode_duty, fixed_to_f64, read_u16, read_u8,
    signed_fixed_to_f64, write_command, BufferSize, Command, Pong, Register, IMMEDIATE_MASK,
};
use crate::transport::Transport;

/// A connection to a Line of Life display
///
/// Owns its transport exclusively; every method takes `&mut self`, so at most
/// one command is ever in flight.
pub struct LineOfLife<T: Transport> {
    /// Link to the controller
    transport: T,

    /// Driver configuration
    config: Config,

    /// Memoized `DisplayHeight` register
    display_height: Option<u16>,

    /// Memoized `DisplayWidth` register
    display_width: Option<u16>,
}

impl<T: Transport> LineOfLife<T> {
    /// Connect to a display with the default configuration
    pub fn new(transport: T) -> Result<Self> {
        Self::with_config(transport, Config::default())
    }

    /// Connect to a display
    ///
    /// Resyncs immediately; a device that fails the handshake is an error.
    pub fn with_config(transport: T, config: Config) -> Result<Self> {
        config.validate()?;

        let mut driver = Self {
            transport,
            config,
            display_height: None,
            display_width: None,
        };

        driver.resync()?;
        Ok(driver)
    }

    /// Resynchronise with the controller, leaving it idle.
    ///
    /// No command takes an unbounded number of follow-on bytes, so a long
    /// enough run of no-ops completes whatever the controller was in the
    /// middle of. Stale responses are then discarded and a ping confirms the
    /// link.
    pub fn resync(&mut self) -> Result<()> {
        let mut noops = self.config.resync_noop_count;
        if let Some(height) = self.display_height {
            noops = noops.max(protocol::payload_len(usize::from(height)) + 1);
        }

        tracing::debug!("Resync: sending {} no-ops", noops);
        self.transport.send(&protocol::encode_noops(noops))?;

        if self.config.discard_on_resync {
            if self.transport.discard_pending_input()? {
                tracing::debug!("Resync: discarded pending input");
            } else {
                tracing::debug!("Resync: transport cannot discard input, skipping");
            }
        }

        self.ping()?;
        tracing::debug!("Resync complete");
        Ok(())
    }

    // =========================================================================
    // Low-level Commands
    // =========================================================================

    /// Send a no-operation command
    pub fn no_operation(&mut self) -> Result<()> {
        write_command(&mut self.transport, &Command::NoOp)
    }

    /// Send an already packed line to the display buffer.
    ///
    /// Blocks until the controller has at least one free buffer slot, and
    /// returns the number of free slots. The payload length is checked against
    /// the display height before anything is sent.
    pub fn push_line_raw(&mut self, payload: &[u8]) -> Result<u8> {
        let expected = protocol::payload_len(usize::from(self.display_height()?));
        if payload.len() != expected {
            return Err(LolError::PayloadLength {
                expected,
                actual: payload.len(),
            });
        }

        write_command(
            &mut self.transport,
            &Command::PushLine {
                payload: payload.to_vec(),
            },
        )?;
        read_u8(&mut self.transport)
    }

    /// Block until the display buffer has emptied
    pub fn flush_buffer(&mut self) -> Result<()> {
        write_command(&mut self.transport, &Command::FlushBuffer)?;
        // The response value is undefined
        read_u8(&mut self.transport)?;
        Ok(())
    }

    /// Empty the display buffer immediately.
    ///
    /// The line currently on display is left alone.
    pub fn clear_buffer(&mut self) -> Result<()> {
        write_command(&mut self.transport, &Command::ClearBuffer)
    }

    /// Read a control register by address
    pub fn register_read(&mut self, register: u8) -> Result<u16> {
        let register = check_register(register)?;
        write_command(&mut self.transport, &Command::RegisterRead { register })?;
        read_u16(&mut self.transport)
    }

    /// Write a control register by address
    pub fn register_write(&mut self, register: u8, value: u16) -> Result<()> {
        let register = check_register(register)?;
        write_command(&mut self.transport, &Command::RegisterWrite { register, value })
    }

    /// Ping the controller with a random nonce
    pub fn ping(&mut self) -> Result<()> {
        self.ping_with_nonce(rand::random::<u8>() & IMMEDIATE_MASK)
    }

    /// Ping the controller with the given nonce (only the low nibble is sent)
    pub fn ping_with_nonce(&mut self, nonce: u8) -> Result<()> {
        let nonce = nonce & IMMEDIATE_MASK;
        write_command(&mut self.transport, &Command::Ping { nonce })?;
        let pong = Pong::from_byte(read_u8(&mut self.transport)?);

        if pong.version != self.config.protocol_version {
            tracing::warn!(
                "Ping: device speaks protocol 0x{:X}, expected 0x{:X}",
                pong.version,
                self.config.protocol_version
            );
            return Err(LolError::VersionMismatch {
                expected: self.config.protocol_version,
                actual: pong.version,
            });
        }

        if pong.nonce != nonce {
            tracing::warn!("Ping: nonce 0x{:X} echoed as 0x{:X}", nonce, pong.nonce);
            return Err(LolError::NonceMismatch {
                expected: nonce,
                actual: pong.nonce,
            });
        }

        Ok(())
    }

    // =========================================================================
    // Lines
    // =========================================================================

    /// Push a line of pixels, lowest index first.
    ///
    /// The line must have exactly `display_height` pixels. Blocks while the
    /// display buffer is full and returns the number of free slots.
    ///
    /// A wrong-length line is rejected before any `PushLine` byte is sent.
    /// If the height is not cached yet, the first call still reads the
    /// `DisplayHeight` register to learn it, even when the line is then
    /// rejected.
    pub fn push_line(&mut self, pixels: &[bool]) -> Result<u8> {
        let expected = usize::from(self.display_height()?);
        if pixels.len() != expected {
            return Err(LolError::LineLength {
                expected,
                actual: pixels.len(),
            });
        }
        self.push_line_raw(&protocol::pack_line(pixels))
    }

    // =========================================================================
    // Registers
    // =========================================================================

    /// Number of vertical pixels (read once, then cached)
    pub fn display_height(&mut self) -> Result<u16> {
        if let Some(height) = self.display_height {
            return Ok(height);
        }
        let height = self.register_read(Register::DisplayHeight.address())?;
        tracing::debug!("Display height: {}", height);
        self.display_height = Some(height);
        Ok(height)
    }

    /// Number of horizontal pixels in one rotation (read once, then cached)
    pub fn display_width(&mut self) -> Result<u16> {
        if let Some(width) = self.display_width {
            return Ok(width);
        }
        let width = self.register_read(Register::DisplayWidth.address())?;
        tracing::debug!("Display width: {}", width);
        self.display_width = Some(width);
        Ok(width)
    }

    /// Current rotation speed in RPM, positive is clockwise
    pub fn rpm(&mut self) -> Result<f64> {
        Ok(signed_fixed_to_f64(self.register_read(Register::Rpm.address())?))
    }

    /// Pixel width over pixel height
    pub fn pixel_aspect_ratio(&mut self) -> Result<f64> {
        Ok(fixed_to_f64(self.register_read(Register::PixelAspectRatio.address())?))
    }

    /// Set the pixel aspect ratio; the controller may clamp it
    pub fn set_pixel_aspect_ratio(&mut self, ratio: f64) -> Result<()> {
        let raw = encode_aspect_ratio(ratio)?;
        self.register_write(Register::PixelAspectRatio.address(), raw)
    }

    /// Fraction of each pixel's time the LEDs are lit
    pub fn pixel_duty(&mut self) -> Result<f64> {
        Ok(fixed_to_f64(self.register_read(Register::PixelDuty.address())?))
    }

    /// Set the pixel duty, in (0.0, 1.0]; the controller may clamp it
    pub fn set_pixel_duty(&mut self, duty: f64) -> Result<()> {
        let raw = encode_duty(duty)?;
        self.register_write(Register::PixelDuty.address(), raw)
    }

    /// Display buffer capacity and occupancy
    pub fn buffer_size(&mut self) -> Result<BufferSize> {
        Ok(BufferSize::from_raw(self.register_read(Register::BufferSize.address())?))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the driver configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Borrow the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Give the transport back, ending the connection
    pub fn into_inner(self) -> T {
        self.transport
    }
}
