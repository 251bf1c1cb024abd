//! Firmware model
//!
//! Mirrors the controller's command loop: one command at a time, fixed-size
//! payloads, responses withheld while the display buffer cannot accept work.

use std::collections::VecDeque;
use std::mem;

use crate::protocol::{
    payload_len, BufferSize, Opcode, Pong, Register, IMMEDIATE_MASK, PROTOCOL_VERSION,
};

/// Number of addressable registers (one immediate nibble)
const REGISTER_COUNT: usize = 16;

/// Displayed lines remembered by default
pub const DEFAULT_SHOWN_HISTORY: usize = 4096;

/// Simulated controller parameters and fault knobs
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Vertical resolution (LEDs)
    pub height: u16,

    /// Horizontal resolution of one rotation
    pub width: u16,

    /// Display buffer slots
    pub buffer_capacity: u8,

    /// Raw `Rpm` register value (signed 8.8)
    pub rpm_raw: u16,

    /// Protocol version reported in ping responses
    pub protocol_version: u8,

    /// XORed into echoed nonces; non-zero simulates a corrupted echo
    pub nonce_xor: u8,

    /// Consume commands but never answer
    pub silent: bool,

    /// Ignore writes to read-only registers, as the firmware does.
    ///
    /// Off by default: the register file then stores every write, which makes
    /// raw register round trips observable on every address.
    pub enforce_read_only: bool,

    /// Whether the simulated link can drop unread input
    pub discard_supported: bool,

    /// Most recent displayed lines kept for inspection; 0 keeps none
    pub shown_history: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            height: 120,
            width: 200,
            buffer_capacity: 8,
            rpm_raw: 0x0100, // 1.0 RPM, clockwise
            protocol_version: PROTOCOL_VERSION,
            nonce_xor: 0,
            silent: false,
            enforce_read_only: false,
            discard_supported: true,
            shown_history: DEFAULT_SHOWN_HISTORY,
        }
    }
}

impl SimConfig {
    /// Set the vertical resolution
    pub fn height(mut self, height: u16) -> Self {
        self.height = height;
        self
    }

    /// Set the horizontal resolution
    pub fn width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    /// Set the number of buffer slots
    pub fn buffer_capacity(mut self, capacity: u8) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Set the raw RPM register
    pub fn rpm_raw(mut self, raw: u16) -> Self {
        self.rpm_raw = raw;
        self
    }

    /// Report a different protocol version
    pub fn protocol_version(mut self, version: u8) -> Self {
        self.protocol_version = version;
        self
    }

    /// Corrupt echoed nonces
    pub fn nonce_xor(mut self, mask: u8) -> Self {
        self.nonce_xor = mask;
        self
    }

    /// Never answer
    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Ignore writes to read-only registers
    pub fn enforce_read_only(mut self, enforce: bool) -> Self {
        self.enforce_read_only = enforce;
        self
    }

    /// Allow or forbid discarding unread input
    pub fn discard_supported(mut self, supported: bool) -> Self {
        self.discard_supported = supported;
        self
    }

    /// Limit how many displayed lines are remembered
    pub fn shown_history(mut self, lines: usize) -> Self {
        self.shown_history = lines;
        self
    }
}

/// Where the command loop is
#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    /// Waiting for a command byte
    Idle,

    /// Collecting a line payload
    PushLine(Vec<u8>),

    /// Collecting a register value
    RegisterWrite { register: u8, high: Option<u8> },

    /// Line received, waiting for a buffer slot
    AwaitingSlot(Vec<u8>),

    /// Line buffered, waiting for a free slot before answering
    AwaitingFree,

    /// Waiting for the buffer to drain before answering a flush
    AwaitingDrain,
}

/// Controller state machine
#[derive(Debug)]
pub struct Firmware {
    config: SimConfig,
    registers: [u16; REGISTER_COUNT],
    phase: Phase,

    /// Bytes received but not yet processed
    input: VecDeque<u8>,

    /// Bytes produced but not yet read by the host
    output: VecDeque<u8>,

    /// Lines waiting to be displayed
    buffer: VecDeque<Vec<u8>>,

    /// Line on display
    current: Option<Vec<u8>>,

    /// Most recent lines that reached the display, oldest first
    shown: VecDeque<Vec<u8>>,

    /// Lines that reached the display, including forgotten ones
    shown_total: u64,
}

impl Firmware {
    /// Power up a controller
    pub fn new(config: SimConfig) -> Self {
        let mut registers = [0u16; REGISTER_COUNT];
        registers[Register::DisplayHeight as usize] = config.height;
        registers[Register::DisplayWidth as usize] = config.width;
        registers[Register::Rpm as usize] = config.rpm_raw;
        registers[Register::PixelAspectRatio as usize] = 0x0100;
        registers[Register::PixelDuty as usize] = 0x0100;

        let mut firmware = Self {
            config,
            registers,
            phase: Phase::Idle,
            input: VecDeque::new(),
            output: VecDeque::new(),
            buffer: VecDeque::new(),
            current: None,
            shown: VecDeque::new(),
            shown_total: 0,
        };
        firmware.refresh_buffer_register();
        firmware
    }

    /// Get the configuration
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Change fault knobs at runtime
    pub fn config_mut(&mut self) -> &mut SimConfig {
        &mut self.config
    }

    // =========================================================================
    // Link Side
    // =========================================================================

    /// Receive bytes from the host and process as far as possible
    pub fn feed(&mut self, bytes: &[u8]) {
        self.input.extend(bytes);
        self.pump();
    }

    /// Process buffered input until it runs out or a command blocks
    pub fn pump(&mut self) {
        loop {
            if self.is_blocked() {
                if !self.try_unblock() {
                    return;
                }
                continue;
            }
            match self.input.pop_front() {
                Some(byte) => self.step(byte),
                None => return,
            }
        }
    }

    /// True while a response is withheld for lack of buffer space or drain
    pub fn is_blocked(&self) -> bool {
        matches!(
            self.phase,
            Phase::AwaitingSlot(_) | Phase::AwaitingFree | Phase::AwaitingDrain
        )
    }

    /// True while the controller is between commands
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// Bytes ready for the host
    pub fn output_len(&self) -> usize {
        self.output.len()
    }

    /// Move ready bytes into `buf`; returns how many were copied
    pub fn read_output(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.output.len());
        for (slot, byte) in buf.iter_mut().zip(self.output.drain(..n)) {
            *slot = byte;
        }
        n
    }

    /// Take every ready byte
    pub fn take_output(&mut self) -> Vec<u8> {
        self.output.drain(..).collect()
    }

    /// Run until nothing is blocked, then drop any unread output
    pub fn settle(&mut self) {
        self.pump();
        while self.is_blocked() && self.advance_display() {}
        self.output.clear();
    }

    // =========================================================================
    // Display Side
    // =========================================================================

    /// Move the next buffered line onto the display.
    ///
    /// Returns false if the buffer was empty.
    pub fn advance_display(&mut self) -> bool {
        let Some(line) = self.buffer.pop_front() else {
            return false;
        };
        self.shown_total += 1;
        if self.config.shown_history > 0 {
            while self.shown.len() >= self.config.shown_history {
                self.shown.pop_front();
            }
            self.shown.push_back(line.clone());
        }
        self.current = Some(line);
        self.refresh_buffer_register();
        self.pump();
        true
    }

    /// The most recent lines that reached the display, oldest first.
    ///
    /// At most `SimConfig::shown_history` lines are kept.
    pub fn shown_lines(&self) -> Vec<Vec<u8>> {
        self.shown.iter().cloned().collect()
    }

    /// Number of lines that reached the display, whether remembered or not
    pub fn shown_count(&self) -> u64 {
        self.shown_total
    }

    /// The line on display
    pub fn current_line(&self) -> Option<&[u8]> {
        self.current.as_deref()
    }

    /// Lines waiting in the buffer
    pub fn buffered_lines(&self) -> usize {
        self.buffer.len()
    }

    // =========================================================================
    // Registers
    // =========================================================================

    /// Raw register value
    pub fn register(&self, register: u8) -> u16 {
        self.registers[usize::from(register & IMMEDIATE_MASK)]
    }

    /// Overwrite a register, bypassing access checks
    pub fn set_register(&mut self, register: u8, value: u16) {
        self.registers[usize::from(register & IMMEDIATE_MASK)] = value;
    }

    // =========================================================================
    // Command Loop
    // =========================================================================

    fn step(&mut self, byte: u8) {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => self.start_command(byte),
            Phase::PushLine(mut line) => {
                line.push(byte);
                self.phase = if line.len() == self.line_len() {
                    Phase::AwaitingSlot(line)
                } else {
                    Phase::PushLine(line)
                };
            }
            Phase::RegisterWrite { register, high: None } => {
                self.phase = Phase::RegisterWrite {
                    register,
                    high: Some(byte),
                };
            }
            Phase::RegisterWrite {
                register,
                high: Some(high),
            } => self.write_register(register, u16::from_be_bytes([high, byte])),
            blocked => {
                // pump never steps while blocked
                self.phase = blocked;
                self.input.push_front(byte);
            }
        }
    }

    fn start_command(&mut self, byte: u8) {
        let immediate = byte & IMMEDIATE_MASK;
        match Opcode::from_byte(byte) {
            Some(Opcode::NoOp) => {}
            Some(Opcode::PushLine) => {
                self.phase = if self.line_len() == 0 {
                    Phase::AwaitingSlot(Vec::new())
                } else {
                    Phase::PushLine(Vec::with_capacity(self.line_len()))
                };
            }
            Some(Opcode::FlushBuffer) => self.phase = Phase::AwaitingDrain,
            Some(Opcode::ClearBuffer) => {
                self.buffer.clear();
                self.refresh_buffer_register();
            }
            Some(Opcode::RegisterRead) => {
                let value = self.register(immediate);
                for byte in value.to_be_bytes() {
                    self.respond(byte);
                }
            }
            Some(Opcode::RegisterWrite) => {
                self.phase = Phase::RegisterWrite {
                    register: immediate,
                    high: None,
                };
            }
            Some(Opcode::Ping) => {
                let pong = Pong {
                    version: self.config.protocol_version,
                    nonce: immediate ^ (self.config.nonce_xor & IMMEDIATE_MASK),
                };
                self.respond(pong.to_byte());
            }
            None => tracing::trace!("Firmware ignoring unknown command 0x{:02X}", byte),
        }
    }

    fn try_unblock(&mut self) -> bool {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::AwaitingSlot(line) => {
                if self.buffer.len() < usize::from(self.config.buffer_capacity) {
                    self.buffer.push_back(line);
                    self.refresh_buffer_register();
                    self.phase = Phase::AwaitingFree;
                    self.try_unblock()
                } else {
                    self.phase = Phase::AwaitingSlot(line);
                    false
                }
            }
            Phase::AwaitingFree => {
                let free = self.free_slots();
                if free > 0 {
                    self.respond(free);
                    true
                } else {
                    self.phase = Phase::AwaitingFree;
                    false
                }
            }
            Phase::AwaitingDrain => {
                if self.buffer.is_empty() {
                    self.respond(0x00);
                    true
                } else {
                    self.phase = Phase::AwaitingDrain;
                    false
                }
            }
            other => {
                self.phase = other;
                true
            }
        }
    }

    fn write_register(&mut self, register: u8, value: u16) {
        let writable = Register::from_address(register).is_some_and(Register::is_writable);
        if self.config.enforce_read_only && !writable {
            tracing::trace!("Firmware ignoring write to read-only register {}", register);
            return;
        }
        self.set_register(register, value);
    }

    fn respond(&mut self, byte: u8) {
        if !self.config.silent {
            self.output.push_back(byte);
        }
    }

    fn line_len(&self) -> usize {
        payload_len(usize::from(self.config.height))
    }

    fn free_slots(&self) -> u8 {
        usize::from(self.config.buffer_capacity).saturating_sub(self.buffer.len()) as u8
    }

    fn refresh_buffer_register(&mut self) {
        let size = BufferSize {
            capacity: self.config.buffer_capacity,
            occupancy: self.buffer.len() as u8,
        };
        self.set_register(Register::BufferSize as u8, size.to_raw());
    }
}
