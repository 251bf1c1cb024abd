//! Simulated device
//!
//! Puts a [`Firmware`] behind the [`Transport`] trait.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{Firmware, SimConfig};
use crate::transport::Transport;

/// Everything shared between the transport and its handles
#[derive(Debug)]
struct SimState {
    firmware: Firmware,

    /// Every byte the host sent, in order
    wire: Vec<u8>,
}

/// A simulated controller reachable through the [`Transport`] trait.
///
/// Blocking is modelled by advancing display time: when the host waits on a
/// response the firmware is withholding, buffered lines are shown one at a
/// time until it answers. Waiting on a response that will never come fails
/// with [`io::ErrorKind::TimedOut`], as a serial port with a timeout would.
#[derive(Debug)]
pub struct SimulatedDevice {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedDevice {
    /// Power up a simulated controller
    pub fn new(config: SimConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                firmware: Firmware::new(config),
                wire: Vec::new(),
            })),
        }
    }

    /// Get a handle sharing this device
    pub fn handle(&self) -> SimHandle {
        SimHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl Transport for SimulatedDevice {
    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut state = self.state.lock();
        state.wire.extend_from_slice(bytes);
        state.firmware.feed(bytes);
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> io::Result<()> {
        let mut state = self.state.lock();
        let firmware = &mut state.firmware;

        firmware.pump();
        while firmware.output_len() < buf.len() {
            if firmware.is_blocked() && firmware.advance_display() {
                continue;
            }
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!(
                    "simulated controller sent {} of {} bytes",
                    firmware.output_len(),
                    buf.len()
                ),
            ));
        }

        firmware.read_output(buf);
        Ok(())
    }

    fn discard_pending_input(&mut self) -> io::Result<bool> {
        let mut state = self.state.lock();
        if !state.firmware.config().discard_supported {
            return Ok(false);
        }
        state.firmware.settle();
        Ok(true)
    }
}

/// Shared view of a [`SimulatedDevice`] for inspection and fault injection
#[derive(Debug, Clone)]
pub struct SimHandle {
    state: Arc<Mutex<SimState>>,
}

impl SimHandle {
    /// Run a closure against the firmware
    pub fn with_firmware<R>(&self, f: impl FnOnce(&mut Firmware) -> R) -> R {
        f(&mut self.state.lock().firmware)
    }

    /// Every byte the host has sent
    pub fn wire(&self) -> Vec<u8> {
        self.state.lock().wire.clone()
    }

    /// Forget the bytes sent so far
    pub fn clear_wire(&self) {
        self.state.lock().wire.clear();
    }

    /// Feed bytes to the firmware without logging them, as if an earlier
    /// session had sent them
    pub fn inject(&self, bytes: &[u8]) {
        self.with_firmware(|fw| fw.feed(bytes));
    }

    /// Raw register value
    pub fn register(&self, register: u8) -> u16 {
        self.with_firmware(|fw| fw.register(register))
    }

    /// Overwrite a register
    pub fn set_register(&self, register: u8, value: u16) {
        self.with_firmware(|fw| fw.set_register(register, value));
    }

    /// The most recent lines that reached the display
    pub fn shown_lines(&self) -> Vec<Vec<u8>> {
        self.with_firmware(|fw| fw.shown_lines())
    }

    /// Number of lines that reached the display
    pub fn shown_count(&self) -> u64 {
        self.with_firmware(|fw| fw.shown_count())
    }

    /// Lines waiting in the display buffer
    pub fn buffered_lines(&self) -> usize {
        self.with_firmware(|fw| fw.buffered_lines())
    }

    /// Unread response bytes
    pub fn pending_output(&self) -> usize {
        self.with_firmware(|fw| fw.output_len())
    }

    /// True while the firmware is between commands
    pub fn is_idle(&self) -> bool {
        self.with_firmware(|fw| fw.is_idle())
    }

    /// Change fault knobs at runtime
    pub fn configure(&self, f: impl FnOnce(&mut SimConfig)) {
        self.with_firmware(|fw| f(fw.config_mut()));
    }
}
