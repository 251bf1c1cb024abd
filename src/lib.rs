//! # Line of Life
//!
//! Host-side driver for the Line of Life rotating POV LED display:
//! - Opcode/immediate command framing over a byte link
//! - Flow-controlled line streaming (the controller withholds responses)
//! - Resynchronisation from an unknown controller state
//! - Typed, cached access to the control registers
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Line Source                             │
//! │            (image columns, automata, patterns)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ push_line(&[bool])
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   LineOfLife driver                          │
//! │       (resync, ping, registers, cached geometry)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ command bytes / fixed-size responses
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌───────────────┐
//!   │  Transport  │          │ SimulatedDev. │
//!   │ (TCP/stream)│          │  (Firmware)   │
//!   └─────────────┘          └───────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use line_of_life::sim::{SimConfig, SimulatedDevice};
//! use line_of_life::LineOfLife;
//!
//! let device = SimulatedDevice::new(SimConfig::default().height(40));
//! let mut display = LineOfLife::new(device)?;
//! display.set_pixel_duty(0.75)?;
//! let free = display.push_line(&[true; 40])?;
//! assert!(free > 0);
//! # Ok::<(), line_of_life::LolError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod transport;
pub mod driver;
pub mod sim;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ErrorKind, LolError, Result};
pub use config::Config;
pub use driver::LineOfLife;
pub use transport::Transport;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the Line of Life driver
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
