//! Simulator Module
//!
//! A host-side model of the controller firmware's wire behaviour.
//!
//! ## Components
//! - [`Firmware`]: byte-at-a-time command state machine with a display buffer
//!   and register file; time only moves when [`Firmware::advance_display`] is
//!   called
//! - [`SimulatedDevice`]: a [`Transport`](crate::transport::Transport) that
//!   drives a `Firmware`, advancing display time whenever the host blocks on
//!   a withheld response
//! - [`SimHandle`]: shared view of the same device for inspection and fault
//!   injection while a driver owns the transport

mod firmware;
mod device;

pub use firmware::{Firmware, SimConfig};
pub use device::{SimHandle, SimulatedDevice};
