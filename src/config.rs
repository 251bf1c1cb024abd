//! Configuration for Line of Life
//!
//! Centralized configuration with sensible defaults.

use crate::error::{LolError, Result};
use crate::protocol::PROTOCOL_VERSION;

/// Fewest no-ops a resync may send.
///
/// The longest fixed-size command is `RegisterWrite`: one opcode byte and two
/// payload bytes. `PushLine` is handled separately once the height is known.
pub const MIN_RESYNC_NOOPS: usize = 3;

/// Main configuration for a driver instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Protocol version the device must report in its ping response
    pub protocol_version: u8,

    /// Number of no-ops sent by a resync before pinging
    pub resync_noop_count: usize,

    /// Drop unread input after the no-op flood, if the transport can
    pub discard_on_resync: bool,

    // -------------------------------------------------------------------------
    // Link Configuration
    // -------------------------------------------------------------------------
    /// Connect timeout for network-bridged links (milliseconds)
    pub connect_timeout_ms: u64,

    /// Read timeout (milliseconds)
    pub read_timeout_ms: u64,

    /// Write timeout (milliseconds)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            resync_noop_count: 100,
            discard_on_resync: true,
            connect_timeout_ms: 2000,
            read_timeout_ms: 1000,
            write_timeout_ms: 1000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the configuration can drive a device
    pub fn validate(&self) -> Result<()> {
        if self.protocol_version > 0xF {
            return Err(LolError::Config(format!(
                "protocol version 0x{:X} does not fit in a nibble",
                self.protocol_version
            )));
        }
        if self.resync_noop_count < MIN_RESYNC_NOOPS {
            return Err(LolError::Config(format!(
                "resync_noop_count {} is below the minimum of {}",
                self.resync_noop_count, MIN_RESYNC_NOOPS
            )));
        }
        if self.read_timeout_ms == 0 || self.write_timeout_ms == 0 || self.connect_timeout_ms == 0 {
            return Err(LolError::Config("timeouts must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the expected protocol version
    pub fn protocol_version(mut self, version: u8) -> Self {
        self.config.protocol_version = version;
        self
    }

    /// Set the number of no-ops sent on resync
    pub fn resync_noop_count(mut self, count: usize) -> Self {
        self.config.resync_noop_count = count;
        self
    }

    /// Enable or disable discarding stale input during resync
    pub fn discard_on_resync(mut self, discard: bool) -> Self {
        self.config.discard_on_resync = discard;
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
