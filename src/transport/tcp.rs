//! TCP transport
//!
//! For controllers reached through a serial-to-TCP bridge.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::Config;

use super::Transport;

/// Transport over a TCP connection to a serial bridge
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,

    /// Peer address for logging
    peer_addr: String,
}

impl TcpTransport {
    /// Connect to a bridge, applying the timeouts from `config`
    pub fn connect(addr: impl ToSocketAddrs, config: &Config) -> io::Result<Self> {
        let connect_timeout = Duration::from_millis(config.connect_timeout_ms);
        let mut last_err = None;

        for candidate in addr.to_socket_addrs()? {
            match TcpStream::connect_timeout(&candidate, connect_timeout) {
                Ok(stream) => return Self::from_stream(stream, config),
                Err(e) => {
                    tracing::debug!("Connecting to {} failed: {}", candidate, e);
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing")
        }))
    }

    /// Use an already connected stream
    pub fn from_stream(stream: TcpStream, config: &Config) -> io::Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a: SocketAddr| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Commands are tiny; do not let Nagle hold them back
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(Duration::from_millis(config.read_timeout_ms)))?;
        stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;

        tracing::debug!("Connected to {}", peer_addr);
        Ok(Self { stream, peer_addr })
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Borrow the underlying stream
    pub fn get_ref(&self) -> &TcpStream {
        &self.stream
    }

    /// Unwrap the underlying stream
    pub fn into_inner(self) -> TcpStream {
        self.stream
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream.write_all(bytes)?;
        self.stream.flush()
    }

    fn receive(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.stream.read_exact(buf)
    }

    fn discard_pending_input(&mut self) -> io::Result<bool> {
        self.stream.set_nonblocking(true)?;

        let mut scratch = [0u8; 256];
        let mut dropped = 0usize;
        let drained = loop {
            match self.stream.read(&mut scratch) {
                Ok(0) => break Ok(()),
                Ok(n) => dropped += n,
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break Ok(()),
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => break Err(e),
            }
        };

        // Restore blocking mode even if draining failed
        self.stream.set_nonblocking(false)?;
        drained?;

        tracing::debug!("Discarded {} stale bytes from {}", dropped, self.peer_addr);
        Ok(true)
    }
}
