//! Generic stream transport
//!
//! Wraps any `Read + Write` byte stream, e.g. an already opened serial device.

use std::io::{self, Read, Write};

use super::Transport;

/// Transport over an arbitrary blocking byte stream.
///
/// Timeouts are whatever the underlying stream enforces. Pending input cannot
/// be discarded generically, so resync relies on the no-op flood alone.
#[derive(Debug)]
pub struct StreamTransport<S> {
    stream: S,
}

impl<S: Read + Write> StreamTransport<S> {
    /// Wrap a stream
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Borrow the underlying stream
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Mutably borrow the underlying stream
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Unwrap the underlying stream
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read + Write> Transport for StreamTransport<S> {
    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream.write_all(bytes)?;
        self.stream.flush()
    }

    fn receive(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.stream.read_exact(buf)
    }
}
