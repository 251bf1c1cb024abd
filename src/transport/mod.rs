//! Transport Module
//!
//! The byte link between host and controller.
//!
//! ## Contract
//! - `send` writes every byte or fails
//! - `receive` blocks until the buffer is full, or fails (timeouts included)
//! - `discard_pending_input` is optional; transports without it report `false`
//!
//! Errors are plain `std::io::Error`s and reach the caller unchanged.

mod stream;
mod tcp;

pub use stream::StreamTransport;
pub use tcp::TcpTransport;

use std::io;

/// Blocking, byte-oriented link to a controller
pub trait Transport {
    /// Write all bytes to the link
    fn send(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Fill `buf` from the link, blocking until it is full or the link fails
    fn receive(&mut self, buf: &mut [u8]) -> io::Result<()>;

    /// Drop any bytes received but not yet read.
    ///
    /// Returns `Ok(false)` if the transport has no way to do this.
    fn discard_pending_input(&mut self) -> io::Result<bool> {
        Ok(false)
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).send(bytes)
    }

    fn receive(&mut self, buf: &mut [u8]) -> io::Result<()> {
        (**self).receive(buf)
    }

    fn discard_pending_input(&mut self) -> io::Result<bool> {
        (**self).discard_pending_input()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).send(bytes)
    }

    fn receive(&mut self, buf: &mut [u8]) -> io::Result<()> {
        (**self).receive(buf)
    }

    fn discard_pending_input(&mut self) -> io::Result<bool> {
        (**self).discard_pending_input()
    }
}
