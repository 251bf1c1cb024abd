//! Tests for the transport implementations
//!
//! These tests verify:
//! - StreamTransport over an in-memory byte stream
//! - Driving a display through StreamTransport, without input discard
//! - TcpTransport against a local bridge serving a simulated controller
//! - Read timeouts surfacing as transport errors

use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

use line_of_life::sim::{Firmware, SimConfig};
use line_of_life::transport::{StreamTransport, TcpTransport};
use line_of_life::{Config, ErrorKind, LineOfLife, LolError, Transport};

// =============================================================================
// Helper Functions
// =============================================================================

/// A byte stream with a controller on the other end.
///
/// Reads advance display time whenever the firmware withholds a response,
/// so a blocked push behaves like a slow serial line rather than a hang.
struct FirmwareStream {
    firmware: Firmware,
    written: Vec<u8>,
}

impl FirmwareStream {
    fn new(config: SimConfig) -> Self {
        Self {
            firmware: Firmware::new(config),
            written: Vec::new(),
        }
    }
}

impl Read for FirmwareStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.firmware.output_len() == 0 {
            if !(self.firmware.is_blocked() && self.firmware.advance_display()) {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "no response"));
            }
        }
        Ok(self.firmware.read_output(buf))
    }
}

impl Write for FirmwareStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.extend_from_slice(buf);
        self.firmware.feed(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Serve one connection as a serial bridge would, then return the firmware
fn spawn_bridge(config: SimConfig) -> (String, thread::JoinHandle<Firmware>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut firmware = Firmware::new(config);
        let mut buf = [0u8; 256];

        loop {
            let n = match stream.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            firmware.feed(&buf[..n]);
            while firmware.is_blocked() && firmware.advance_display() {}
            let output = firmware.take_output();
            if !output.is_empty() && stream.write_all(&output).is_err() {
                break;
            }
        }
        firmware
    });

    (addr, server)
}

fn fast_config() -> Config {
    Config::builder().read_timeout_ms(200).build()
}

// =============================================================================
// StreamTransport Tests
// =============================================================================

#[test]
fn test_stream_send_and_receive() {
    let mut transport = StreamTransport::new(FirmwareStream::new(SimConfig::default()));

    transport.send(&[0x41]).unwrap();
    let mut buf = [0u8; 2];
    transport.receive(&mut buf).unwrap();

    assert_eq!(buf, [0x00, 200]);
    assert_eq!(transport.get_ref().written, vec![0x41]);
}

#[test]
fn test_stream_receive_short_read_fails() {
    let mut transport = StreamTransport::new(io::Cursor::new(vec![0x12]));

    let mut buf = [0u8; 2];
    let err = transport.receive(&mut buf).unwrap_err();

    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}

#[test]
fn test_stream_cannot_discard() {
    let mut transport = StreamTransport::new(io::Cursor::new(Vec::new()));

    assert!(!transport.discard_pending_input().unwrap());
}

#[test]
fn test_display_over_stream() {
    let stream = FirmwareStream::new(SimConfig::default().height(24).buffer_capacity(2));
    let mut display = LineOfLife::new(StreamTransport::new(stream)).unwrap();

    for i in 0..5 {
        let line: Vec<bool> = (0..24).map(|p| p % 5 == i).collect();
        assert!(display.push_line(&line).unwrap() >= 1);
    }
    display.flush_buffer().unwrap();

    let stream = display.into_inner().into_inner();
    assert_eq!(stream.firmware.shown_lines().len(), 5);
    assert_eq!(stream.written[..100], [0x00; 100]);
}

#[test]
fn test_stream_resync_without_discard() {
    let mut stream = FirmwareStream::new(SimConfig::default());
    // A half-finished register write from an earlier session
    stream.firmware.feed(&[0x53, 0x01]);

    let mut display = LineOfLife::new(StreamTransport::new(stream)).unwrap();

    display.ping().unwrap();
    assert_eq!(display.pixel_aspect_ratio().unwrap(), 1.0);
}

#[test]
fn test_borrowed_transport() {
    let mut transport = StreamTransport::new(FirmwareStream::new(SimConfig::default()));

    {
        let mut display = LineOfLife::new(&mut transport).unwrap();
        display.set_pixel_duty(0.5).unwrap();
    }

    assert_eq!(transport.get_ref().firmware.register(4), 0x0080);
}

#[test]
fn test_boxed_transport() {
    let transport: Box<dyn Transport> =
        Box::new(StreamTransport::new(FirmwareStream::new(SimConfig::default())));

    let mut display = LineOfLife::new(transport).unwrap();

    assert_eq!(display.display_width().unwrap(), 200);
}

// =============================================================================
// TcpTransport Tests
// =============================================================================

#[test]
fn test_tcp_display_session() {
    let (addr, server) = spawn_bridge(SimConfig::default().height(16).buffer_capacity(3));
    let config = fast_config();

    let transport = TcpTransport::connect(addr.as_str(), &config).unwrap();
    assert_eq!(transport.peer_addr(), addr);

    let mut display = LineOfLife::with_config(transport, config).unwrap();
    assert_eq!(display.display_height().unwrap(), 16);
    for _ in 0..6 {
        assert!(display.push_line(&[true; 16]).unwrap() >= 1);
    }
    display.flush_buffer().unwrap();
    display.set_pixel_aspect_ratio(0.5).unwrap();
    assert_eq!(display.pixel_aspect_ratio().unwrap(), 0.5);

    drop(display);
    let firmware = server.join().unwrap();
    assert_eq!(firmware.shown_lines().len(), 6);
    assert_eq!(firmware.register(3), 0x0080);
}

#[test]
fn test_tcp_read_timeout() {
    let (addr, server) = spawn_bridge(SimConfig::default().silent(true));
    let config = fast_config();
    let transport = TcpTransport::connect(addr.as_str(), &config).unwrap();

    let err = LineOfLife::with_config(transport, config).err().unwrap();

    assert_eq!(err.kind(), ErrorKind::Transport);
    match err {
        LolError::Transport(e) => assert!(matches!(
            e.kind(),
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
        )),
        other => panic!("Expected Transport error, got {:?}", other),
    }

    server.join().unwrap();
}

#[test]
fn test_tcp_connect_refused() {
    // Bind then drop to find a port nobody listens on
    let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();

    let result = TcpTransport::connect(addr, &fast_config());

    assert!(result.is_err());
}

#[test]
fn test_tcp_discard_drops_stale_bytes() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream.write_all(&[0xAA, 0xBB, 0xCC]).unwrap();
        let mut byte = [0u8; 1];
        stream.read_exact(&mut byte).unwrap();
        stream.write_all(&[0x42]).unwrap();
    });

    let mut transport =
        TcpTransport::from_stream(TcpStream::connect(addr).unwrap(), &fast_config()).unwrap();
    // Wait until the stale bytes have arrived
    let mut peek = [0u8; 3];
    while transport.get_ref().peek(&mut peek).unwrap() < 3 {}

    assert!(transport.discard_pending_input().unwrap());
    transport.send(&[0x00]).unwrap();
    let mut buf = [0u8; 1];
    transport.receive(&mut buf).unwrap();

    assert_eq!(buf, [0x42]);
    server.join().unwrap();
}
