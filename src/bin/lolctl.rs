//! Line of Life control CLI
//!
//! Diagnostics for a display reached over a serial-to-TCP bridge, or for the
//! built-in simulator.

use clap::{Parser, Subcommand};
use line_of_life::sim::{SimConfig, SimulatedDevice};
use line_of_life::transport::{TcpTransport, Transport};
use line_of_life::{Config, LineOfLife, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Line of Life control CLI
#[derive(Parser, Debug)]
#[command(name = "lolctl")]
#[command(about = "Talk to a Line of Life POV display")]
#[command(version)]
struct Args {
    /// Serial bridge address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:4001", conflicts_with = "simulate")]
    addr: String,

    /// Use a simulated display instead of real hardware
    #[arg(long)]
    simulate: bool,

    /// Read timeout in milliseconds
    #[arg(long, default_value = "1000")]
    read_timeout_ms: u64,

    /// Number of no-ops sent when resynchronising
    #[arg(long, default_value = "100")]
    resync_noops: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ping the display
    Ping,

    /// Print display geometry and register values
    Info,

    /// Force the display back to its idle state
    Resync,

    /// Empty the display buffer
    Clear,

    /// Wait for the display buffer to drain
    Flush,

    /// Set the pixel aspect ratio (width / height)
    SetAspect {
        /// The ratio, e.g. 1.0
        ratio: f64,
    },

    /// Set the pixel duty cycle
    SetDuty {
        /// The duty, in (0.0, 1.0]
        duty: f64,
    },

    /// Push a stripe test pattern
    TestPattern {
        /// Number of times to repeat the pattern
        #[arg(short, long, default_value = "5")]
        repeat: usize,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,line_of_life=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("lolctl v{}", line_of_life::VERSION);

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let transport: Box<dyn Transport> = if args.simulate {
        tracing::info!("Using simulated display");
        Box::new(SimulatedDevice::new(SimConfig::default()))
    } else {
        tracing::info!("Connecting to {}", args.addr);
        match TcpTransport::connect(&args.addr, &config) {
            Ok(t) => Box::new(t),
            Err(e) => {
                tracing::error!("Failed to connect to {}: {}", args.addr, e);
                std::process::exit(1);
            }
        }
    };

    let mut display = match LineOfLife::with_config(transport, config) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("Failed to synchronise with display: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&mut display, args.command) {
        tracing::error!("Command failed ({:?}): {}", e.kind(), e);
        std::process::exit(1);
    }
}

/// Build the driver configuration from the command line, rejecting bad
/// values before any connection is attempted
fn build_config(args: &Args) -> Result<Config> {
    let config = Config::builder()
        .read_timeout_ms(args.read_timeout_ms)
        .resync_noop_count(args.resync_noops)
        .build();
    config.validate()?;
    Ok(config)
}

fn run<T: Transport>(display: &mut LineOfLife<T>, command: Commands) -> Result<()> {
    match command {
        Commands::Ping => {
            display.ping()?;
            println!("pong");
        }
        Commands::Info => {
            let buffer = display.buffer_size()?;
            println!("height:       {}", display.display_height()?);
            println!("width:        {}", display.display_width()?);
            println!("rpm:          {:.2}", display.rpm()?);
            println!("aspect ratio: {:.3}", display.pixel_aspect_ratio()?);
            println!("pixel duty:   {:.3}", display.pixel_duty()?);
            println!("buffer:       {}/{}", buffer.occupancy, buffer.capacity);
        }
        Commands::Resync => {
            display.resync()?;
            println!("idle");
        }
        Commands::Clear => display.clear_buffer()?,
        Commands::Flush => display.flush_buffer()?,
        Commands::SetAspect { ratio } => display.set_pixel_aspect_ratio(ratio)?,
        Commands::SetDuty { duty } => display.set_pixel_duty(duty)?,
        Commands::TestPattern { repeat } => {
            let height = usize::from(display.display_height()?);
            let line_bytes = line_of_life::protocol::payload_len(height);
            let pattern: [u8; 7] = [0xFF, 0x55, 0xAA, 0x55, 0xFF, 0x00, 0x00];
            for _ in 0..repeat {
                for byte in pattern {
                    let free = display.push_line_raw(&vec![byte; line_bytes])?;
                    tracing::debug!("Pushed 0x{:02X} line, {} slots free", byte, free);
                }
            }
            display.flush_buffer()?;
            println!("pushed {} lines", repeat * pattern.len());
        }
    }
    Ok(())
}
