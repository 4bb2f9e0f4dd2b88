mod decode;
mod output;
mod poll;

use std::io::stderr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use dvl::Acquisition;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll a DVL over a serial port and print each decoded ensemble.
    ///
    /// Runs until interrupted (Ctrl-C) or --count cycles have completed. Cycle
    /// statistics are written to stderr as JSON on exit.
    Poll {
        /// Serial device the DVL is attached to, e.g., /dev/ttyUSB0.
        #[arg(short, long, value_name = "path")]
        port: String,

        /// Serial baud rate. Must match the instrument configuration.
        #[arg(short, long, default_value_t = 9600)]
        baud: u32,

        /// Acquisition cycles per second.
        #[arg(short, long, default_value_t = 10.0, value_name = "hz")]
        rate: f64,

        /// PD output format the DVL is configured for. Only 5 is supported.
        #[arg(long, default_value_t = 5, value_name = "n")]
        pd_format: u8,

        /// Maximum time to wait for a full read window each cycle.
        #[arg(long, default_value_t = 1000, value_name = "ms")]
        timeout_ms: u64,

        /// Stop after this many cycles.
        #[arg(short, long, value_name = "n")]
        count: Option<u64>,

        /// Output format
        #[arg(short, long, default_value = "json")]
        output: output::Format,
    },
    /// Decode a file of raw DVL output captured from the serial port.
    ///
    /// The file is consumed one read window at a time, exactly as the serial port
    /// would be, so frames split across window boundaries are not recovered.
    Decode {
        /// Input capture file
        input: PathBuf,

        /// PD output format the capture was recorded with.
        #[arg(long, default_value_t = 5, value_name = "n")]
        pd_format: u8,

        /// Output format
        #[arg(short, long, default_value = "text")]
        output: output::Format,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_env("DVL_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Poll {
            port,
            baud,
            rate,
            pd_format,
            timeout_ms,
            count,
            output,
        } => {
            if !(rate.is_finite() && *rate > 0.0) {
                bail!("--rate must be a positive number of cycles per second");
            }
            let acquisition = Acquisition::builder()
                .format(*pd_format)
                .timeout(Duration::from_millis(*timeout_ms))
                .build();
            poll::poll(port, *baud, acquisition, *rate, *count, output)
        }
        Commands::Decode {
            input,
            pd_format,
            output,
        } => decode::decode(input, *pd_format, output),
    }
}
