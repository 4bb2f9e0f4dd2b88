use std::io::{stderr, stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel::bounded;
use dvl::{Acquisition, Poller, ReaderTransport};
use tracing::{info, warn};

use crate::output::{self, Format};

/// Per-read timeout on the serial port. Kept short so the acquisition timeout,
/// which spans many reads, is what bounds a cycle.
const PORT_READ_TIMEOUT: Duration = Duration::from_millis(10);

pub fn poll(
    port: &str,
    baud: u32,
    acquisition: Acquisition,
    rate: f64,
    count: Option<u64>,
    format: &Format,
) -> Result<()> {
    let serial = serialport::new(port, baud)
        .data_bits(serialport::DataBits::Eight)
        .parity(serialport::Parity::None)
        .stop_bits(serialport::StopBits::One)
        .flow_control(serialport::FlowControl::None)
        .timeout(PORT_READ_TIMEOUT)
        .open()
        .with_context(|| format!("failed to open serial port {port}"))?;
    let mut transport = ReaderTransport::new(serial);

    let (shutdown_tx, shutdown_rx) = bounded(1);
    ctrlc::set_handler(move || {
        if shutdown_tx.try_send(()).is_err() {
            warn!("shutdown already requested");
        }
    })
    .context("installing interrupt handler")?;

    let poller = match count {
        Some(count) => Poller::builder()
            .acquisition(acquisition)
            .rate_hz(rate)
            .max_cycles(count)
            .build(),
        None => Poller::builder()
            .acquisition(acquisition)
            .rate_hz(rate)
            .build(),
    };

    info!(port, baud, rate, "polling");
    let mut publisher = output::publisher(format, stdout());
    let stats = poller.run(&mut transport, publisher.as_mut(), &shutdown_rx);
    info!(cycles = stats.cycles, published = stats.published, "stopped");

    output::write_summary(&Format::Json, &stats, stderr())
}
