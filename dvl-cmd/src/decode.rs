use std::collections::BTreeMap;
use std::fs::File;
use std::io::{stdout, Read};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use dvl::framing::RawBuffer;
use dvl::{decode_window, Error, OutcomeCode, Publisher, ReaderTransport};
use serde::Serialize;
use tracing::{debug, warn};

use crate::output::{self, Format};

/// Files never stall, so this only guards against a reader that does.
const READ_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Default, Clone, Serialize)]
struct Summary {
    filename: String,
    cycles: u64,
    published: u64,
    failures: BTreeMap<OutcomeCode, u64>,
}

pub fn decode(input: &Path, pd_format: u8, format: &Format) -> Result<()> {
    let file = File::open(input).with_context(|| format!("opening {input:?}"))?;
    let mut publisher = output::publisher(format, stdout());
    let summary = replay(
        file,
        pd_format,
        publisher.as_mut(),
        input.to_string_lossy().to_string(),
    )?;
    drop(publisher);

    output::write_summary(format, &summary, stdout())
}

/// Run acquisition cycles over `reader` until it is exhausted.
///
/// Mirrors [dvl::Acquisition::acquire], except that a read error is fatal rather
/// than indistinguishable from the end of the input.
fn replay<R: Read>(
    reader: R,
    pd_format: u8,
    publisher: &mut dyn Publisher,
    filename: String,
) -> Result<Summary> {
    let pd_format = dvl::Format::try_from(pd_format)?;
    let mut transport = ReaderTransport::new(reader);
    let mut summary = Summary {
        filename,
        ..Default::default()
    };

    loop {
        let buf = RawBuffer::read_from(&mut transport, READ_TIMEOUT)
            .with_context(|| format!("reading window {}", summary.cycles + 1))?;
        // nothing left to read
        if buf.is_empty() {
            break;
        }
        summary.cycles += 1;

        let zult = if buf.is_full() {
            decode_window(buf.as_slice(), pd_format)
        } else {
            Err(Error::StreamTruncated {
                actual: buf.len(),
                minimum: RawBuffer::CAPACITY,
            })
        };
        match zult {
            Ok(ensemble) => {
                publisher
                    .publish(ensemble)
                    .context("writing ensemble")?;
                summary.published += 1;
            }
            Err(err) => {
                debug!(cycle = summary.cycles, "{err}");
                *summary.failures.entry(err.code()).or_default() += 1;
            }
        }
    }

    if summary.cycles == 0 {
        warn!("no data in {}", summary.filename);
    }
    Ok(summary)
}
