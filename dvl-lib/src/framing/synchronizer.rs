use tracing::{debug, trace};

use super::{CandidateFrame, Loc};
use crate::{Error, Format, Result};

/// Id byte, format byte, and 2 byte little-endian byte count.
const HEADER_LEN: usize = 4;

/// Scan `buf` for the first complete frame of `format`.
///
/// A frame starts with the format's id and format bytes followed by a little-endian
/// byte count. An id/format pair whose byte count is not the one the format declares
/// is treated as a coincidental match in the data and skipped. The scan is a single
/// forward pass; bytes are never revisited after a rejected pair.
///
/// If no pair carries the expected byte count, the first skipped pair with a full
/// frame's worth of bytes behind it is returned instead, so a frame with a damaged
/// byte count still reaches the integrity check.
///
/// # Errors
/// * [Error::FrameNotFound] if `buf` holds no usable id/format pair.
/// * [Error::StreamTruncated] if the first plausible pair does not have a full frame
///   before the end of `buf`, or the only pair found has no room for its byte count.
pub fn synchronize(buf: &[u8], format: Format) -> Result<CandidateFrame<'_>> {
    let (id, fmt) = format.marker();
    let frame_len = format.frame_len();
    let mut skipped = 0;
    let mut suspect: Option<Loc> = None;

    let mut idx = 0;
    while idx + 1 < buf.len() {
        if buf[idx] != id || buf[idx + 1] != fmt {
            idx += 1;
            continue;
        }
        if idx + HEADER_LEN > buf.len() {
            break;
        }
        let byte_count = u16::from_le_bytes([buf[idx + 2], buf[idx + 3]]);
        if byte_count != format.byte_count() {
            trace!(offset = idx, byte_count, "skipping false frame marker");
            if suspect.is_none() && idx + frame_len <= buf.len() {
                suspect = Some(Loc {
                    offset: idx,
                    skipped,
                });
            }
            skipped += 1;
            idx += 1;
            continue;
        }
        if idx + frame_len > buf.len() {
            return Err(Error::StreamTruncated {
                actual: buf.len() - idx,
                minimum: frame_len,
            });
        }

        return Ok(CandidateFrame {
            format,
            loc: Loc {
                offset: idx,
                skipped,
            },
            data: &buf[idx..idx + frame_len],
        });
    }

    if let Some(loc) = suspect {
        debug!(offset = loc.offset, "no marker with expected byte count, using first pair");
        return Ok(CandidateFrame {
            format,
            loc,
            data: &buf[loc.offset..loc.offset + frame_len],
        });
    }
    // loop ended on a pair too close to the end to carry a byte count
    if idx + 1 < buf.len() {
        return Err(Error::StreamTruncated {
            actual: buf.len() - idx,
            minimum: frame_len,
        });
    }

    Err(Error::FrameNotFound)
}
