use tracing::debug;

use super::{CandidateFrame, ValidatedFrame};
use crate::{Error, Result};

/// Sum of all bytes in `dat`, modulo 65536.
#[must_use]
pub fn checksum(dat: &[u8]) -> u16 {
    dat.iter()
        .fold(0u16, |sum, b| sum.wrapping_add(u16::from(*b)))
}

/// Compare the checksum computed over `frame` with the one it carries.
///
/// The checksum covers every byte before the checksum field and is transmitted LSB
/// first in the two bytes that follow.
///
/// # Errors
/// [Error::ChecksumMismatch] if the checksums differ.
pub fn validate(frame: CandidateFrame<'_>) -> Result<ValidatedFrame<'_>> {
    let offset = frame.format.checksum_offset();
    let dat = frame.data;

    let computed = checksum(&dat[..offset]);
    let transmitted = u16::from_le_bytes([dat[offset], dat[offset + 1]]);
    if computed != transmitted {
        debug!(
            offset = frame.loc.offset,
            computed, transmitted, "frame checksum mismatch"
        );
        return Err(Error::ChecksumMismatch {
            computed,
            transmitted,
        });
    }

    Ok(ValidatedFrame {
        format: frame.format,
        data: dat,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::synchronize;
    use crate::Format;

    fn zero_frame() -> Vec<u8> {
        let mut dat = vec![0u8; 88];
        dat[..4].copy_from_slice(&[0x7d, 0x01, 0x56, 0x00]);
        // 0x7d + 0x01 + 0x56
        dat[86] = 0xd4;
        dat
    }

    #[test]
    fn checksum_wraps_at_16_bits() {
        assert_eq!(checksum(&[]), 0);
        assert_eq!(checksum(&[0xff; 258]), 0x00fe);
        assert_eq!(checksum(&[0xff, 0x01]), 0x0100);
    }

    #[test]
    fn accepts_matching_checksum() {
        let dat = zero_frame();
        let frame = synchronize(&dat, Format::Pd5).unwrap();
        let frame = validate(frame).expect("checksum to match");
        assert_eq!(frame.data(), &dat[..]);
        assert_eq!(frame.format(), Format::Pd5);
    }

    #[test]
    fn rejects_mismatched_checksum() {
        let mut dat = zero_frame();
        dat[87] = 0x01;
        let frame = synchronize(&dat, Format::Pd5).unwrap();
        let zult = validate(frame);
        assert!(
            matches!(
                zult,
                Err(Error::ChecksumMismatch {
                    computed: 0x00d4,
                    transmitted: 0x01d4
                })
            ),
            "got {zult:?}"
        );
    }

    #[test]
    fn rejects_corrupted_payload() {
        let mut dat = zero_frame();
        dat[50] = 0x10;
        let frame = synchronize(&dat, Format::Pd5).unwrap();
        assert!(matches!(
            validate(frame),
            Err(Error::ChecksumMismatch { .. })
        ));
    }
}
