use crate::framing::ValidatedFrame;
use crate::{pd5, DvlEnsemble, Error};

/// PD output data formats a DVL can be configured to emit.
///
/// Only PD5 is decoded. Other PD numbers fail conversion with
/// [Error::UnsupportedFormat].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Format {
    Pd5,
}

impl Format {
    /// The PD number used to select this format on the instrument, e.g., `#PD5`.
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Format::Pd5 => 5,
        }
    }

    /// Id and format byte pair that begins every frame.
    #[must_use]
    pub fn marker(self) -> (u8, u8) {
        match self {
            Format::Pd5 => (pd5::ID, pd5::FORMAT),
        }
    }

    /// Total frame length, including header and checksum.
    #[must_use]
    pub fn frame_len(self) -> usize {
        match self {
            Format::Pd5 => pd5::LEN,
        }
    }

    /// Offset of the LSB of the little-endian checksum.
    #[must_use]
    pub fn checksum_offset(self) -> usize {
        match self {
            Format::Pd5 => pd5::CHECKSUM_OFFSET,
        }
    }

    /// Value of the byte count field carried by every frame of this format.
    #[must_use]
    pub fn byte_count(self) -> u16 {
        match self {
            Format::Pd5 => pd5::BYTE_COUNT,
        }
    }

    /// Decode the fields of a validated frame.
    #[must_use]
    pub fn decode(self, frame: &ValidatedFrame<'_>) -> DvlEnsemble {
        match self {
            Format::Pd5 => pd5::decode(frame),
        }
    }
}

impl TryFrom<u8> for Format {
    type Error = Error;

    fn try_from(num: u8) -> Result<Self, Self::Error> {
        match num {
            5 => Ok(Format::Pd5),
            _ => Err(Error::UnsupportedFormat(num)),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PD{}", self.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pd5_is_supported() {
        assert_eq!(Format::try_from(5).unwrap(), Format::Pd5);
        for num in [0u8, 3, 4, 6, 255] {
            assert!(
                matches!(Format::try_from(num), Err(Error::UnsupportedFormat(n)) if n == num),
                "PD{num} should not be supported"
            );
        }
    }

    #[test]
    fn pd5_layout() {
        let fmt = Format::Pd5;
        assert_eq!(fmt.marker(), (0x7d, 0x01));
        assert_eq!(fmt.frame_len(), 88);
        assert_eq!(fmt.checksum_offset() + 2, fmt.frame_len());
        assert_eq!(usize::from(fmt.byte_count()), fmt.checksum_offset());
        assert_eq!(fmt.to_string(), "PD5");
    }
}
