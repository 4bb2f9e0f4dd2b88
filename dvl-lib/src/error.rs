use std::fmt::Display;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The transport produced no bytes before the read timeout expired.
    #[error("DVL not responding; check the serial connection")]
    PortUnresponsive,

    /// Fewer bytes arrived than required, either for the read window or for a frame
    /// whose marker was located too close to the end of the window.
    #[error("stream ended prematurely")]
    StreamTruncated {
        /// Number of bytes we got
        actual: usize,
        /// Minimum number of expected bytes
        minimum: usize,
    },

    #[error("no PD5 frame marker found; is the DVL configured for #PD5?")]
    FrameNotFound,

    #[error("bad checksum: computed {computed:#06x}, transmitted {transmitted:#06x}")]
    ChecksumMismatch { computed: u16, transmitted: u16 },

    /// A PD output format other than PD5 was requested.
    #[error("unsupported PD format {0}")]
    UnsupportedFormat(u8),

    /// IO error writing or reading outside of the acquisition cycle
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The classified outcome code for this error.
    #[must_use]
    pub fn code(&self) -> OutcomeCode {
        match self {
            Error::PortUnresponsive | Error::Io(_) => OutcomeCode::PortUnresponsive,
            Error::StreamTruncated { .. } => OutcomeCode::StreamTruncated,
            Error::FrameNotFound => OutcomeCode::FrameNotFound,
            Error::ChecksumMismatch { .. } => OutcomeCode::ChecksumMismatch,
            Error::UnsupportedFormat(_) => OutcomeCode::UnsupportedFormat,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Numeric classification of an acquisition outcome.
///
/// The discriminants are stable and match the status codes reported by the sensor
/// driver this crate replaces, so they may be forwarded as-is to consumers that
/// expect them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum OutcomeCode {
    Success = 0,
    PortUnresponsive = 1,
    StreamTruncated = 2,
    FrameNotFound = 3,
    ChecksumMismatch = 4,
    UnsupportedFormat = 5,
}

impl OutcomeCode {
    /// Classify any result produced by this crate.
    #[must_use]
    pub fn of<T>(zult: &Result<T>) -> Self {
        match zult {
            Ok(_) => OutcomeCode::Success,
            Err(err) => err.code(),
        }
    }
}

impl From<OutcomeCode> for u8 {
    fn from(code: OutcomeCode) -> u8 {
        code as u8
    }
}

impl Display for OutcomeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutcomeCode::Success => "success",
            OutcomeCode::PortUnresponsive => "port_unresponsive",
            OutcomeCode::StreamTruncated => "stream_truncated",
            OutcomeCode::FrameNotFound => "frame_not_found",
            OutcomeCode::ChecksumMismatch => "checksum_mismatch",
            OutcomeCode::UnsupportedFormat => "unsupported_format",
        };
        write!(f, "{name}({})", *self as u8)
    }
}
