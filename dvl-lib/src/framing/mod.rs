//! Locating and validating frames within raw DVL serial data.
//!
//! A single read from the sensor link yields a [RawBuffer] that may start and end in
//! the middle of an ensemble. [synchronize] finds the first complete frame in the
//! window and [validate] checks it against its transmitted checksum. Only a
//! [ValidatedFrame] may be handed to a decoder.
mod integrity;
mod synchronizer;

pub use integrity::*;
pub use synchronizer::*;

use std::io::{self, ErrorKind};
use std::time::Duration;

use crate::{Format, Transport};

/// Fixed-capacity window of bytes produced by one transport read.
///
/// Contents are untrusted; a frame may begin anywhere in the window.
#[derive(Clone)]
pub struct RawBuffer {
    data: [u8; RawBuffer::CAPACITY],
    len: usize,
}

impl RawBuffer {
    /// Number of bytes requested from the transport per acquisition.
    pub const CAPACITY: usize = 255;

    #[must_use]
    pub fn new() -> Self {
        RawBuffer {
            data: [0u8; Self::CAPACITY],
            len: 0,
        }
    }

    /// Copy up to [RawBuffer::CAPACITY] bytes from `dat`. Any excess is ignored.
    #[must_use]
    pub fn from_slice(dat: &[u8]) -> Self {
        let mut buf = Self::new();
        let len = dat.len().min(Self::CAPACITY);
        buf.data[..len].copy_from_slice(&dat[..len]);
        buf.len = len;
        buf
    }

    /// Fill a new buffer with a single bounded read from `transport`.
    ///
    /// # Errors
    /// Any non-timeout error reported by the transport.
    pub fn read_from<T>(transport: &mut T, timeout: Duration) -> io::Result<Self>
    where
        T: Transport + ?Sized,
    {
        let mut buf = Self::new();
        let num = transport.read_up_to(&mut buf.data, timeout)?;
        if num > Self::CAPACITY {
            return Err(io::Error::new(
                ErrorKind::InvalidData,
                format!("transport reported {num} bytes for a {} byte buffer", Self::CAPACITY),
            ));
        }
        buf.len = num;
        Ok(buf)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == Self::CAPACITY
    }
}

impl Default for RawBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RawBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RawBuffer{{len={}}}", self.len)
    }
}

/// Location of a candidate frame within a [RawBuffer].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loc {
    /// Offset (0-based) of the frame id byte.
    pub offset: usize,
    /// Number of id/format byte pairs rejected before this one because their length
    /// field did not match the format.
    pub skipped: usize,
}

/// Bytes believed to hold a complete frame, not yet checked for integrity.
///
/// The slice length always equals the frame length of `format`.
#[derive(Debug, Clone, Copy)]
pub struct CandidateFrame<'a> {
    format: Format,
    loc: Loc,
    data: &'a [u8],
}

impl<'a> CandidateFrame<'a> {
    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }

    #[must_use]
    pub fn loc(&self) -> Loc {
        self.loc
    }

    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

/// A frame whose computed checksum matches the transmitted checksum.
///
/// Can only be produced by [validate].
#[derive(Debug, Clone, Copy)]
pub struct ValidatedFrame<'a> {
    format: Format,
    data: &'a [u8],
}

impl<'a> ValidatedFrame<'a> {
    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }

    /// All frame bytes, including the id byte and trailing checksum.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<u8>);

    impl Transport for Fixed {
        fn read_up_to(&mut self, buf: &mut [u8], _timeout: Duration) -> io::Result<usize> {
            let n = self.0.len().min(buf.len());
            buf[..n].copy_from_slice(&self.0[..n]);
            Ok(n)
        }
    }

    #[test]
    fn from_slice_truncates_to_capacity() {
        let buf = RawBuffer::from_slice(&[0xaa; 300]);
        assert_eq!(buf.len(), RawBuffer::CAPACITY);
        assert!(buf.is_full());
    }

    #[test]
    fn read_from_keeps_only_read_bytes() {
        let mut transport = Fixed(vec![1, 2, 3]);
        let buf = RawBuffer::read_from(&mut transport, Duration::from_millis(1)).unwrap();
        assert_eq!(buf.as_slice(), &[1, 2, 3]);
        assert!(!buf.is_full());
        assert!(!buf.is_empty());
    }

    #[test]
    fn read_from_requests_full_capacity() {
        let mut transport = Fixed(vec![7; 1000]);
        let buf = RawBuffer::read_from(&mut transport, Duration::from_millis(1)).unwrap();
        assert!(buf.is_full());
    }
}
