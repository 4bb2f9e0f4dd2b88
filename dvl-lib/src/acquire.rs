use std::time::Duration;

use tracing::{debug, trace};
use typed_builder::TypedBuilder;

use crate::framing::{synchronize, validate, RawBuffer};
use crate::{DvlEnsemble, Error, Format, Result, Transport};

/// Configuration for a single acquisition cycle: one bounded read from the sensor,
/// followed by synchronization, checksum validation and decoding.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use dvl::{Acquisition, ReaderTransport};
///
/// let acq = Acquisition::builder()
///     .format(5)
///     .timeout(Duration::from_millis(500))
///     .build();
///
/// // nothing to read
/// let mut transport = ReaderTransport::new(&[][..]);
/// assert!(acq.acquire(&mut transport).is_err());
/// ```
#[derive(TypedBuilder, Debug, Clone)]
pub struct Acquisition {
    /// PD format number the instrument is configured for. Only 5 is supported.
    #[builder(default = 5)]
    format: u8,
    /// Upper bound on the time spent waiting for bytes from the transport.
    #[builder(default = Duration::from_secs(1))]
    timeout: Duration,
}

impl Default for Acquisition {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Acquisition {
    #[must_use]
    pub fn format(&self) -> u8 {
        self.format
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Perform one acquisition using `transport`.
    ///
    /// Exactly one read is issued per call, and none at all if the configured format
    /// is not supported. There are no retries.
    ///
    /// # Errors
    /// * [Error::UnsupportedFormat] if the format is not PD5.
    /// * [Error::PortUnresponsive] if no bytes were read, or the transport failed.
    /// * [Error::StreamTruncated] if fewer than [RawBuffer::CAPACITY] bytes were read.
    /// * Any error from [decode_window].
    pub fn acquire<T>(&self, transport: &mut T) -> Result<DvlEnsemble>
    where
        T: Transport + ?Sized,
    {
        let format = Format::try_from(self.format)?;

        let buf = match RawBuffer::read_from(transport, self.timeout) {
            Ok(buf) => buf,
            Err(err) => {
                debug!("transport read failed: {err}");
                return Err(Error::PortUnresponsive);
            }
        };
        if buf.is_empty() {
            return Err(Error::PortUnresponsive);
        }
        if !buf.is_full() {
            return Err(Error::StreamTruncated {
                actual: buf.len(),
                minimum: RawBuffer::CAPACITY,
            });
        }

        decode_window(buf.as_slice(), format)
    }
}

/// Locate, validate and decode the first frame of `format` in `buf`.
///
/// # Errors
/// * [Error::FrameNotFound] if there is no frame marker in `buf`.
/// * [Error::StreamTruncated] if the frame runs past the end of `buf`.
/// * [Error::ChecksumMismatch] if the frame fails its integrity check.
pub fn decode_window(buf: &[u8], format: Format) -> Result<DvlEnsemble> {
    let candidate = synchronize(buf, format)?;
    let loc = candidate.loc();
    let frame = validate(candidate)?;
    trace!(offset = loc.offset, skipped = loc.skipped, %format, "decoded frame");
    Ok(format.decode(&frame))
}

/// Perform a single acquisition of `num_format` data from `transport`, waiting at most
/// `timeout` for bytes.
///
/// Shorthand for building an [Acquisition] and calling [Acquisition::acquire].
///
/// # Errors
/// See [Acquisition::acquire].
pub fn acquire<T>(transport: &mut T, num_format: u8, timeout: Duration) -> Result<DvlEnsemble>
where
    T: Transport + ?Sized,
{
    Acquisition::builder()
        .format(num_format)
        .timeout(timeout)
        .build()
        .acquire(transport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pd5;
    use std::io;

    struct Counting {
        dat: Vec<u8>,
        calls: usize,
    }

    impl Transport for Counting {
        fn read_up_to(&mut self, buf: &mut [u8], _timeout: Duration) -> io::Result<usize> {
            self.calls += 1;
            let num = self.dat.len().min(buf.len());
            buf[..num].copy_from_slice(&self.dat[..num]);
            Ok(num)
        }
    }

    fn window_with_frame(offset: usize) -> Vec<u8> {
        let ens = DvlEnsemble {
            id: pd5::ID,
            format: pd5::FORMAT,
            byte_count: pd5::BYTE_COUNT,
            depth: 42,
            ..Default::default()
        };
        let mut dat = vec![0u8; RawBuffer::CAPACITY];
        dat[offset..offset + pd5::LEN].copy_from_slice(&ens.encode());
        dat
    }

    #[test]
    fn defaults() {
        let acq = Acquisition::default();
        assert_eq!(acq.format(), 5);
        assert_eq!(acq.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn acquires_single_frame() {
        let mut transport = Counting {
            dat: window_with_frame(10),
            calls: 0,
        };
        let ens = Acquisition::default().acquire(&mut transport).unwrap();
        assert_eq!(ens.depth, 42);
        assert_eq!(transport.calls, 1);
    }

    #[test]
    fn unsupported_format_does_not_read() {
        let mut transport = Counting {
            dat: window_with_frame(0),
            calls: 0,
        };
        let zult = acquire(&mut transport, 3, Duration::from_secs(1));
        assert!(matches!(zult, Err(Error::UnsupportedFormat(3))));
        assert_eq!(transport.calls, 0);
    }

    #[test]
    fn transport_failure_is_unresponsive() {
        struct Broken;
        impl Transport for Broken {
            fn read_up_to(&mut self, _: &mut [u8], _: Duration) -> io::Result<usize> {
                Err(io::ErrorKind::NotConnected.into())
            }
        }
        let zult = Acquisition::default().acquire(&mut Broken);
        assert!(matches!(zult, Err(Error::PortUnresponsive)));
    }

    #[test]
    fn short_window_is_truncated_even_with_complete_frame() {
        let dat = window_with_frame(0)[..200].to_vec();
        let mut transport = Counting { dat, calls: 0 };
        let zult = Acquisition::default().acquire(&mut transport);
        assert!(matches!(
            zult,
            Err(Error::StreamTruncated {
                actual: 200,
                minimum: 255
            })
        ));
    }

    #[test]
    fn decode_window_works_on_partial_buffers() {
        let dat = window_with_frame(3);
        let ens = decode_window(&dat[..100], Format::Pd5).unwrap();
        assert_eq!(ens.depth, 42);
    }
}
