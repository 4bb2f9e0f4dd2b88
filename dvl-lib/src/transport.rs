use std::io::{self, ErrorKind, Read};
use std::thread;
use std::time::{Duration, Instant};

/// Source of raw sensor bytes, typically a serial port held open by the caller.
pub trait Transport {
    /// Read up to `buf.len()` bytes, returning early at end of stream or once
    /// `timeout` has elapsed. Must never block indefinitely.
    ///
    /// # Errors
    /// Any IO error other than a timeout.
    fn read_up_to(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn read_up_to(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        (**self).read_up_to(buf, timeout)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read_up_to(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        (**self).read_up_to(buf, timeout)
    }
}

/// [Transport] over any [Read] implementation.
///
/// Reads repeat until the buffer is full, the reader reports end of stream, or the
/// timeout expires. Readers that time out on their own, e.g., serial ports, should
/// use a per-read timeout shorter than the acquisition timeout so the deadline is
/// honored.
pub struct ReaderTransport<R> {
    reader: R,
}

impl<R: Read> ReaderTransport<R> {
    /// Delay between polls of a non-blocking reader that has no data.
    const WOULD_BLOCK_BACKOFF: Duration = Duration::from_millis(1);

    pub fn new(reader: R) -> Self {
        ReaderTransport { reader }
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Transport for ReaderTransport<R> {
    fn read_up_to(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        let deadline = Instant::now() + timeout;
        let mut filled = 0;

        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(num) => filled += num,
                Err(err) => match err.kind() {
                    ErrorKind::Interrupted | ErrorKind::TimedOut => (),
                    ErrorKind::WouldBlock => thread::sleep(Self::WOULD_BLOCK_BACKOFF),
                    _ if filled > 0 => break,
                    _ => return Err(err),
                },
            }
            if Instant::now() >= deadline {
                break;
            }
        }

        Ok(filled)
    }
}
