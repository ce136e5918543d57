use std::io::{Read, Write};
use std::time::Duration;

use serialport::SerialPort;

use crate::error::{Result, TransportError};

/// An open serial link implementing `Read` and `Write`.
///
/// This is the fundamental I/O type handed to the frame layer. The port is
/// closed when the last handle referring to it is dropped.
pub struct LinkStream {
    port: Box<dyn SerialPort>,
}

impl Read for LinkStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for LinkStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.port.flush()
    }
}

impl LinkStream {
    /// Wrap an already opened serial port.
    ///
    /// Useful for pseudo terminals (`serialport::TTYPort::pair`) and for
    /// ports opened with settings [`LinkConfig`](crate::LinkConfig) does not cover.
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }

    /// Device name reported by the driver, if any.
    pub fn name(&self) -> Option<String> {
        self.port.name()
    }

    /// Set the timeout for blocking reads and writes.
    pub fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.port
            .set_timeout(timeout)
            .map_err(TransportError::Configure)
    }

    /// Current blocking timeout.
    pub fn timeout(&self) -> Duration {
        self.port.timeout()
    }

    /// Try to clone this stream (a second handle onto the same device).
    pub fn try_clone(&self) -> Result<Self> {
        let port = self.port.try_clone().map_err(TransportError::Configure)?;
        Ok(Self { port })
    }

    /// Discard anything buffered by the driver in both directions.
    pub fn clear_buffers(&self) -> Result<()> {
        self.port
            .clear(serialport::ClearBuffer::All)
            .map_err(TransportError::Configure)
    }
}

impl std::fmt::Debug for LinkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkStream")
            .field("name", &self.port.name())
            .finish()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn pty_pair() -> (LinkStream, LinkStream) {
        let (host, device) = serialport::TTYPort::pair().expect("pty pair should open");
        (
            LinkStream::from_port(Box::new(host)),
            LinkStream::from_port(Box::new(device)),
        )
    }

    #[test]
    fn bytes_cross_a_pty_pair() {
        let (mut host, mut device) = pty_pair();
        device.set_timeout(Duration::from_secs(1)).unwrap();

        host.write_all(&[0xC0, 0x40, 0xC0]).unwrap();
        host.flush().unwrap();

        let mut received = [0u8; 3];
        device.read_exact(&mut received).unwrap();
        assert_eq!(received, [0xC0, 0x40, 0xC0]);
    }

    #[test]
    fn timeout_is_applied() {
        let (mut host, _device) = pty_pair();
        host.set_timeout(Duration::from_millis(20)).unwrap();
        assert_eq!(host.timeout(), Duration::from_millis(20));

        let mut buf = [0u8; 1];
        let err = host.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::TimedOut);
    }

    #[test]
    fn clone_shares_the_device() {
        let (host, mut device) = pty_pair();
        let mut writer = host.try_clone().unwrap();
        device.set_timeout(Duration::from_secs(1)).unwrap();

        writer.write_all(b"x").unwrap();
        let mut buf = [0u8; 1];
        device.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"x");
        drop(host);
    }

    #[test]
    fn clear_discards_pending_input() {
        let (mut host, mut device) = pty_pair();
        device.set_timeout(Duration::from_millis(50)).unwrap();

        host.write_all(b"stale").unwrap();
        host.flush().unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while device.port.bytes_to_read().unwrap() < 5 {
            assert!(std::time::Instant::now() < deadline, "bytes never arrived");
            std::thread::sleep(Duration::from_millis(5));
        }

        device.clear_buffers().unwrap();
        assert_eq!(device.port.bytes_to_read().unwrap(), 0);

        let mut buf = [0u8; 5];
        let err = device.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::TimedOut);
    }
}
