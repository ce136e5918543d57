use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use tracing::trace;

use crate::codec::{encode_frame, Frame, FrameConfig};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 128;

/// Writes complete frames to any `Write` stream.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Write a complete frame (blocking).
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.send(frame.content.as_ref())
    }

    /// Checksum, escape and send `content` as one frame.
    ///
    /// Fails with [`FrameError::Oversize`] when the encoded frame would be
    /// larger than the peer's receiver accepts.
    pub fn send(&mut self, content: &[u8]) -> Result<()> {
        self.buf.clear();
        encode_frame(content, &mut self.buf);
        check_size(self.buf.len(), self.config.max_frame_size)?;

        trace!(content = content.len(), wire = self.buf.len(), "sending frame");
        write_all(&mut self.inner, &self.buf)?;
        self.flush()
    }

    /// Send a frame that is already checksummed, escaped and delimited.
    pub fn send_encoded(&mut self, frame: &[u8]) -> Result<()> {
        check_size(frame.len(), self.config.max_frame_size)?;

        trace!(wire = frame.len(), "sending encoded frame");
        write_all(&mut self.inner, frame)?;
        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

// Both delimiters are excluded from the receiver's count.
fn check_size(wire_len: usize, max: usize) -> Result<()> {
    if wire_len.saturating_sub(2) > max {
        return Err(FrameError::Oversize { max });
    }
    Ok(())
}

fn write_all<T: Write>(inner: &mut T, bytes: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < bytes.len() {
        match inner.write(&bytes[offset..]) {
            Ok(0) => return Err(FrameError::ConnectionClosed),
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(())
}
