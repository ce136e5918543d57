use std::io::{ErrorKind, Read};

use bytes::{Buf, BytesMut};
use togglink_transport::LinkStream;
use tracing::debug;

use crate::codec::{open_payload, Frame, FrameConfig};
use crate::error::{FrameError, Result};
use crate::receiver::FrameReceiver;

const READ_CHUNK_SIZE: usize = 256;

/// Reads verified frames from any `Read` stream.
///
/// Handles partial reads internally, so callers always get complete frames
/// whose checksum has been checked. A protocol error (bad escape, checksum
/// mismatch, oversize frame) drops only the offending frame: the next call
/// picks up with the bytes that follow it.
pub struct FrameReader<T> {
    inner: T,
    receiver: FrameReceiver,
    pending: BytesMut,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            receiver: FrameReceiver::with_max_frame_size(config.max_frame_size),
            pending: BytesMut::with_capacity(READ_CHUNK_SIZE),
            config,
        }
    }

    /// Read the next verified frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached. A
    /// transport timeout surfaces as `FrameError::Io`; bytes of a partially
    /// received frame are kept, so calling again resumes where it stopped.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            while self.pending.has_remaining() {
                let byte = self.pending.get_u8();
                if let Some(payload) = self.receiver.feed(byte)? {
                    let frame = open_payload(&payload).inspect_err(|err| {
                        debug!(len = payload.len(), error = %err, "dropping frame");
                    })?;
                    debug!(len = frame.content.len(), "frame received");
                    return Ok(frame);
                }
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.pending.extend_from_slice(&chunk[..read]);
        }
    }

    /// Discard buffered input and any partially received frame.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.receiver.reset();
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameReader<LinkStream> {
    /// Create a frame reader for a serial link and apply the read timeout from config.
    pub fn with_config_link(mut inner: LinkStream, config: FrameConfig) -> Result<Self> {
        if let Some(timeout) = config.read_timeout {
            inner.set_timeout(timeout).map_err(transport_to_frame_error)?;
        }
        Ok(Self::with_config(inner, config))
    }
}

fn transport_to_frame_error(err: togglink_transport::TransportError) -> FrameError {
    match err {
        togglink_transport::TransportError::Io(io) => FrameError::Io(io),
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}
