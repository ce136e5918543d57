use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace};

use crate::codec::DEFAULT_MAX_FRAME_SIZE;
use crate::error::{FrameError, Result};
use crate::slip::{self, END};

/// Raw byte count below which a completed frame is treated as line noise.
///
/// Consecutive END bytes and short bursts of startup garbage are dropped
/// without reporting an error.
pub const MIN_FRAME_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Collecting bytes since the last END.
    Accumulating,
    /// The frame overflowed; drop everything until the next END.
    Discarding,
}

/// Streaming frame receiver, driven one byte at a time.
///
/// Owns the accumulation buffer for a single link. The buffer is emptied at
/// every END byte whatever the outcome, so a bad frame never leaks into the
/// next one. Yielded payloads still carry their checksum; verifying it is
/// the caller's job (see [`open_payload`](crate::codec::open_payload)).
#[derive(Debug)]
pub struct FrameReceiver {
    buf: BytesMut,
    state: State,
    max_frame_size: usize,
}

impl Default for FrameReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReceiver {
    /// Create a receiver with the default maximum frame size.
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    /// Create a receiver that rejects frames longer than `max_frame_size` raw bytes.
    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(max_frame_size.min(DEFAULT_MAX_FRAME_SIZE)),
            state: State::Accumulating,
            max_frame_size,
        }
    }

    /// Feed one byte from the link.
    ///
    /// Returns `Ok(Some(payload))` when an END completes a frame,
    /// `Ok(None)` when more bytes are needed (or noise was dropped), and
    /// `Err` when the frame just completed, or the one in progress, is unusable.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Bytes>> {
        match (self.state, byte) {
            (State::Discarding, END) => {
                debug!("resynchronised on END after oversize frame");
                self.state = State::Accumulating;
                Ok(None)
            }
            (State::Discarding, _) => Ok(None),
            (State::Accumulating, END) => self.complete(),
            (State::Accumulating, byte) => {
                if self.buf.len() >= self.max_frame_size {
                    debug!(max = self.max_frame_size, "frame overflow, discarding until END");
                    self.buf.clear();
                    self.state = State::Discarding;
                    return Err(FrameError::Oversize {
                        max: self.max_frame_size,
                    });
                }
                self.buf.put_u8(byte);
                Ok(None)
            }
        }
    }

    fn complete(&mut self) -> Result<Option<Bytes>> {
        if self.buf.len() < MIN_FRAME_LEN {
            if !self.buf.is_empty() {
                trace!(len = self.buf.len(), "dropping frame-boundary noise");
            }
            self.buf.clear();
            return Ok(None);
        }

        let raw = self.buf.split();
        let payload = slip::decode(&raw).inspect_err(|err| {
            debug!(len = raw.len(), error = %err, "dropping malformed frame");
        })?;
        trace!(raw = raw.len(), payload = payload.len(), "frame complete");
        Ok(Some(Bytes::from(payload)))
    }

    /// Drop any partially received frame.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.state = State::Accumulating;
    }

    /// Raw bytes buffered since the last END.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// True while skipping the remainder of an oversize frame.
    pub fn is_discarding(&self) -> bool {
        self.state == State::Discarding
    }

    /// Configured maximum frame size.
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }
}
