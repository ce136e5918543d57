use std::time::Duration;

use bytes::{Bytes, BytesMut};

use crate::checksum::{append_checksum, checksum, split_checksum, CHECKSUM_SIZE};
use crate::error::Result;
use crate::slip;

/// Default limit on raw (still escaped) bytes between two END markers.
///
/// Telemetry frames are at most 38 payload bytes, 76 when every byte is
/// escaped, so this leaves ample headroom while bounding memory on a noisy line.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 512;

/// A verified frame: content plus the checksum it arrived with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The frame content, checksum stripped.
    pub content: Bytes,
    /// CRC-16/XMODEM of `content`.
    pub checksum: u16,
}

impl Frame {
    /// Create a frame for outbound content, computing its checksum.
    pub fn new(content: impl Into<Bytes>) -> Self {
        let content = content.into();
        Self {
            checksum: checksum(&content),
            content,
        }
    }

    /// The total wire size of this frame (delimiters + escaped content + checksum).
    pub fn wire_size(&self) -> usize {
        let mut payload = Vec::with_capacity(self.content.len() + CHECKSUM_SIZE);
        payload.extend_from_slice(&self.content);
        payload.extend_from_slice(&self.checksum.to_be_bytes());
        slip::encoded_len(&payload)
    }
}

/// Checksum, escape and delimit `content`, appending the frame to `dst`.
///
/// Wire format:
/// ```text
/// ┌──────┬──────────────────┬────────────┬────────────┬──────┐
/// │ END  │ Content          │ CRC hi     │ CRC lo     │ END  │
/// │ 0xC0 │ (escaped)        │ (escaped)  │ (escaped)  │ 0xC0 │
/// └──────┴──────────────────┴────────────┴────────────┴──────┘
/// ```
pub fn encode_frame(content: &[u8], dst: &mut BytesMut) {
    slip::encode(&append_checksum(content), dst);
}

/// Verify an unescaped payload and split it into a [`Frame`].
pub fn open_payload(payload: &[u8]) -> Result<Frame> {
    let content = split_checksum(payload)?;
    let tail = &payload[content.len()..];
    Ok(Frame {
        content: Bytes::copy_from_slice(content),
        checksum: u16::from_be_bytes([tail[0], tail[1]]),
    })
}

/// Configuration for frame reading and writing.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum raw bytes accepted between two END markers. Default: 512.
    pub max_frame_size: usize,
    /// Read timeout applied to serial links. Default: none (keep the link's own).
    pub read_timeout: Option<Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            read_timeout: None,
        }
    }
}
