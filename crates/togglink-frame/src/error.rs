/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// An ESC byte was the last byte of the frame.
    #[error("truncated escape sequence at end of frame")]
    TruncatedEscape,

    /// An ESC byte was followed by something other than ESC_END or ESC_ESC.
    #[error("invalid escape sequence (0xDB followed by {0:#04x})")]
    InvalidEscape(u8),

    /// A raw END byte was found inside frame content.
    #[error("unescaped END byte inside frame content")]
    UnescapedEnd,

    /// The received checksum does not match the content.
    #[error("checksum mismatch (computed {computed:#06x}, received {received:#06x})")]
    ChecksumMismatch { computed: u16, received: u16 },

    /// The frame is too short to carry its checksum.
    #[error("frame too short ({len} bytes, min {min})")]
    ShortFrame { len: usize, min: usize },

    /// More than the configured maximum number of bytes arrived without an END.
    #[error("frame exceeds {max} bytes without END marker")]
    Oversize { max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream was closed.
    #[error("connection closed")]
    ConnectionClosed,
}

/// Coarse classification of a [`FrameError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameErrorKind {
    /// Bad escape sequence or stray END.
    Framing,
    /// CRC mismatch.
    Checksum,
    /// Too few bytes for a checksum.
    ShortFrame,
    /// Maximum frame size exceeded.
    Oversize,
    /// Underlying stream failed.
    Io,
    /// Underlying stream reached EOF.
    Closed,
}

impl FrameError {
    pub fn kind(&self) -> FrameErrorKind {
        match self {
            FrameError::TruncatedEscape
            | FrameError::InvalidEscape(_)
            | FrameError::UnescapedEnd => FrameErrorKind::Framing,
            FrameError::ChecksumMismatch { .. } => FrameErrorKind::Checksum,
            FrameError::ShortFrame { .. } => FrameErrorKind::ShortFrame,
            FrameError::Oversize { .. } => FrameErrorKind::Oversize,
            FrameError::Io(_) => FrameErrorKind::Io,
            FrameError::ConnectionClosed => FrameErrorKind::Closed,
        }
    }

    /// True when the frame was dropped but the link is still usable.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.kind(), FrameErrorKind::Io | FrameErrorKind::Closed)
    }

    /// True for a read that hit the transport timeout without completing a frame.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            FrameError::Io(err) if matches!(
                err.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            )
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_errors_are_recoverable() {
        let recoverable = [
            FrameError::TruncatedEscape,
            FrameError::InvalidEscape(0x00),
            FrameError::UnescapedEnd,
            FrameError::ChecksumMismatch {
                computed: 1,
                received: 2,
            },
            FrameError::ShortFrame { len: 1, min: 2 },
            FrameError::Oversize { max: 8 },
        ];
        for err in recoverable {
            assert!(err.is_recoverable(), "{err} should be recoverable");
        }

        assert!(!FrameError::ConnectionClosed.is_recoverable());
        assert!(!FrameError::Io(std::io::Error::other("gone")).is_recoverable());
    }

    #[test]
    fn kinds() {
        assert_eq!(FrameError::TruncatedEscape.kind(), FrameErrorKind::Framing);
        assert_eq!(FrameError::InvalidEscape(7).kind(), FrameErrorKind::Framing);
        assert_eq!(
            FrameError::ChecksumMismatch {
                computed: 0,
                received: 0
            }
            .kind(),
            FrameErrorKind::Checksum
        );
        assert_eq!(FrameError::Oversize { max: 1 }.kind(), FrameErrorKind::Oversize);
    }

    #[test]
    fn timeout_detection() {
        let err = FrameError::Io(std::io::Error::from(std::io::ErrorKind::TimedOut));
        assert!(err.is_timeout());
        assert!(!FrameError::ConnectionClosed.is_timeout());
    }

    #[test]
    fn display_formats_hex() {
        let err = FrameError::ChecksumMismatch {
            computed: 0x48C4,
            received: 0x0001,
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch (computed 0x48c4, received 0x0001)"
        );
        assert_eq!(
            FrameError::InvalidEscape(0x41).to_string(),
            "invalid escape sequence (0xDB followed by 0x41)"
        );
    }
}
