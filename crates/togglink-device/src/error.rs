/// Errors that can occur talking to a controller.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] togglink_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] togglink_frame::FrameError),

    /// A verified frame is too short to be a telemetry record.
    #[error("telemetry frame too short ({len} bytes, min {min})")]
    ShortTelemetry { len: usize, min: usize },

    /// Button indices are five bits wide.
    #[error("button {0} out of range (0-31)")]
    ButtonOutOfRange(u8),

    /// Byte does not encode a known command type.
    #[error("invalid command byte {0:#04x}")]
    InvalidCommand(u8),
}

impl DeviceError {
    /// True when only the current frame was lost and the link is still usable.
    pub fn is_recoverable(&self) -> bool {
        match self {
            DeviceError::Frame(err) => err.is_recoverable(),
            DeviceError::ShortTelemetry { .. } => true,
            _ => false,
        }
    }

    /// True when a read gave up waiting on a quiet link.
    pub fn is_timeout(&self) -> bool {
        matches!(self, DeviceError::Frame(err) if err.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, DeviceError>;
