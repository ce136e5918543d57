use std::fmt;
use std::io;

use togglink_device::DeviceError;
use togglink_frame::FrameError;
use togglink_transport::TransportError;

// Exit codes shared by every subcommand.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(USAGE, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    CliError::new(io_code(err.kind()), format!("{context}: {err}"))
}

fn io_code(kind: io::ErrorKind) -> i32 {
    match kind {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::BrokenPipe | io::ErrorKind::UnexpectedEof => FAILURE,
        _ => INTERNAL,
    }
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    let code = match (&err, err.io_kind()) {
        (TransportError::Io(_), Some(kind)) => io_code(kind),
        (_, Some(io::ErrorKind::PermissionDenied)) => PERMISSION_DENIED,
        _ => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn device_error(context: &str, err: DeviceError) -> CliError {
    match err {
        DeviceError::Transport(err) => transport_error(context, err),
        DeviceError::Frame(err) => frame_error(context, err),
        DeviceError::ShortTelemetry { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        DeviceError::ButtonOutOfRange(_) | DeviceError::InvalidCommand(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn missing_device_is_transport_error() {
        let err = TransportError::Open {
            path: PathBuf::from("/dev/ttyNOPE"),
            source: serialport::Error::new(serialport::ErrorKind::NoDevice, "gone"),
        };
        let cli = transport_error("open failed", err);
        assert_eq!(cli.code, TRANSPORT_ERROR);
        assert!(cli.message.starts_with("open failed: "));
    }

    #[test]
    fn permission_denied_on_open() {
        let err = TransportError::Open {
            path: PathBuf::from("/dev/ttyS0"),
            source: serialport::Error::new(
                serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied),
                "denied",
            ),
        };
        assert_eq!(transport_error("open failed", err).code, PERMISSION_DENIED);
    }

    #[test]
    fn frame_errors_map_to_codes() {
        let timeout = FrameError::Io(io::Error::from(io::ErrorKind::TimedOut));
        assert_eq!(frame_error("read", timeout).code, TIMEOUT);
        assert_eq!(frame_error("read", FrameError::ConnectionClosed).code, FAILURE);
        assert_eq!(
            frame_error("read", FrameError::Oversize { max: 512 }).code,
            DATA_INVALID
        );
        assert_eq!(
            frame_error(
                "read",
                FrameError::ChecksumMismatch {
                    computed: 1,
                    received: 2
                }
            )
            .code,
            DATA_INVALID
        );
    }

    #[test]
    fn device_usage_errors() {
        assert_eq!(
            device_error("toggle", DeviceError::ButtonOutOfRange(40)).code,
            USAGE
        );
        assert_eq!(
            device_error("decode", DeviceError::ShortTelemetry { len: 4, min: 32 }).code,
            DATA_INVALID
        );
    }
}
