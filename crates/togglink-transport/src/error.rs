use std::path::PathBuf;

/// Errors that can occur in serial transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the serial device.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: serialport::Error,
    },

    /// Failed to reconfigure an already open serial device.
    #[error("failed to configure serial port: {0}")]
    Configure(serialport::Error),

    /// Failed to enumerate the serial devices on this host.
    #[error("failed to list serial ports: {0}")]
    Enumerate(serialport::Error),

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// The `std::io::ErrorKind` closest to this error, used for exit-code mapping.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            TransportError::Io(err) => Some(err.kind()),
            TransportError::Open { source, .. }
            | TransportError::Configure(source)
            | TransportError::Enumerate(source) => match source.kind() {
                serialport::ErrorKind::Io(kind) => Some(kind),
                serialport::ErrorKind::NoDevice => Some(std::io::ErrorKind::NotFound),
                _ => None,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
