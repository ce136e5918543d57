use std::path::PathBuf;
use std::time::Duration;

/// Device path the controller enumerates as on a typical Linux host.
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";

/// Line speed the controller firmware runs at.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default blocking read timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Serial link settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// Path of the serial device (e.g. `/dev/ttyUSB0`, `COM3`).
    pub device: PathBuf,
    /// Baud rate. Default: 9600.
    pub baud_rate: u32,
    /// Timeout applied to blocking reads and writes. Default: 1s.
    pub timeout: Duration,
}

impl LinkConfig {
    /// Settings for `device` with default baud rate and timeout.
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
            ..Self::default()
        }
    }

    /// Override the baud rate.
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Override the read/write timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from(DEFAULT_DEVICE),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
