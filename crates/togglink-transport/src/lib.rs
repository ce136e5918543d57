//! Serial transport for togglink.
//!
//! This is the lowest layer of togglink: it opens the serial device that
//! connects the host to the controller and hands out a [`LinkStream`]
//! implementing `Read + Write`. Everything else builds on top of it.
//!
//! The transport knows nothing about frames. Device path, baud rate and
//! timeouts are configured here and nowhere else.

pub mod config;
pub mod error;
pub mod serial;
pub mod stream;

pub use config::{LinkConfig, DEFAULT_BAUD_RATE, DEFAULT_DEVICE, DEFAULT_TIMEOUT};
pub use error::{Result, TransportError};
pub use serial::{available_ports, PortInfo, PortKind, SerialLink};
pub use stream::LinkStream;
