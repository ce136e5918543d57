//! Serial command and telemetry link for togglink button controllers.
//!
//! A controller reports button presses and the state of its outputs; the
//! host toggles outputs by sending one-byte commands. Both directions use
//! SLIP-framed packets protected by a CRC-16/XMODEM checksum.
//!
//! # Crate Structure
//!
//! - [`transport`]: serial port access and port discovery
//! - [`frame`]: SLIP framing, checksums and the streaming frame receiver
//! - [`device`]: commands, telemetry decoding and the [`device::DeviceLink`]

/// Re-export transport types.
pub mod transport {
    pub use togglink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use togglink_frame::*;
}

/// Re-export device types.
pub mod device {
    pub use togglink_device::*;
}
