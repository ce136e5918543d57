//! Print button presses and output state as they arrive.
//!
//! Run with:
//!   cargo run --example logger -- /dev/ttyUSB0

use togglink::device::{self, DeviceError};
use togglink::transport::{LinkConfig, DEFAULT_DEVICE};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DEVICE.to_string());
    let mut link = device::open(&LinkConfig::new(path))?;

    loop {
        let record = match link.recv_telemetry() {
            Ok(record) => record,
            Err(err) if err.is_timeout() => continue,
            Err(err) if err.is_recoverable() => {
                eprintln!("skipping frame: {err}");
                continue;
            }
            Err(DeviceError::Frame(err)) => {
                eprintln!("link closed: {err}");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        for event in record.events() {
            println!("{event}");
        }
        if let Some(state) = record.output_state() {
            println!("{state}");
        }
    }
}
