//! Toggle every output once, in a single frame, then read back the state.
//!
//! Run with:
//!   cargo run --example toggle-all -- /dev/ttyUSB0

use togglink::device::{self, Command, MAX_BUTTON};
use togglink::transport::{LinkConfig, DEFAULT_DEVICE};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DEVICE.to_string());
    let mut link = device::open(&LinkConfig::new(path))?;

    let mut commands = (0..=MAX_BUTTON)
        .map(Command::toggle)
        .collect::<Result<Vec<_>, _>>()?;
    commands.push(Command::Refresh);
    link.send(&commands)?;

    loop {
        let record = link.recv_telemetry()?;
        if let Some(state) = record.output_state() {
            println!("outputs: {state}");
            return Ok(());
        }
    }
}
