//! Commands and telemetry for togglink button controllers.
//!
//! This is the "just works" layer. Open a [`DeviceLink`] on a serial port,
//! send [`Command`]s, and receive [`TelemetryRecord`]s describing button
//! presses and the controller's output state.

pub mod command;
pub mod error;
pub mod link;
pub mod telemetry;

pub use command::{
    encode_command_batches, encode_command_bytes, encode_commands, Command, MAX_BUTTON,
    MAX_COMMANDS_PER_FRAME,
};
pub use error::{DeviceError, Result};
pub use link::{open, open_with_config, DeviceLink, SerialDeviceLink};
pub use telemetry::{
    decode_telemetry, ButtonEvent, EventKind, Events, OutputState, TelemetryRecord, EVENT_SLOTS,
    OUTPUT_STATE_SIZE,
};
