use std::fmt;

use bytes::{Bytes, BytesMut};
use togglink_frame::encode_frame;

use crate::error::{DeviceError, Result};

const TYPE_MASK: u8 = 0xE0;
const BUTTON_MASK: u8 = 0x1F;

const NONE: u8 = 0x00;
const REFRESH: u8 = 0x20;
const TOGGLE: u8 = 0x40;
const OFF: u8 = 0x80;
const ON: u8 = 0xC0;

/// Highest addressable button/output index.
pub const MAX_BUTTON: u8 = BUTTON_MASK;

/// Commands per frame the controller accepts (128-byte message limit minus header).
pub const MAX_COMMANDS_PER_FRAME: usize = 125;

/// A single controller command, one byte on the wire.
///
/// ```text
///  7   6   5   4   3   2   1   0
/// ┌───────────┬───────────────────┐
/// │   type    │  button / output  │
/// └───────────┴───────────────────┘
/// type: 000 none, 001 refresh, 010 toggle, 100 off, 110 on
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// No-op.
    None,
    /// Ask the controller to send a telemetry frame now.
    Refresh,
    /// Flip an output.
    Toggle(u8),
    /// Switch an output off.
    Off(u8),
    /// Switch an output on.
    On(u8),
}

impl Command {
    pub fn toggle(button: u8) -> Result<Self> {
        check_button(button).map(Command::Toggle)
    }

    pub fn on(button: u8) -> Result<Self> {
        check_button(button).map(Command::On)
    }

    pub fn off(button: u8) -> Result<Self> {
        check_button(button).map(Command::Off)
    }

    /// Wire representation. Out-of-range buttons are masked to five bits.
    pub fn to_byte(self) -> u8 {
        match self {
            Command::None => NONE,
            Command::Refresh => REFRESH,
            Command::Toggle(button) => TOGGLE | (button & BUTTON_MASK),
            Command::Off(button) => OFF | (button & BUTTON_MASK),
            Command::On(button) => ON | (button & BUTTON_MASK),
        }
    }

    pub fn from_byte(byte: u8) -> Result<Self> {
        let button = byte & BUTTON_MASK;
        match byte & TYPE_MASK {
            NONE => Ok(Command::None),
            REFRESH => Ok(Command::Refresh),
            TOGGLE => Ok(Command::Toggle(button)),
            OFF => Ok(Command::Off(button)),
            ON => Ok(Command::On(button)),
            _ => Err(DeviceError::InvalidCommand(byte)),
        }
    }

    /// The button this command targets, if any.
    pub fn button(self) -> Option<u8> {
        match self {
            Command::Toggle(button) | Command::Off(button) | Command::On(button) => Some(button),
            Command::None | Command::Refresh => None,
        }
    }
}

fn check_button(button: u8) -> Result<u8> {
    if button > MAX_BUTTON {
        return Err(DeviceError::ButtonOutOfRange(button));
    }
    Ok(button)
}

impl From<Command> for u8 {
    fn from(command: Command) -> Self {
        command.to_byte()
    }
}

impl TryFrom<u8> for Command {
    type Error = DeviceError;

    fn try_from(byte: u8) -> Result<Self> {
        Command::from_byte(byte)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::None => write!(f, "none"),
            Command::Refresh => write!(f, "refresh"),
            Command::Toggle(button) => write!(f, "toggle:{button}"),
            Command::Off(button) => write!(f, "off:{button}"),
            Command::On(button) => write!(f, "on:{button}"),
        }
    }
}

/// Build one command frame from raw command bytes.
pub fn encode_command_bytes(commands: &[u8]) -> Bytes {
    let mut buf = BytesMut::new();
    encode_frame(commands, &mut buf);
    buf.freeze()
}

/// Build one command frame carrying every command in `commands`.
pub fn encode_commands(commands: &[Command]) -> Bytes {
    let bytes: Vec<u8> = commands.iter().map(|c| c.to_byte()).collect();
    encode_command_bytes(&bytes)
}

/// Build as many frames as needed to carry `commands`, in order.
///
/// Returns no frames for an empty slice.
pub fn encode_command_batches(commands: &[Command]) -> Vec<Bytes> {
    commands
        .chunks(MAX_COMMANDS_PER_FRAME)
        .map(encode_commands)
        .collect()
}
