use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use togglink_device::SerialDeviceLink;
use togglink_transport::{LinkConfig, DEFAULT_BAUD_RATE, DEFAULT_DEVICE};

use crate::exit::{device_error, CliError, CliResult};
use crate::output::OutputFormat;

pub mod monitor;
pub mod ports;
pub mod send;
pub mod toggle;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send commands in a single frame (toggle:N, on:N, off:N, refresh, none).
    Send(SendArgs),
    /// Toggle outputs. Without arguments, prompts for buttons until EOF or `q`.
    Toggle(ToggleArgs),
    /// Print button events and output state reported by the controller.
    Monitor(MonitorArgs),
    /// List serial ports on this host.
    Ports,
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, link, format),
        Command::Toggle(args) => toggle::run(args, link, format),
        Command::Monitor(args) => monitor::run(args, link, format),
        Command::Ports => ports::run(format),
        Command::Version(args) => version::run(args),
    }
}

/// Serial settings shared by every subcommand that talks to a controller.
#[derive(Args, Debug, Clone)]
pub struct LinkArgs {
    /// Serial device the controller is attached to.
    #[arg(long, env = "TOGGLINK_DEVICE", default_value = DEFAULT_DEVICE, global = true)]
    pub device: PathBuf,

    /// Baud rate.
    #[arg(long, env = "TOGGLINK_BAUD", default_value_t = DEFAULT_BAUD_RATE, global = true)]
    pub baud: u32,

    /// Read timeout (e.g. 1s, 500ms).
    #[arg(long, default_value = "1s", global = true)]
    pub timeout: String,
}

impl LinkArgs {
    pub fn config(&self) -> CliResult<LinkConfig> {
        Ok(LinkConfig::new(self.device.clone())
            .with_baud_rate(self.baud)
            .with_timeout(parse_duration(&self.timeout)?))
    }

    pub fn open(&self) -> CliResult<SerialDeviceLink> {
        let config = self.config()?;
        togglink_device::open(&config).map_err(|err| device_error("open failed", err))
    }

    pub fn device_name(&self) -> String {
        self.device.display().to_string()
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Commands to send, in order.
    #[arg(required = true, value_name = "CMD")]
    pub commands: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ToggleArgs {
    /// Buttons to toggle (0-31).
    #[arg(value_name = "N")]
    pub buttons: Vec<u8>,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Exit after printing N telemetry records.
    #[arg(long)]
    pub count: Option<usize>,
    /// Fail on the first corrupt frame instead of skipping it.
    #[arg(long)]
    pub strict: bool,
    /// Ask the controller for its output state before listening.
    #[arg(long)]
    pub refresh: bool,
    /// Keep asking for the output state at this interval (e.g. 10s).
    #[arg(long, value_name = "DURATION")]
    pub refresh_interval: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::usage("duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::usage(format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::usage("duration must be greater than zero"));
    }

    if millis {
        Ok(Duration::from_millis(value))
    } else {
        Ok(Duration::from_secs(value))
    }
}
