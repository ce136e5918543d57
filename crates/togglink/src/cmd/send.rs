use togglink_device::Command;

use crate::cmd::{LinkArgs, SendArgs};
use crate::exit::{device_error, CliError, CliResult, SUCCESS};
use crate::output::{print_sent, OutputFormat};

pub fn run(args: SendArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let commands = args
        .commands
        .iter()
        .map(|arg| parse_command(arg))
        .collect::<CliResult<Vec<_>>>()?;

    let mut device = link.open()?;
    let frames = device
        .send(&commands)
        .map_err(|err| device_error("send failed", err))?;

    print_sent(&link.device_name(), &commands, &frames, format);
    Ok(SUCCESS)
}

/// Parse `toggle:N`, `on:N`, `off:N`, `refresh` or `none`.
pub fn parse_command(input: &str) -> CliResult<Command> {
    let input = input.trim();
    let (name, button) = match input.split_once(':') {
        Some((name, button)) => (name, Some(button)),
        None => (input, None),
    };

    let command = match (name.to_ascii_lowercase().as_str(), button) {
        ("refresh", None) => Ok(Command::Refresh),
        ("none", None) => Ok(Command::None),
        ("toggle", Some(n)) => Command::toggle(parse_button(n)?),
        ("on", Some(n)) => Command::on(parse_button(n)?),
        ("off", Some(n)) => Command::off(parse_button(n)?),
        ("refresh" | "none", Some(_)) => {
            return Err(CliError::usage(format!("`{name}` takes no button: {input}")))
        }
        ("toggle" | "on" | "off", None) => {
            return Err(CliError::usage(format!(
                "`{name}` needs a button, e.g. {name}:3"
            )))
        }
        _ => return Err(CliError::usage(format!("unknown command: {input}"))),
    };

    command.map_err(|err| device_error("invalid command", err))
}

fn parse_button(input: &str) -> CliResult<u8> {
    input
        .trim()
        .parse()
        .map_err(|_| CliError::usage(format!("invalid button: {input}")))
}
