use std::io::{self, BufRead, Read, Write};

use togglink_device::{Command, DeviceError, DeviceLink};

use crate::cmd::{LinkArgs, ToggleArgs};
use crate::exit::{device_error, io_error, CliResult, SUCCESS};
use crate::output::{print_sent, OutputFormat};

const PROMPT: &str = "Which one to toggle? ";

pub fn run(args: ToggleArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    if args.buttons.is_empty() {
        let mut device = link.open()?;
        let stdin = io::stdin();
        interactive(stdin.lock(), io::stdout(), &mut device)?;
        return Ok(SUCCESS);
    }

    let commands = args
        .buttons
        .iter()
        .map(|&button| Command::toggle(button))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| device_error("invalid button", err))?;

    let mut device = link.open()?;
    let frames = device
        .send(&commands)
        .map_err(|err| device_error("send failed", err))?;

    print_sent(&link.device_name(), &commands, &frames, format);
    Ok(SUCCESS)
}

/// Prompt for button numbers and toggle each one until EOF or `q`.
///
/// Lines that are not a button number in range are reported and skipped.
/// Returns the number of toggles sent.
pub fn interactive<I, O, R, W>(
    input: I,
    mut output: O,
    device: &mut DeviceLink<R, W>,
) -> CliResult<usize>
where
    I: BufRead,
    O: Write,
    R: Read,
    W: Write,
{
    let mut sent = 0usize;
    let mut lines = input.lines();

    loop {
        write!(output, "{PROMPT}").map_err(|err| io_error("prompt failed", err))?;
        output.flush().map_err(|err| io_error("prompt failed", err))?;

        let line = match lines.next() {
            Some(line) => line.map_err(|err| io_error("read failed", err))?,
            None => break,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("q") {
            break;
        }

        let button = match line.parse::<u8>() {
            Ok(button) => button,
            Err(_) => {
                writeln!(output, "not a button: {line}")
                    .map_err(|err| io_error("write failed", err))?;
                continue;
            }
        };

        match device.toggle(button) {
            Ok(()) => sent += 1,
            Err(err @ DeviceError::ButtonOutOfRange(_)) => {
                writeln!(output, "{err}").map_err(|err| io_error("write failed", err))?;
            }
            Err(err) => return Err(device_error("toggle failed", err)),
        }
    }

    writeln!(output).map_err(|err| io_error("write failed", err))?;
    Ok(sent)
}
