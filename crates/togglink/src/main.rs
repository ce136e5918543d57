mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::{Command, LinkArgs};
use crate::logging::{device_span, init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "togglink",
    version,
    about = "Toggle outputs and watch buttons on a togglink controller"
)]
struct Cli {
    #[command(flatten)]
    link: LinkArgs,

    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(
        long,
        value_name = "FORMAT",
        env = "TOGGLINK_LOG_FORMAT",
        default_value = "text",
        global = true
    )]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        env = "TOGGLINK_LOG_LEVEL",
        default_value = "info",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = match cli.command {
        command @ (Command::Ports | Command::Version(_)) => cmd::run(command, &cli.link, format),
        command => {
            device_span(&cli.link.device).in_scope(|| cmd::run(command, &cli.link, format))
        }
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn parses_send_with_global_flags() {
        let cli = Cli::try_parse_from([
            "togglink",
            "--device",
            "/dev/ttyACM0",
            "send",
            "toggle:4",
            "refresh",
            "--baud",
            "19200",
        ])
        .expect("send args should parse");

        assert_eq!(cli.link.device, PathBuf::from("/dev/ttyACM0"));
        assert_eq!(cli.link.baud, 19200);
        match cli.command {
            Command::Send(args) => assert_eq!(args.commands, ["toggle:4", "refresh"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn send_requires_a_command() {
        let err = Cli::try_parse_from(["togglink", "send"]).expect_err("empty send should fail");
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn toggle_without_buttons_is_interactive() {
        let cli = Cli::try_parse_from(["togglink", "toggle"]).expect("toggle should parse");
        assert!(matches!(cli.command, Command::Toggle(ref args) if args.buttons.is_empty()));
    }

    #[test]
    fn parses_monitor_flags() {
        let cli = Cli::try_parse_from([
            "togglink",
            "monitor",
            "--count",
            "3",
            "--strict",
            "--refresh",
            "--refresh-interval",
            "10s",
            "--timeout",
            "250ms",
            "--log-level",
            "warn",
        ])
        .expect("monitor args should parse");

        assert_eq!(cli.log_level, LogLevel::Warn);
        assert_eq!(cli.link.timeout, "250ms");
        match cli.command {
            Command::Monitor(args) => {
                assert_eq!(args.count, Some(3));
                assert!(args.strict);
                assert!(args.refresh);
                assert_eq!(args.refresh_interval.as_deref(), Some("10s"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_format() {
        let cli = Cli::try_parse_from(["togglink", "--format", "raw", "ports"])
            .expect("ports should parse");
        assert_eq!(cli.format, Some(OutputFormat::Raw));
        assert!(matches!(cli.command, Command::Ports));
    }
}
