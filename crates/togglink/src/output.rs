use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use togglink_device::{Command, TelemetryRecord};
use togglink_transport::PortInfo;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize, Debug, PartialEq)]
struct EventOutput {
    button: u8,
    kind: &'static str,
}

#[derive(Serialize, Debug)]
struct RecordOutput {
    events: Vec<EventOutput>,
    output_state: Option<String>,
    outputs_on: Option<Vec<u8>>,
    timestamp: String,
}

impl RecordOutput {
    fn new(record: &TelemetryRecord) -> Self {
        let state = record.output_state();
        Self {
            events: record
                .events()
                .map(|event| EventOutput {
                    button: event.button,
                    kind: event.kind.as_str(),
                })
                .collect(),
            output_state: state.map(|s| s.to_string()),
            outputs_on: state.map(|s| (0..32).filter(|&i| s.is_on(i)).collect()),
            timestamp: now_unix_seconds(),
        }
    }
}

pub fn print_record(record: &TelemetryRecord, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&RecordOutput::new(record)),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["BUTTON", "EVENT"]);
            for event in record.events() {
                table.add_row(vec![
                    event.button.to_string(),
                    event.kind.as_str().to_string(),
                ]);
            }
            if let Some(state) = record.output_state() {
                table.add_row(vec!["outputs".to_string(), state.to_string()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for event in record.events() {
                println!("{event}");
            }
            if let Some(state) = record.output_state() {
                println!("{state}");
            }
        }
        OutputFormat::Raw => print_raw(&record.to_bytes()),
    }
}

#[derive(Serialize)]
struct SentOutput<'a> {
    device: &'a str,
    commands: Vec<String>,
    frames: usize,
}

/// Report commands that were written to the device.
///
/// `frames` holds the exact bytes put on the wire.
pub fn print_sent(device: &str, commands: &[Command], frames: &[Bytes], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&SentOutput {
            device,
            commands: commands.iter().map(ToString::to_string).collect(),
            frames: frames.len(),
        }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["COMMAND", "BYTE"]);
            for command in commands {
                table.add_row(vec![
                    command.to_string(),
                    format!("{:02X}", command.to_byte()),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let list: Vec<String> = commands.iter().map(ToString::to_string).collect();
            println!("sent {} to {device}", list.join(", "));
        }
        OutputFormat::Raw => {
            for frame in frames {
                print_raw(frame);
            }
        }
    }
}

#[derive(Serialize, Debug, PartialEq)]
struct PortOutput<'a> {
    name: &'a str,
    kind: &'static str,
    product: Option<&'a str>,
}

fn port_output(port: &PortInfo) -> PortOutput<'_> {
    PortOutput {
        name: &port.name,
        kind: port.kind.as_str(),
        product: port.product.as_deref(),
    }
}

pub fn print_ports(ports: &[PortInfo], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out: Vec<PortOutput<'_>> = ports.iter().map(port_output).collect();
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PORT", "KIND", "PRODUCT"]);
            for port in ports {
                table.add_row(vec![
                    port.name.clone(),
                    port.kind.as_str().to_string(),
                    port.product.clone().unwrap_or_default(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if ports.is_empty() {
                println!("no serial ports found");
            }
            for port in ports {
                match &port.product {
                    Some(product) => println!("{} ({}, {product})", port.name, port.kind.as_str()),
                    None => println!("{} ({})", port.name, port.kind.as_str()),
                }
            }
        }
        OutputFormat::Raw => {
            for port in ports {
                println!("{}", port.name);
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use togglink_device::{decode_telemetry, ButtonEvent, OutputState};
    use togglink_transport::PortKind;

    use super::*;

    #[test]
    fn record_json_shape() {
        let record = TelemetryRecord::from_events(
            &[ButtonEvent::press(1), ButtonEvent::release(4)],
            Some(OutputState::new([0, 0, 0, 0x12])),
        );
        let value = serde_json::to_value(RecordOutput::new(&record)).unwrap();

        assert_eq!(value["events"][0]["button"], 1);
        assert_eq!(value["events"][0]["kind"], "press");
        assert_eq!(value["events"][1]["kind"], "release");
        assert_eq!(value["output_state"], "00000012");
        assert_eq!(value["outputs_on"], serde_json::json!([1, 4]));
    }

    #[test]
    fn record_without_output_state() {
        let record = decode_telemetry(&[0u8; 32]).unwrap();
        let value = serde_json::to_value(RecordOutput::new(&record)).unwrap();

        assert_eq!(value["events"], serde_json::json!([]));
        assert!(value["output_state"].is_null());
        assert!(value["outputs_on"].is_null());
    }

    #[test]
    fn port_json_shape() {
        let port = PortInfo {
            name: "/dev/ttyUSB0".to_string(),
            kind: PortKind::Usb,
            product: Some("CP2102".to_string()),
        };
        assert_eq!(
            port_output(&port),
            PortOutput {
                name: "/dev/ttyUSB0",
                kind: "usb",
                product: Some("CP2102"),
            }
        );
    }
}
