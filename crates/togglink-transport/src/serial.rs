use tracing::{debug, info};

use crate::config::LinkConfig;
use crate::error::{Result, TransportError};
use crate::stream::LinkStream;

/// Serial device transport.
///
/// Opens the device named in a [`LinkConfig`] in 8N1 mode with no flow
/// control, which is what the controller firmware expects.
pub struct SerialLink;

impl SerialLink {
    /// Open the configured serial device.
    pub fn open(config: &LinkConfig) -> Result<LinkStream> {
        let path = config.device.to_string_lossy().into_owned();
        debug!(device = %path, baud = config.baud_rate, "opening serial port");

        let port = serialport::new(path.as_str(), config.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(config.timeout)
            .open()
            .map_err(|source| TransportError::Open {
                path: config.device.clone(),
                source,
            })?;

        info!(device = %path, baud = config.baud_rate, "serial port open");
        Ok(LinkStream::from_port(port))
    }
}

/// Coarse classification of a serial device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    Usb,
    Pci,
    Bluetooth,
    Unknown,
}

impl PortKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PortKind::Usb => "usb",
            PortKind::Pci => "pci",
            PortKind::Bluetooth => "bluetooth",
            PortKind::Unknown => "unknown",
        }
    }
}

/// A serial device discovered on this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub name: String,
    pub kind: PortKind,
    /// Product string for USB adapters, when the driver reports one.
    pub product: Option<String>,
}

/// List the serial devices present on this host.
pub fn available_ports() -> Result<Vec<PortInfo>> {
    let ports = serialport::available_ports().map_err(TransportError::Enumerate)?;
    Ok(ports.into_iter().map(port_info).collect())
}

fn port_info(port: serialport::SerialPortInfo) -> PortInfo {
    let (kind, product) = match port.port_type {
        serialport::SerialPortType::UsbPort(usb) => (PortKind::Usb, usb.product),
        serialport::SerialPortType::PciPort => (PortKind::Pci, None),
        serialport::SerialPortType::BluetoothPort => (PortKind::Bluetooth, None),
        serialport::SerialPortType::Unknown => (PortKind::Unknown, None),
    };
    PortInfo {
        name: port.port_name,
        kind,
        product,
    }
}
