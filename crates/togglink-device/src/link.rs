use std::io::{Read, Write};

use bytes::Bytes;
use togglink_frame::{Frame, FrameConfig, FrameReader, FrameWriter};
use togglink_transport::{LinkConfig, LinkStream, SerialLink};
use tracing::{debug, info};

use crate::command::{encode_command_batches, Command};
use crate::error::Result;
use crate::telemetry::{decode_telemetry, TelemetryRecord};

/// A device link over an opened serial port.
pub type SerialDeviceLink = DeviceLink<LinkStream, LinkStream>;

/// Open a serial device and wrap it in a [`DeviceLink`].
///
/// The link's read timeout comes from `config.timeout`.
pub fn open(config: &LinkConfig) -> Result<SerialDeviceLink> {
    let frame_config = FrameConfig {
        read_timeout: Some(config.timeout),
        ..FrameConfig::default()
    };
    open_with_config(config, frame_config)
}

/// Open with explicit frame limits.
pub fn open_with_config(
    config: &LinkConfig,
    frame_config: FrameConfig,
) -> Result<SerialDeviceLink> {
    let stream = SerialLink::open(config)?;
    // Bytes queued before the link existed belong to no frame we can trust.
    stream.clear_buffers()?;
    let reader_stream = stream.try_clone()?;

    let reader = FrameReader::with_config_link(reader_stream, frame_config.clone())?;
    let writer = FrameWriter::with_config(stream, frame_config);

    info!(device = %config.device.display(), "device link ready");
    Ok(DeviceLink::from_parts(reader, writer))
}

/// Sends commands to a controller and reads its telemetry.
///
/// Reading and writing use independent halves, so the link works over any
/// pair of `Read`/`Write` streams, not only serial ports.
pub struct DeviceLink<R, W> {
    reader: FrameReader<R>,
    writer: FrameWriter<W>,
}

impl<R: Read, W: Write> DeviceLink<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self::from_parts(FrameReader::new(reader), FrameWriter::new(writer))
    }

    pub fn from_parts(reader: FrameReader<R>, writer: FrameWriter<W>) -> Self {
        Self { reader, writer }
    }

    /// Send `commands`, split into as many frames as needed.
    ///
    /// Returns the frames exactly as written. Sending an empty slice writes
    /// nothing.
    pub fn send(&mut self, commands: &[Command]) -> Result<Vec<Bytes>> {
        let frames = encode_command_batches(commands);
        for frame in &frames {
            self.writer.send_encoded(frame)?;
        }
        debug!(count = commands.len(), frames = frames.len(), "commands sent");
        Ok(frames)
    }

    /// Toggle one output.
    pub fn toggle(&mut self, button: u8) -> Result<()> {
        self.send(&[Command::toggle(button)?])?;
        Ok(())
    }

    /// Ask the controller to report its output state.
    pub fn request_refresh(&mut self) -> Result<()> {
        self.send(&[Command::Refresh])?;
        Ok(())
    }

    /// Read the next verified frame without interpreting it.
    pub fn recv_frame(&mut self) -> Result<Frame> {
        Ok(self.reader.read_frame()?)
    }

    /// Read and decode the next telemetry frame.
    ///
    /// Framing, checksum and short-frame errors are returned after the bad
    /// frame has been dropped, so the caller may keep reading.
    pub fn recv_telemetry(&mut self) -> Result<TelemetryRecord> {
        let frame = self.recv_frame()?;
        decode_telemetry(&frame.content)
    }

    pub fn into_parts(self) -> (FrameReader<R>, FrameWriter<W>) {
        (self.reader, self.writer)
    }
}

impl<R, W> std::fmt::Debug for DeviceLink<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceLink").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::BytesMut;
    use togglink_frame::{encode_frame, FrameError};

    use super::*;
    use crate::command::MAX_COMMANDS_PER_FRAME;
    use crate::error::DeviceError;
    use crate::telemetry::ButtonEvent;

    fn wire(frames: &[&[u8]]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        for content in frames {
            encode_frame(content, &mut buf);
        }
        buf.to_vec()
    }

    fn link_with_input(input: Vec<u8>) -> DeviceLink<Cursor<Vec<u8>>, Vec<u8>> {
        DeviceLink::new(Cursor::new(input), Vec::new())
    }

    fn written(link: DeviceLink<Cursor<Vec<u8>>, Vec<u8>>) -> Vec<u8> {
        let (_, writer) = link.into_parts();
        writer.into_inner()
    }

    #[test]
    fn toggle_writes_one_frame() {
        let mut link = link_with_input(Vec::new());
        link.toggle(24).unwrap();
        assert_eq!(written(link), [0xC0, 0x58, 0xDB, 0xDD, 0xFD, 0xC0]);
    }

    #[test]
    fn toggle_out_of_range() {
        let mut link = link_with_input(Vec::new());
        let err = link.toggle(32).unwrap_err();
        assert!(matches!(err, DeviceError::ButtonOutOfRange(32)));
        assert!(written(link).is_empty());
    }

    #[test]
    fn refresh_request() {
        let mut link = link_with_input(Vec::new());
        link.request_refresh().unwrap();
        assert_eq!(written(link), wire(&[&[0x20]]));
    }

    #[test]
    fn send_reports_the_bytes_written() {
        let mut link = link_with_input(Vec::new());
        let frames = link.send(&[Command::Toggle(24), Command::On(0)]).unwrap();

        let reported: Vec<u8> = frames.iter().flat_map(|f| f.iter().copied()).collect();
        assert_eq!(written(link), reported);
        assert_eq!(&reported[..3], [0xC0, 0x58, 0xDB]);
    }

    #[test]
    fn empty_send_writes_nothing() {
        let mut link = link_with_input(Vec::new());
        link.send(&[]).unwrap();
        assert!(written(link).is_empty());
    }

    #[test]
    fn long_command_lists_are_split() {
        let commands = vec![Command::Refresh; MAX_COMMANDS_PER_FRAME + 1];
        let mut link = link_with_input(Vec::new());
        let frames = link.send(&commands).unwrap();
        assert_eq!(frames.len(), 2);

        let mut reader = FrameReader::new(Cursor::new(written(link)));
        assert_eq!(reader.read_frame().unwrap().content.len(), MAX_COMMANDS_PER_FRAME);
        assert_eq!(reader.read_frame().unwrap().content.as_ref(), [0x20]);
    }

    #[test]
    fn telemetry_then_bad_frame_then_telemetry() {
        let mut first = vec![0u8; 32];
        first[0] = 0x41;
        let mut second = vec![0u8; 32];
        second[0] = 0xC1;
        second.extend_from_slice(&[0, 0, 0, 2]);

        let mut input = wire(&[&first]);
        input.extend_from_slice(&[0xC0, 0x41, 0x00, 0x00, 0xC0]);
        input.extend(wire(&[&second]));

        let mut link = link_with_input(input);

        let record = link.recv_telemetry().unwrap();
        assert_eq!(record.events().collect::<Vec<_>>(), [ButtonEvent::press(1)]);

        let err = link.recv_telemetry().unwrap_err();
        assert!(err.is_recoverable());
        assert!(matches!(
            err,
            DeviceError::Frame(FrameError::ChecksumMismatch { .. })
        ));

        let record = link.recv_telemetry().unwrap();
        assert_eq!(record.events().collect::<Vec<_>>(), [ButtonEvent::release(1)]);
        assert!(record.output_state().unwrap().is_on(1));
    }

    #[test]
    fn short_telemetry_is_recoverable() {
        let mut link = link_with_input(wire(&[&[0x41; 10], &[0u8; 32]]));

        let err = link.recv_telemetry().unwrap_err();
        assert!(matches!(err, DeviceError::ShortTelemetry { len: 10, min: 32 }));
        assert!(err.is_recoverable());

        assert_eq!(link.recv_telemetry().unwrap().events().count(), 0);
    }

    #[test]
    fn end_of_stream() {
        let mut link = link_with_input(Vec::new());
        let err = link.recv_telemetry().unwrap_err();
        assert!(matches!(err, DeviceError::Frame(FrameError::ConnectionClosed)));
        assert!(!err.is_recoverable());
    }

    #[test]
    #[cfg(unix)]
    fn toggle_and_telemetry_over_pty() {
        use std::time::Duration;

        use crate::telemetry::OutputState;

        let (host, device) = serialport::TTYPort::pair().expect("pty pair should open");
        let host = LinkStream::from_port(Box::new(host));
        let frame_config = FrameConfig {
            read_timeout: Some(Duration::from_secs(2)),
            ..FrameConfig::default()
        };
        let reader = FrameReader::with_config_link(host.try_clone().unwrap(), frame_config.clone())
            .unwrap();
        let writer = FrameWriter::with_config(host, frame_config);
        let mut link = DeviceLink::from_parts(reader, writer);

        let controller = std::thread::spawn(move || {
            let device = LinkStream::from_port(Box::new(device));
            let config = FrameConfig {
                read_timeout: Some(Duration::from_secs(2)),
                ..FrameConfig::default()
            };
            let mut reader =
                FrameReader::with_config_link(device.try_clone().unwrap(), config).unwrap();
            let mut writer = FrameWriter::new(device);

            let frame = reader.read_frame().unwrap();
            let command = Command::from_byte(frame.content[0]).unwrap();
            let button = command.button().unwrap();

            let record = TelemetryRecord::from_events(
                &[ButtonEvent::press(button)],
                Some(OutputState::new(1u32.wrapping_shl(button as u32).to_be_bytes())),
            );
            writer.send(&record.to_bytes()).unwrap();
            // Hand the port back so it stays open until the host has read.
            (reader, writer)
        });

        link.toggle(3).unwrap();
        let record = link.recv_telemetry().unwrap();
        let device_port = controller.join().unwrap();

        assert_eq!(record.events().collect::<Vec<_>>(), [ButtonEvent::press(3)]);
        assert!(record.output_state().unwrap().is_on(3));
        drop(device_port);
    }
}
