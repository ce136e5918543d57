//! `tokio_util::codec` adapter for running the protocol on an async stream.

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{encode_frame, open_payload, Frame, DEFAULT_MAX_FRAME_SIZE};
use crate::error::{FrameError, Result};
use crate::receiver::FrameReceiver;

/// SLIP + CRC-16/XMODEM codec for `Framed` streams.
///
/// Protocol errors are yielded as `Err` items rather than stream errors, so a
/// single corrupt frame does not terminate a `FramedRead`. The stream error
/// type is reserved for I/O failures.
#[derive(Debug)]
pub struct SlipCodec {
    receiver: FrameReceiver,
}

impl Default for SlipCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl SlipCodec {
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self {
            receiver: FrameReceiver::with_max_frame_size(max_frame_size),
        }
    }
}

impl Decoder for SlipCodec {
    type Item = Result<Frame>;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> std::io::Result<Option<Self::Item>> {
        while src.has_remaining() {
            let byte = src.get_u8();
            match self.receiver.feed(byte) {
                Ok(Some(payload)) => return Ok(Some(open_payload(&payload))),
                Ok(None) => {}
                Err(err) => return Ok(Some(Err(err))),
            }
        }
        Ok(None)
    }
}

impl<'a> Encoder<&'a [u8]> for SlipCodec {
    type Error = FrameError;

    fn encode(&mut self, content: &'a [u8], dst: &mut BytesMut) -> Result<()> {
        let start = dst.len();
        encode_frame(content, dst);
        let raw = dst.len() - start - 2;
        let max = self.receiver.max_frame_size();
        if raw > max {
            dst.truncate(start);
            return Err(FrameError::Oversize { max });
        }
        Ok(())
    }
}

impl Encoder<Bytes> for SlipCodec {
    type Error = FrameError;

    fn encode(&mut self, content: Bytes, dst: &mut BytesMut) -> Result<()> {
        Encoder::<&[u8]>::encode(self, content.as_ref(), dst)
    }
}

#[cfg(test)]
mod tests {
    use futures_util::{SinkExt, StreamExt};
    use tokio_util::codec::{FramedRead, FramedWrite};

    use super::*;
    use crate::slip::{END, ESC};

    #[tokio::test]
    async fn reads_frames_and_survives_errors() {
        let mut wire = BytesMut::new();
        encode_frame(&[0x40], &mut wire);
        wire.extend_from_slice(&[END, 0x01, 0x02, ESC, END]);
        encode_frame(&[0x41, 0x42], &mut wire);
        let wire = wire.to_vec();

        let mut frames = FramedRead::new(wire.as_slice(), SlipCodec::new());

        let first = frames.next().await.unwrap().unwrap().unwrap();
        assert_eq!(first.content.as_ref(), [0x40]);

        let second = frames.next().await.unwrap().unwrap();
        assert!(matches!(second, Err(FrameError::TruncatedEscape)));

        let third = frames.next().await.unwrap().unwrap().unwrap();
        assert_eq!(third.content.as_ref(), [0x41, 0x42]);

        assert!(frames.next().await.is_none());
    }

    #[tokio::test]
    async fn writes_frames() {
        let mut sink = FramedWrite::new(Vec::new(), SlipCodec::new());
        sink.send(Bytes::from_static(&[0x40])).await.unwrap();
        sink.send(Bytes::from_static(&[0x58])).await.unwrap();

        assert_eq!(
            sink.get_ref().as_slice(),
            [END, 0x40, 0x48, 0xC4, END, END, 0x58, ESC, 0xDD, 0xFD, END]
        );
    }

    #[test]
    fn oversize_encode_leaves_buffer_untouched() {
        let mut codec = SlipCodec::with_max_frame_size(4);
        let mut dst = BytesMut::from(&[0xAA][..]);
        let err = Encoder::<&[u8]>::encode(&mut codec, b"too long", &mut dst).unwrap_err();
        assert!(matches!(err, FrameError::Oversize { max: 4 }));
        assert_eq!(dst.as_ref(), [0xAA]);
    }

    #[test]
    fn decode_keeps_partial_frame_across_calls() {
        let mut codec = SlipCodec::new();
        let mut src = BytesMut::from(&[END, 0x40, 0x48][..]);
        assert!(codec.decode(&mut src).unwrap().is_none());
        assert!(src.is_empty());

        src.extend_from_slice(&[0xC4, END]);
        let frame = codec.decode(&mut src).unwrap().unwrap().unwrap();
        assert_eq!(frame.content.as_ref(), [0x40]);
    }
}
