//! SLIP framing with CRC-16/XMODEM checksums.
//!
//! This is the core of togglink. Every message on the serial line is:
//! - checksummed: a big-endian CRC-16/XMODEM of the content is appended
//! - escaped: `0xC0` and `0xDB` inside the payload are replaced by two-byte
//!   escape sequences
//! - delimited: an END byte (`0xC0`) opens and closes the frame
//!
//! The [`FrameReceiver`] turns a raw byte stream back into payloads one byte
//! at a time, and [`FrameReader`] / [`FrameWriter`] wrap any blocking
//! `Read` / `Write` stream so callers only ever see verified content.

pub mod checksum;
pub mod codec;
pub mod error;
pub mod reader;
pub mod receiver;
pub mod slip;
pub mod writer;

#[cfg(feature = "async")]
pub mod async_codec;

pub use checksum::{append_checksum, checksum, split_checksum, verify, CHECKSUM_SIZE};
pub use codec::{encode_frame, open_payload, Frame, FrameConfig, DEFAULT_MAX_FRAME_SIZE};
pub use error::{FrameError, FrameErrorKind, Result};
pub use reader::FrameReader;
pub use receiver::{FrameReceiver, MIN_FRAME_LEN};
pub use slip::{END, ESC, ESC_END, ESC_ESC};
pub use writer::FrameWriter;

#[cfg(feature = "async")]
pub use async_codec::SlipCodec;
