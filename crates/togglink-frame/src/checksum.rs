//! CRC-16/XMODEM checksums, appended big-endian.
//!
//! poly 0x1021, init 0x0000, no reflection, no final XOR.

use crc::{Crc, CRC_16_XMODEM};

use crate::error::{FrameError, Result};

/// Size of the trailing checksum field.
pub const CHECKSUM_SIZE: usize = 2;

const XMODEM: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// CRC-16/XMODEM of `data`.
pub fn checksum(data: &[u8]) -> u16 {
    XMODEM.checksum(data)
}

/// `data` followed by its checksum, high byte first.
pub fn append_checksum(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + CHECKSUM_SIZE);
    out.extend_from_slice(data);
    out.extend_from_slice(&checksum(data).to_be_bytes());
    out
}

/// True when `payload` ends with the correct checksum of everything before it.
pub fn verify(payload: &[u8]) -> bool {
    split_checksum(payload).is_ok()
}

/// Verify the trailing checksum and return the content in front of it.
pub fn split_checksum(payload: &[u8]) -> Result<&[u8]> {
    if payload.len() < CHECKSUM_SIZE {
        return Err(FrameError::ShortFrame {
            len: payload.len(),
            min: CHECKSUM_SIZE,
        });
    }

    let (content, tail) = payload.split_at(payload.len() - CHECKSUM_SIZE);
    let received = u16::from_be_bytes([tail[0], tail[1]]);
    let computed = checksum(content);
    if computed != received {
        return Err(FrameError::ChecksumMismatch { computed, received });
    }
    Ok(content)
}
