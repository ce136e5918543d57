//! Escape-based byte-stream delimiting (SLIP style, RFC 1055 escaping).
//!
//! ```text
//! ┌──────┬──────────────────────────────┬──────┐
//! │ END  │ escaped payload              │ END  │
//! │ 0xC0 │ 0xC0 → DB DC, 0xDB → DB DD   │ 0xC0 │
//! └──────┴──────────────────────────────┴──────┘
//! ```

use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};

/// Frame delimiter.
pub const END: u8 = 0xC0;

/// Escape introducer.
pub const ESC: u8 = 0xDB;

/// Escaped END (follows ESC).
pub const ESC_END: u8 = 0xDC;

/// Escaped ESC (follows ESC).
pub const ESC_ESC: u8 = 0xDD;

/// Number of bytes `payload` occupies on the wire, delimiters included.
pub fn encoded_len(payload: &[u8]) -> usize {
    2 + payload.len()
        + payload
            .iter()
            .filter(|&&b| b == END || b == ESC)
            .count()
}

/// Escape `payload` and append it to `dst` between two END bytes.
pub fn encode(payload: &[u8], dst: &mut BytesMut) {
    dst.reserve(encoded_len(payload));
    dst.put_u8(END);
    for &byte in payload {
        match byte {
            END => dst.put_slice(&[ESC, ESC_END]),
            ESC => dst.put_slice(&[ESC, ESC_ESC]),
            other => dst.put_u8(other),
        }
    }
    dst.put_u8(END);
}

/// Escape `payload` into a freshly allocated frame.
pub fn encode_to_vec(payload: &[u8]) -> Vec<u8> {
    let mut dst = BytesMut::new();
    encode(payload, &mut dst);
    dst.to_vec()
}

/// Reverse the escaping of a frame body (the bytes between the two ENDs).
pub fn decode(escaped: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(escaped.len());
    let mut bytes = escaped.iter().copied();
    while let Some(byte) = bytes.next() {
        match byte {
            ESC => match bytes.next() {
                Some(ESC_END) => out.push(END),
                Some(ESC_ESC) => out.push(ESC),
                Some(other) => return Err(FrameError::InvalidEscape(other)),
                None => return Err(FrameError::TruncatedEscape),
            },
            END => return Err(FrameError::UnescapedEnd),
            other => out.push(other),
        }
    }
    Ok(out)
}
