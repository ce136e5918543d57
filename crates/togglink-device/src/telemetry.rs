//! Telemetry frames sent by the controller.
//!
//! ```text
//! ┌──────────────────────────────┬──────────────────┐
//! │ Event slots (32 × 1B)        │ Output state (4B)│
//! │ one Event Byte per slot      │ optional         │
//! └──────────────────────────────┴──────────────────┘
//! ```

use std::fmt;

use crate::error::{DeviceError, Result};

/// Number of event slots at the start of every telemetry frame.
pub const EVENT_SLOTS: usize = 32;

/// Size of the output state trailer.
pub const OUTPUT_STATE_SIZE: usize = 4;

const VALID: u8 = 0x40;
const RELEASE: u8 = 0x80;
const BUTTON_MASK: u8 = 0x1F;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Press,
    Release,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Press => "press",
            EventKind::Release => "release",
        }
    }
}

/// A button transition reported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonEvent {
    pub button: u8,
    pub kind: EventKind,
}

impl ButtonEvent {
    pub fn press(button: u8) -> Self {
        Self {
            button: button & BUTTON_MASK,
            kind: EventKind::Press,
        }
    }

    pub fn release(button: u8) -> Self {
        Self {
            button: button & BUTTON_MASK,
            kind: EventKind::Release,
        }
    }

    /// Decode an Event Byte. Padding bytes (bit 6 clear) yield `None`.
    pub fn from_byte(byte: u8) -> Option<Self> {
        if byte & VALID == 0 {
            return None;
        }
        let kind = if byte & RELEASE == 0 {
            EventKind::Press
        } else {
            EventKind::Release
        };
        Some(Self {
            button: byte & BUTTON_MASK,
            kind,
        })
    }

    pub fn to_byte(self) -> u8 {
        let kind = match self.kind {
            EventKind::Press => 0,
            EventKind::Release => RELEASE,
        };
        VALID | kind | (self.button & BUTTON_MASK)
    }
}

impl fmt::Display for ButtonEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EventKind::Press => write!(f, "Press start {}", self.button),
            EventKind::Release => write!(f, "Press end {}", self.button),
        }
    }
}

/// Snapshot of the controller's outputs, kept as the four raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OutputState([u8; OUTPUT_STATE_SIZE]);

impl OutputState {
    pub fn new(bytes: [u8; OUTPUT_STATE_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; OUTPUT_STATE_SIZE] {
        self.0
    }

    /// Outputs as a bit set, first byte most significant.
    pub fn bits(&self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    /// Whether output `index` is on. Indices past 31 are never on.
    pub fn is_on(&self, index: u8) -> bool {
        index < 32 && self.bits() & (1 << index) != 0
    }
}

impl fmt::Display for OutputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

/// A decoded telemetry frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryRecord {
    slots: [u8; EVENT_SLOTS],
    output_state: Option<OutputState>,
}

impl TelemetryRecord {
    pub fn new(slots: [u8; EVENT_SLOTS], output_state: Option<OutputState>) -> Self {
        Self {
            slots,
            output_state,
        }
    }

    /// Build a record from events, padding the remaining slots.
    ///
    /// Events past the 32nd are dropped.
    pub fn from_events(events: &[ButtonEvent], output_state: Option<OutputState>) -> Self {
        let mut slots = [0u8; EVENT_SLOTS];
        for (slot, event) in slots.iter_mut().zip(events) {
            *slot = event.to_byte();
        }
        Self::new(slots, output_state)
    }

    /// The button events in this frame, in slot order.
    pub fn events(&self) -> Events<'_> {
        Events {
            slots: self.slots.iter(),
        }
    }

    pub fn output_state(&self) -> Option<OutputState> {
        self.output_state
    }

    /// Content bytes for this record, checksum not included.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(EVENT_SLOTS + OUTPUT_STATE_SIZE);
        out.extend_from_slice(&self.slots);
        if let Some(state) = self.output_state {
            out.extend_from_slice(&state.bytes());
        }
        out
    }
}

/// Iterator over the valid events of a [`TelemetryRecord`].
#[derive(Debug, Clone)]
pub struct Events<'a> {
    slots: std::slice::Iter<'a, u8>,
}

impl Iterator for Events<'_> {
    type Item = ButtonEvent;

    fn next(&mut self) -> Option<ButtonEvent> {
        self.slots.by_ref().find_map(|&byte| ButtonEvent::from_byte(byte))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.slots.len()))
    }
}

/// Decode verified frame content (checksum already stripped).
///
/// Needs at least 32 bytes. The output state is present only when four
/// more bytes follow the event slots; anything past that is ignored.
pub fn decode_telemetry(content: &[u8]) -> Result<TelemetryRecord> {
    if content.len() < EVENT_SLOTS {
        return Err(DeviceError::ShortTelemetry {
            len: content.len(),
            min: EVENT_SLOTS,
        });
    }

    let mut slots = [0u8; EVENT_SLOTS];
    slots.copy_from_slice(&content[..EVENT_SLOTS]);

    let output_state = content
        .get(EVENT_SLOTS..EVENT_SLOTS + OUTPUT_STATE_SIZE)
        .map(|bytes| OutputState::new([bytes[0], bytes[1], bytes[2], bytes[3]]));

    Ok(TelemetryRecord::new(slots, output_state))
}
