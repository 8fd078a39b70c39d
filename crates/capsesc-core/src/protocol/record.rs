//! The raw input record and the decoder that turns it into a key event.
//!
//! Every evdev node speaks the same fixed-shape record (`struct input_event`):
//! ```text
//! [timestamp:timeval][type:u16][code:u16][value:i32]
//! ```
//! The daemon only looks at `type`, `code` and `value`; the timestamp is kept
//! for diagnostics.  The same shape is written back to the virtual keyboard,
//! where every batch of changes is closed by an `EV_SYN / SYN_REPORT / 0`
//! barrier so readers never observe a half-applied state.

use std::time::Duration;

use crate::keymap::KeyCode;

/// Event category (`EV_*`) of a raw record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKind(pub u16);

impl EventKind {
    pub const SYN: EventKind = EventKind(0x00);
    pub const KEY: EventKind = EventKind(0x01);
    pub const REL: EventKind = EventKind(0x02);
    pub const ABS: EventKind = EventKind(0x03);
    pub const MSC: EventKind = EventKind(0x04);
    pub const LED: EventKind = EventKind(0x11);
}

/// `SYN_REPORT`, the code of a synchronization barrier record.
pub const SYN_REPORT: u16 = 0;

/// Key transition values carried in `value` for `EV_KEY` records.
pub const VALUE_RELEASED: i32 = 0;
pub const VALUE_PRESSED: i32 = 1;
pub const VALUE_REPEAT: i32 = 2;

/// One raw input record as read from, or written to, an evdev node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord {
    pub kind: EventKind,
    pub code: u16,
    pub value: i32,
    /// Kernel timestamp relative to the Unix epoch; zero for synthesized records.
    pub timestamp: Duration,
}

impl RawRecord {
    /// Creates a record with a zero timestamp.
    pub const fn new(kind: EventKind, code: u16, value: i32) -> Self {
        Self {
            kind,
            code,
            value,
            timestamp: Duration::ZERO,
        }
    }

    /// An `EV_KEY` record for `key` with the given transition value.
    pub const fn key(key: KeyCode, value: i32) -> Self {
        Self::new(EventKind::KEY, key.code(), value)
    }

    /// The `EV_SYN / SYN_REPORT / 0` barrier that closes a batch.
    pub const fn sync_report() -> Self {
        Self::new(EventKind::SYN, SYN_REPORT, 0)
    }

    /// Returns a copy carrying the given kernel timestamp.
    pub fn at(mut self, timestamp: Duration) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Returns `true` for a synchronization barrier record.
    pub fn is_sync_report(&self) -> bool {
        self.kind == EventKind::SYN && self.code == SYN_REPORT && self.value == 0
    }
}

/// The transition encoded in an `EV_KEY` record's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTransition {
    Released,
    Pressed,
    /// Autorepeat: the key is still held.
    Repeat,
    /// Any value the kernel does not define for keys.
    Unknown(i32),
}

impl From<i32> for KeyTransition {
    fn from(value: i32) -> Self {
        match value {
            VALUE_RELEASED => KeyTransition::Released,
            VALUE_PRESSED => KeyTransition::Pressed,
            VALUE_REPEAT => KeyTransition::Repeat,
            other => KeyTransition::Unknown(other),
        }
    }
}

/// A decoded key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub transition: KeyTransition,
    pub timestamp: Duration,
}

/// Decodes a raw record into a [`KeyEvent`].
///
/// Returns `None` for every category other than `EV_KEY`: sync barriers,
/// pointer motion, LEDs and scan-code (`EV_MSC`) records never reach the state
/// machine.
pub fn decode_key_event(record: &RawRecord) -> Option<KeyEvent> {
    if record.kind != EventKind::KEY {
        return None;
    }
    Some(KeyEvent {
        key: KeyCode(record.code),
        transition: KeyTransition::from(record.value),
        timestamp: record.timestamp,
    })
}

/// Builds the two halves of a synthetic tap of `key`: press, then release.
///
/// Each half must be written as its own synchronized batch.
pub const fn tap_halves(key: KeyCode) -> [RawRecord; 2] {
    [
        RawRecord::key(key, VALUE_PRESSED),
        RawRecord::key(key, VALUE_RELEASED),
    ]
}

// ── Tests ─────────────────────────────────────────────────────────────────────
