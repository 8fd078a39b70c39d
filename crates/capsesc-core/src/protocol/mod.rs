//! Protocol module containing the raw input record and the key event decoder.

pub mod record;

pub use record::{decode_key_event, tap_halves, EventKind, KeyEvent, KeyTransition, RawRecord};
