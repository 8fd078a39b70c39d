//! # capsesc-core
//!
//! Shared library for capsesc containing the raw input record model, the
//! key event decoder, Linux key codes, and the Caps Lock disambiguator.
//!
//! This crate has zero dependencies on OS APIs or device nodes.  Everything
//! here can be driven by synthetic records and an injected clock, which is how
//! the tests exercise it.
//!
//! # Architecture overview
//!
//! capsesc watches every physical keyboard.  A short, uninterrupted Caps Lock
//! tap becomes an Escape tap on a virtual keyboard; anything else is left
//! alone so Caps Lock keeps whatever meaning the desktop gives it.
//!
//! - **`protocol`** – The fixed-shape record read from and written to the
//!   kernel input subsystem, plus the decoder that turns it into a key event.
//!
//! - **`domain`** – The tap/hold state machine and the clock it measures with.
//!
//! - **`keymap`** – The handful of Linux key codes the daemon cares about.

pub mod domain;
pub mod keymap;
pub mod protocol;

pub use domain::clock::{Clock, ClockError, ManualClock, MonotonicClock, WallClock};
pub use domain::disambiguator::{CapsLockState, Disambiguator, Phase, TapDecision};
pub use keymap::KeyCode;
pub use protocol::record::{
    decode_key_event, tap_halves, EventKind, KeyEvent, KeyTransition, RawRecord,
};
