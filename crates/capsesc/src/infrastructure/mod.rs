//! Infrastructure layer for the daemon.
//!
//! Contains the OS-facing adapters.  This layer may depend on `application`
//! and `capsesc_core`, but is never imported by them.
//!
//! # Sub-modules
//!
//! - **`discovery`** – Walks `/dev/input/event*` in numeric order and keeps
//!   the nodes that look like keyboards.  The selection rules are pure and
//!   run against a node-opening trait, so tests need no devices.
//!
//! - **`input_source`** – The `EventSource` trait (one readable keyboard)
//!   plus an evdev implementation and a channel-backed mock.
//!
//! - **`multiplexer`** – Merges all sources into a single ordered stream, one
//!   reader task per source, and retires sources that disconnect.
//!
//! - **`virtual_keyboard`** – The uinput `VirtualKeyboard` that types Escape,
//!   and a recording mock for tests.

pub mod discovery;
pub mod input_source;
pub mod multiplexer;
pub mod virtual_keyboard;
