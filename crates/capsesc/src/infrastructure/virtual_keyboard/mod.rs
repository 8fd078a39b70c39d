//! Virtual keyboard implementations.
//!
//! The uinput implementation is Linux-only and selected at compile time via
//! `#[cfg(target_os = "linux")]`.  The recording mock builds everywhere.

pub mod mock;

#[cfg(target_os = "linux")]
pub mod uinput;
