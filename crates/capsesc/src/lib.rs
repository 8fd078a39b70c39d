//! capsesc library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does capsesc do?
//!
//! 1. Finds every keyboard under `/dev/input` and opens it read-only.  The
//!    devices are **not** grabbed: the desktop keeps seeing every key,
//!    including Caps Lock, exactly as before.
//! 2. Creates a virtual uinput keyboard that can only press Caps Lock and
//!    Escape.
//! 3. Merges all keyboards into one ordered event stream and runs each record
//!    through the Caps Lock disambiguator from `capsesc-core`.
//! 4. When Caps Lock was tapped quickly with no other key in between, writes an
//!    Escape tap to the virtual keyboard.

/// Application layer: the remap use case and its output seam.
pub mod application;

/// Command-line surface.
pub mod cli;

/// Event loop tying the multiplexer, the use case, and shutdown together.
pub mod daemon;

/// Runtime configuration.
pub mod domain;

/// Infrastructure layer: device discovery, input sources, multiplexer, uinput.
pub mod infrastructure;
