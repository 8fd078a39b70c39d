//! Application layer use cases for the daemon.
//!
//! - **`remap_caps`** – Feeds every input record through the Caps Lock
//!   disambiguator and writes an Escape tap to the virtual keyboard when the
//!   disambiguator reports one.  The virtual keyboard is injected as a
//!   `VirtualKeyboard` trait object so tests never touch `/dev/uinput`.

pub mod remap_caps;
