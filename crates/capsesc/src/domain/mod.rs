//! Domain types for the capsesc daemon.
//!
//! The tap/hold rules themselves live in `capsesc-core`; this module only
//! holds the daemon's runtime configuration.

pub mod config;

pub use config::{ClockKind, DaemonConfig, VirtualDeviceIdentity};
