//! Daemon configuration types.
//!
//! [`DaemonConfig`] is the single source of truth for all runtime settings.
//! It is built once at startup from CLI arguments (see [`crate::cli`]) or from
//! defaults, then handed to the components that need it.  There is no
//! configuration file and nothing is persisted.

use std::sync::Arc;
use std::time::Duration;

use capsesc_core::domain::disambiguator::DEFAULT_TIMEOUT;
use capsesc_core::{Clock, KeyCode, MonotonicClock, WallClock};

/// Maximum number of keyboards tracked at once.
pub const MAX_KEYBOARDS: usize = 16;

/// Display name of the virtual keyboard.
pub const DEFAULT_DEVICE_NAME: &str = "capsesc";

/// `BUS_USB` from `linux/input.h`.
pub const BUS_USB: u16 = 0x03;

/// Which clock measures Caps Lock hold time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ClockKind {
    /// Immune to system time adjustments.
    #[default]
    Monotonic,
    /// Wall-clock time; a time jump during a press can misclassify it.
    Wall,
}

impl ClockKind {
    /// Builds the clock this kind names.
    pub fn build(self) -> Arc<dyn Clock> {
        match self {
            ClockKind::Monotonic => Arc::new(MonotonicClock::new()),
            ClockKind::Wall => Arc::new(WallClock),
        }
    }
}

/// Identity the virtual keyboard registers with the kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualDeviceIdentity {
    pub name: String,
    pub bus_type: u16,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
}

impl Default for VirtualDeviceIdentity {
    fn default() -> Self {
        Self {
            name: DEFAULT_DEVICE_NAME.to_string(),
            bus_type: BUS_USB,
            vendor: 0x0001,
            product: 0x0001,
            version: 1,
        }
    }
}

/// All runtime configuration for the daemon.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// A Caps Lock press released strictly before this is a tap.
    pub timeout: Duration,
    pub clock: ClockKind,
    /// Keyboards beyond this count are ignored with a warning.
    pub max_keyboards: usize,
    pub virtual_device: VirtualDeviceIdentity,
}

impl DaemonConfig {
    /// Keys the virtual keyboard declares.  Fixed for the device's lifetime.
    pub const CAPABILITY_KEYS: [KeyCode; 2] = [KeyCode::CAPSLOCK, KeyCode::ESC];

    /// Key injected for a recognised tap.
    pub const TAP_KEY: KeyCode = KeyCode::ESC;
}

impl Default for DaemonConfig {
    /// | Field           | Default        |
    /// |-----------------|----------------|
    /// | timeout         | 200 ms         |
    /// | clock           | monotonic      |
    /// | max_keyboards   | 16             |
    /// | virtual_device  | "capsesc", USB |
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            clock: ClockKind::default(),
            max_keyboards: MAX_KEYBOARDS,
            virtual_device: VirtualDeviceIdentity::default(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeout_is_200ms() {
        let cfg = DaemonConfig::default();
        assert_eq!(cfg.timeout, Duration::from_millis(200));
    }

    #[test]
    fn test_default_keyboard_limit_is_16() {
        assert_eq!(DaemonConfig::default().max_keyboards, 16);
    }

    #[test]
    fn test_default_clock_is_monotonic() {
        assert_eq!(DaemonConfig::default().clock, ClockKind::Monotonic);
    }

    #[test]
    fn test_default_identity() {
        // Arrange / Act
        let id = VirtualDeviceIdentity::default();

        // Assert
        assert_eq!(id.name, "capsesc");
        assert_eq!(id.bus_type, 0x03);
        assert_eq!((id.vendor, id.product), (0x0001, 0x0001));
    }

    #[test]
    fn test_capabilities_cover_tap_key() {
        assert!(DaemonConfig::CAPABILITY_KEYS.contains(&DaemonConfig::TAP_KEY));
        assert!(DaemonConfig::CAPABILITY_KEYS.contains(&KeyCode::CAPSLOCK));
    }

    #[test]
    fn test_clock_kinds_build_working_clocks() {
        for kind in [ClockKind::Monotonic, ClockKind::Wall] {
            assert!(kind.build().now().is_ok(), "{kind:?} clock should read");
        }
    }
}
