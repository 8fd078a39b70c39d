//! Command-line surface.
//!
//! ```text
//! capsesc [OPTIONS]
//!
//! Options:
//!   -t, --timeout <MILLISECONDS>  Tap/hold boundary [default: 200]
//!       --clock <CLOCK>           monotonic | wall [default: monotonic]
//!       --device-name <NAME>      Virtual keyboard name [default: capsesc]
//!   -h, --help                    Print help
//!   -V, --version                 Print version
//! ```
//!
//! | Variable             | Default     | Description               |
//! |----------------------|-------------|---------------------------|
//! | `CAPSESC_TIMEOUT_MS` | `200`       | Tap/hold boundary (ms)    |
//! | `CAPSESC_CLOCK`      | `monotonic` | Clock used to time holds  |
//!
//! Help and version exit 0.  Any unknown flag or bad value prints usage and
//! exits 1.

use std::ffi::OsString;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::Parser;

use crate::domain::config::{
    ClockKind, DaemonConfig, VirtualDeviceIdentity, DEFAULT_DEVICE_NAME, MAX_KEYBOARDS,
};

/// Tap Caps Lock for Escape, hold it for whatever Caps Lock means to your desktop.
///
/// Reads every keyboard under /dev/input (the devices are not grabbed) and
/// injects Escape through a uinput virtual keyboard.  Needs read access to
/// /dev/input/event* and write access to /dev/uinput.
#[derive(Debug, Parser)]
#[command(name = "capsesc", version)]
pub struct Cli {
    /// Caps Lock released strictly before this many milliseconds counts as a tap.
    #[arg(
        short = 't',
        long = "timeout",
        value_name = "MILLISECONDS",
        default_value_t = 200,
        env = "CAPSESC_TIMEOUT_MS"
    )]
    pub timeout_ms: u64,

    /// Clock used to time Caps Lock holds.
    #[arg(long, value_enum, default_value_t = ClockKind::Monotonic, env = "CAPSESC_CLOCK")]
    pub clock: ClockKind,

    /// Display name of the virtual keyboard.
    #[arg(long, value_name = "NAME", default_value = DEFAULT_DEVICE_NAME)]
    pub device_name: String,
}

impl Cli {
    /// Converts the parsed arguments into a [`DaemonConfig`].
    pub fn into_config(self) -> DaemonConfig {
        DaemonConfig {
            timeout: Duration::from_millis(self.timeout_ms),
            clock: self.clock,
            max_keyboards: MAX_KEYBOARDS,
            virtual_device: VirtualDeviceIdentity {
                name: self.device_name,
                ..VirtualDeviceIdentity::default()
            },
        }
    }
}

/// Result of parsing the command line.
#[derive(Debug)]
pub enum CliOutcome {
    /// Arguments are valid; start the daemon.
    Run(Cli),
    /// Print `message` and exit with `code` without starting.
    Exit { code: u8, message: clap::Error },
}

/// Parses `args` (including the program name) into a [`CliOutcome`].
pub fn parse_args<I, T>(args: I) -> CliOutcome
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => CliOutcome::Run(cli),
        Err(message) => {
            let code = match message.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            CliOutcome::Exit { code, message }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> Cli {
        match parse_args(args.iter().copied()) {
            CliOutcome::Run(cli) => cli,
            CliOutcome::Exit { code, message } => panic!("unexpected exit {code}: {message}"),
        }
    }

    fn exit_code(args: &[&str]) -> u8 {
        match parse_args(args.iter().copied()) {
            CliOutcome::Run(cli) => panic!("expected exit, parsed {cli:?}"),
            CliOutcome::Exit { code, .. } => code,
        }
    }

    #[test]
    fn test_defaults() {
        // Arrange / Act
        let cfg = run(&["capsesc"]).into_config();

        // Assert
        assert_eq!(cfg.timeout, Duration::from_millis(200));
        assert_eq!(cfg.clock, ClockKind::Monotonic);
        assert_eq!(cfg.virtual_device.name, "capsesc");
        assert_eq!(cfg.max_keyboards, 16);
    }

    #[test]
    fn test_short_timeout_flag() {
        let cfg = run(&["capsesc", "-t", "150"]).into_config();
        assert_eq!(cfg.timeout, Duration::from_millis(150));
    }

    #[test]
    fn test_long_options() {
        let cli = run(&["capsesc", "--timeout=300", "--clock", "wall", "--device-name", "kbd-esc"]);
        assert_eq!(cli.timeout_ms, 300);
        assert_eq!(cli.clock, ClockKind::Wall);
        assert_eq!(cli.device_name, "kbd-esc");
    }

    #[test]
    fn test_help_exits_zero() {
        assert_eq!(exit_code(&["capsesc", "-h"]), 0);
        assert_eq!(exit_code(&["capsesc", "--help"]), 0);
    }

    #[test]
    fn test_version_exits_zero() {
        assert_eq!(exit_code(&["capsesc", "-V"]), 0);
    }

    #[test]
    fn test_unknown_flag_exits_one() {
        assert_eq!(exit_code(&["capsesc", "-x"]), 1);
        assert_eq!(exit_code(&["capsesc", "--grab"]), 1);
    }

    #[test]
    fn test_bad_timeout_exits_one() {
        assert_eq!(exit_code(&["capsesc", "-t", "fast"]), 1);
        assert_eq!(exit_code(&["capsesc", "-t", "-5"]), 1);
        assert_eq!(exit_code(&["capsesc", "-t"]), 1);
    }

    #[test]
    fn test_bad_clock_exits_one() {
        assert_eq!(exit_code(&["capsesc", "--clock", "sundial"]), 1);
    }
}
