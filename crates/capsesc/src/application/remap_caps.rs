//! RemapCapsUseCase: turns a recognised Caps Lock tap into an Escape tap.
//!
//! The use case owns the process-wide [`Disambiguator`] and the virtual
//! keyboard.  It sees records from all keyboards in arrival order, so a key on
//! one keyboard disqualifies a Caps Lock hold on another.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use capsesc_core::protocol::record::tap_halves;
use capsesc_core::{Clock, ClockError, Disambiguator, KeyCode, Phase, RawRecord, TapDecision};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::config::DaemonConfig;

/// Error type for virtual keyboard operations.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("cannot open /dev/uinput: {0}")]
    Open(#[source] io::Error),
    #[error("cannot declare capability {key}: {source}")]
    Capability {
        key: KeyCode,
        #[source]
        source: io::Error,
    },
    #[error("cannot create virtual keyboard: {0}")]
    Activate(#[source] io::Error),
    #[error("virtual keyboard write failed: {0}")]
    Write(#[source] io::Error),
}

/// Output seam: a keyboard the daemon can type on.
pub trait VirtualKeyboard: Send {
    /// Writes `records` followed by a synchronization report, as one batch.
    fn emit_synced(&mut self, records: &[RawRecord]) -> Result<(), OutputError>;

    /// Types a full tap of `key`: press, sync, release, sync.
    ///
    /// Stops at the first failing write.
    fn emit_key_tap(&mut self, key: KeyCode) -> Result<(), OutputError> {
        for half in tap_halves(key) {
            self.emit_synced(&[half])?;
        }
        Ok(())
    }
}

/// Error type for [`RemapCapsUseCase::handle_record`].
///
/// Neither variant is fatal: the state machine is already back in a
/// consistent state when one is returned.
#[derive(Debug, Error)]
pub enum RemapError {
    #[error("clock read failed: {0}")]
    Clock(#[from] ClockError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Running counts of what the daemon decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TapStats {
    /// Escape taps written successfully.
    pub taps: u64,
    /// Caps Lock releases that came too late.
    pub holds: u64,
    /// Caps Lock holds interrupted by another key.
    pub disqualified: u64,
    /// Clock or output errors.
    pub failures: u64,
}

/// The Caps Lock remap use case.
pub struct RemapCapsUseCase {
    disambiguator: Disambiguator,
    clock: Arc<dyn Clock>,
    keyboard: Box<dyn VirtualKeyboard>,
    stats: TapStats,
}

impl RemapCapsUseCase {
    pub fn new(
        timeout: Duration,
        clock: Arc<dyn Clock>,
        keyboard: Box<dyn VirtualKeyboard>,
    ) -> Self {
        Self {
            disambiguator: Disambiguator::new(timeout),
            clock,
            keyboard,
            stats: TapStats::default(),
        }
    }

    /// Handles one record from any keyboard.
    ///
    /// # Errors
    ///
    /// Returns [`RemapError::Clock`] when the clock could not be read and
    /// [`RemapError::Output`] when the Escape tap could not be written.  The
    /// caller should log and keep going.
    pub fn handle_record(&mut self, record: &RawRecord) -> Result<TapDecision, RemapError> {
        let decision = match self.disambiguator.on_record(record, self.clock.as_ref()) {
            Ok(decision) => decision,
            Err(e) => {
                self.stats.failures += 1;
                return Err(e.into());
            }
        };

        match decision {
            TapDecision::Tap { elapsed } => {
                if let Err(e) = self.keyboard.emit_key_tap(DaemonConfig::TAP_KEY) {
                    self.stats.failures += 1;
                    return Err(e.into());
                }
                self.stats.taps += 1;
                info!(?elapsed, "Caps Lock tap, sent Escape");
            }
            TapDecision::Hold { elapsed } => {
                self.stats.holds += 1;
                debug!(?elapsed, "Caps Lock held past timeout");
            }
            TapDecision::Disqualified { .. } => self.stats.disqualified += 1,
            TapDecision::Spurious => debug!("Caps Lock release with nothing pending"),
            TapDecision::Armed | TapDecision::Ignored => {}
        }
        Ok(decision)
    }

    pub fn stats(&self) -> TapStats {
        self.stats
    }

    pub fn phase(&self) -> Phase {
        self.disambiguator.phase()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
