//! Recording virtual keyboard for tests.
//!
//! # Why a recording keyboard?
//!
//! The real [`UinputKeyboard`](super::uinput::UinputKeyboard) needs write
//! access to `/dev/uinput` and would type real Escapes into whatever window
//! has focus.  `RecordingKeyboard` appends every record it is asked to write,
//! plus the sync report the kernel device would add, to a shared log that the
//! test inspects afterwards.
//!
//! Clones share the same log and failure switch, so a test can hand one clone
//! to the use case as a `Box<dyn VirtualKeyboard>` and keep the other.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use capsesc_core::RawRecord;

use crate::application::remap_caps::{OutputError, VirtualKeyboard};

/// A virtual keyboard that records instead of writing to the kernel.
#[derive(Clone, Default)]
pub struct RecordingKeyboard {
    log: Arc<Mutex<Vec<RawRecord>>>,
    should_fail: Arc<AtomicBool>,
}

impl RecordingKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, sync reports included.
    pub fn records(&self) -> Vec<RawRecord> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// While `true`, every write fails with [`OutputError::Write`].
    pub fn set_failing(&self, failing: bool) {
        self.should_fail.store(failing, Ordering::SeqCst);
    }
}

impl VirtualKeyboard for RecordingKeyboard {
    fn emit_synced(&mut self, records: &[RawRecord]) -> Result<(), OutputError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(OutputError::Write(io::Error::other("injected failure")));
        }
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        log.extend_from_slice(records);
        log.push(RawRecord::sync_report());
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use capsesc_core::protocol::record::{VALUE_PRESSED, VALUE_RELEASED};
    use capsesc_core::KeyCode;

    #[test]
    fn test_key_tap_matches_kernel_wire_order() {
        // Arrange
        let mut kbd = RecordingKeyboard::new();

        // Act
        kbd.emit_key_tap(KeyCode::ESC).unwrap();

        // Assert
        assert_eq!(
            kbd.records(),
            vec![
                RawRecord::key(KeyCode::ESC, VALUE_PRESSED),
                RawRecord::sync_report(),
                RawRecord::key(KeyCode::ESC, VALUE_RELEASED),
                RawRecord::sync_report(),
            ]
        );
    }

    #[test]
    fn test_failing_keyboard_records_nothing() {
        let mut kbd = RecordingKeyboard::new();
        kbd.set_failing(true);

        assert!(matches!(
            kbd.emit_synced(&[RawRecord::key(KeyCode::ESC, VALUE_PRESSED)]),
            Err(OutputError::Write(_))
        ));
        assert!(kbd.records().is_empty());
    }

    #[test]
    fn test_clones_share_the_log() {
        let observer = RecordingKeyboard::new();
        let mut writer = observer.clone();

        writer.emit_synced(&[]).unwrap();

        assert_eq!(observer.records(), vec![RawRecord::sync_report()]);
    }
}
