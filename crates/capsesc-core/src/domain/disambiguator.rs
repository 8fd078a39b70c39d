//! The Caps Lock tap/hold state machine.
//!
//! # How a tap is recognised
//!
//! ```text
//!            Caps pressed (clock read)
//!     ┌────┐ ───────────────────────────▶ ┌──────┐
//!     │ Up │                              │ Down │
//!     └────┘ ◀─────────────────────────── └──────┘
//!             Caps released: elapsed < timeout ⇒ Tap
//!                            elapsed ≥ timeout ⇒ Hold
//!             other key pressed/repeating ⇒ Disqualified
//! ```
//!
//! Disqualification is implemented by dropping straight back to `Up`, so the
//! eventual Caps Lock release finds nothing pending and is treated as
//! spurious.  That is what makes "Caps held as Ctrl, then `J`" never produce an
//! Escape no matter how quickly it all happened.
//!
//! The machine never performs output.  It returns a [`TapDecision`] and the
//! caller decides what to inject.

use std::time::Duration;

use tracing::debug;

use crate::domain::clock::{Clock, ClockError};
use crate::keymap::KeyCode;
use crate::protocol::record::{decode_key_event, KeyEvent, KeyTransition, RawRecord};

/// Default tap/hold boundary.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(200);

/// Tracked state of the Caps Lock key.
///
/// The press time exists exactly while the key is down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapsLockState {
    #[default]
    Up,
    Down {
        /// Clock reading taken when the press was observed.
        pressed_at: Duration,
    },
}

impl CapsLockState {
    pub fn phase(&self) -> Phase {
        match self {
            CapsLockState::Up => Phase::Up,
            CapsLockState::Down { .. } => Phase::Down,
        }
    }
}

/// Coarse phase of [`CapsLockState`], without the timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Up,
    Down,
}

/// What the state machine concluded from one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapDecision {
    /// The event has no bearing on Caps Lock.
    Ignored,
    /// Caps Lock went down; a tap is now pending.
    Armed,
    /// Another key went down while Caps Lock was held.
    Disqualified { by: KeyCode },
    /// Caps Lock was released in time: emit an Escape tap.
    Tap { elapsed: Duration },
    /// Caps Lock was released too late to count as a tap.
    Hold { elapsed: Duration },
    /// Caps Lock was released with nothing pending.
    Spurious,
}

impl TapDecision {
    /// Returns `true` when the caller should inject a tap.
    pub fn emits_tap(&self) -> bool {
        matches!(self, TapDecision::Tap { .. })
    }
}

/// Caps Lock disambiguator.
///
/// Owns the single [`CapsLockState`] of the process.  Feed it every record in
/// global arrival order through [`Disambiguator::on_record`].
#[derive(Debug, Clone)]
pub struct Disambiguator {
    state: CapsLockState,
    timeout: Duration,
}

impl Disambiguator {
    /// Creates a disambiguator in the `Up` state.
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: CapsLockState::Up,
            timeout,
        }
    }

    pub fn state(&self) -> CapsLockState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Decodes `record` and applies it.  Non-key records are [`TapDecision::Ignored`].
    ///
    /// # Errors
    ///
    /// See [`Disambiguator::on_key`].
    pub fn on_record(
        &mut self,
        record: &RawRecord,
        clock: &dyn Clock,
    ) -> Result<TapDecision, ClockError> {
        match decode_key_event(record) {
            Some(event) => self.on_key(&event, clock),
            None => Ok(TapDecision::Ignored),
        }
    }

    /// Applies one key event.
    ///
    /// The clock is only read for Caps Lock presses, and for releases while a
    /// press is pending.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError`] when the clock cannot be read (or went
    /// backwards).  The state has already moved to `Up` by then: a press that
    /// cannot be timed is never eligible, and a release always ends the hold.
    pub fn on_key(&mut self, event: &KeyEvent, clock: &dyn Clock) -> Result<TapDecision, ClockError> {
        if event.key == KeyCode::CAPSLOCK {
            return match event.transition {
                KeyTransition::Pressed => self.on_caps_pressed(clock),
                KeyTransition::Released => self.on_caps_released(clock),
                KeyTransition::Repeat | KeyTransition::Unknown(_) => Ok(TapDecision::Ignored),
            };
        }

        match (self.state, event.transition) {
            (CapsLockState::Down { .. }, KeyTransition::Pressed | KeyTransition::Repeat) => {
                debug!(key = %event.key, "Caps Lock hold interleaved, tap disqualified");
                self.state = CapsLockState::Up;
                Ok(TapDecision::Disqualified { by: event.key })
            }
            _ => Ok(TapDecision::Ignored),
        }
    }

    fn on_caps_pressed(&mut self, clock: &dyn Clock) -> Result<TapDecision, ClockError> {
        match clock.now() {
            Ok(pressed_at) => {
                self.state = CapsLockState::Down { pressed_at };
                Ok(TapDecision::Armed)
            }
            Err(e) => {
                self.state = CapsLockState::Up;
                Err(e)
            }
        }
    }

    fn on_caps_released(&mut self, clock: &dyn Clock) -> Result<TapDecision, ClockError> {
        let CapsLockState::Down { pressed_at } = self.state else {
            return Ok(TapDecision::Spurious);
        };
        self.state = CapsLockState::Up;

        let now = clock.now()?;
        let elapsed = now
            .checked_sub(pressed_at)
            .ok_or_else(|| ClockError::WentBackwards(pressed_at - now))?;

        if elapsed < self.timeout {
            Ok(TapDecision::Tap { elapsed })
        } else {
            Ok(TapDecision::Hold { elapsed })
        }
    }
}

impl Default for Disambiguator {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::{ManualClock, MockClock};

    const TIMEOUT: Duration = Duration::from_millis(200);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn press(key: KeyCode) -> RawRecord {
        RawRecord::key(key, 1)
    }

    fn release(key: KeyCode) -> RawRecord {
        RawRecord::key(key, 0)
    }

    fn repeat(key: KeyCode) -> RawRecord {
        RawRecord::key(key, 2)
    }

    // ── Transition table ──────────────────────────────────────────────────────

    #[test]
    fn test_initial_state_is_up() {
        let d = Disambiguator::new(TIMEOUT);
        assert_eq!(d.state(), CapsLockState::Up);
        assert_eq!(d.phase(), Phase::Up);
    }

    #[test]
    fn test_caps_press_records_timestamp() {
        // Arrange
        let clock = ManualClock::new(ms(1_000));
        let mut d = Disambiguator::new(TIMEOUT);

        // Act
        let decision = d.on_record(&press(KeyCode::CAPSLOCK), &clock).unwrap();

        // Assert
        assert_eq!(decision, TapDecision::Armed);
        assert_eq!(d.state(), CapsLockState::Down { pressed_at: ms(1_000) });
    }

    #[test]
    fn test_quick_release_is_a_tap() {
        // Arrange
        let clock = ManualClock::new(ms(0));
        let mut d = Disambiguator::new(TIMEOUT);
        d.on_record(&press(KeyCode::CAPSLOCK), &clock).unwrap();

        // Act
        clock.set(ms(150));
        let decision = d.on_record(&release(KeyCode::CAPSLOCK), &clock).unwrap();

        // Assert
        assert_eq!(decision, TapDecision::Tap { elapsed: ms(150) });
        assert!(decision.emits_tap());
        assert_eq!(d.phase(), Phase::Up);
    }

    #[test]
    fn test_slow_release_is_a_hold() {
        let clock = ManualClock::new(ms(0));
        let mut d = Disambiguator::new(TIMEOUT);
        d.on_record(&press(KeyCode::CAPSLOCK), &clock).unwrap();

        clock.set(ms(450));
        let decision = d.on_record(&release(KeyCode::CAPSLOCK), &clock).unwrap();

        assert_eq!(decision, TapDecision::Hold { elapsed: ms(450) });
        assert!(!decision.emits_tap());
        assert_eq!(d.phase(), Phase::Up);
    }

    #[test]
    fn test_release_exactly_at_timeout_is_a_hold() {
        // The comparison is strict: elapsed == timeout does not emit.
        let clock = ManualClock::new(ms(10));
        let mut d = Disambiguator::new(TIMEOUT);
        d.on_record(&press(KeyCode::CAPSLOCK), &clock).unwrap();

        clock.set(ms(210));
        let decision = d.on_record(&release(KeyCode::CAPSLOCK), &clock).unwrap();

        assert_eq!(decision, TapDecision::Hold { elapsed: TIMEOUT });
    }

    #[test]
    fn test_other_key_press_while_down_disqualifies() {
        // Arrange
        let clock = ManualClock::new(ms(0));
        let mut d = Disambiguator::new(TIMEOUT);
        d.on_record(&press(KeyCode::CAPSLOCK), &clock).unwrap();

        // Act
        clock.set(ms(50));
        let decision = d.on_record(&press(KeyCode::A), &clock).unwrap();

        // Assert
        assert_eq!(decision, TapDecision::Disqualified { by: KeyCode::A });
        assert_eq!(d.phase(), Phase::Up);

        clock.set(ms(100));
        let decision = d.on_record(&release(KeyCode::CAPSLOCK), &clock).unwrap();
        assert_eq!(decision, TapDecision::Spurious);
    }

    #[test]
    fn test_other_key_repeat_while_down_disqualifies() {
        // A key already held when Caps goes down keeps autorepeating; that
        // counts as the other key being down.
        let clock = ManualClock::new(ms(0));
        let mut d = Disambiguator::new(TIMEOUT);
        d.on_record(&press(KeyCode::CAPSLOCK), &clock).unwrap();

        let decision = d.on_record(&repeat(KeyCode::J), &clock).unwrap();

        assert_eq!(decision, TapDecision::Disqualified { by: KeyCode::J });
    }

    #[test]
    fn test_other_key_release_while_down_is_ignored() {
        // Releasing a key that was pressed before Caps does not disqualify.
        let clock = ManualClock::new(ms(0));
        let mut d = Disambiguator::new(TIMEOUT);
        d.on_record(&press(KeyCode::CAPSLOCK), &clock).unwrap();

        let decision = d.on_record(&release(KeyCode::A), &clock).unwrap();
        assert_eq!(decision, TapDecision::Ignored);
        assert_eq!(d.phase(), Phase::Down);

        clock.set(ms(80));
        let decision = d.on_record(&release(KeyCode::CAPSLOCK), &clock).unwrap();
        assert_eq!(decision, TapDecision::Tap { elapsed: ms(80) });
    }

    #[test]
    fn test_spurious_release_while_up_is_ignored() {
        let clock = ManualClock::default();
        let mut d = Disambiguator::new(TIMEOUT);

        let decision = d.on_record(&release(KeyCode::CAPSLOCK), &clock).unwrap();

        assert_eq!(decision, TapDecision::Spurious);
        assert_eq!(d.phase(), Phase::Up);
    }

    #[test]
    fn test_caps_repeat_keeps_original_press_time() {
        // Arrange
        let clock = ManualClock::new(ms(0));
        let mut d = Disambiguator::new(TIMEOUT);
        d.on_record(&press(KeyCode::CAPSLOCK), &clock).unwrap();

        // Act
        clock.set(ms(120));
        let decision = d.on_record(&repeat(KeyCode::CAPSLOCK), &clock).unwrap();

        // Assert
        assert_eq!(decision, TapDecision::Ignored);
        assert_eq!(d.state(), CapsLockState::Down { pressed_at: ms(0) });
    }

    #[test]
    fn test_second_caps_press_rearms_timer() {
        // Two keyboards: Caps held on one, then pressed on the other.
        let clock = ManualClock::new(ms(0));
        let mut d = Disambiguator::new(TIMEOUT);
        d.on_record(&press(KeyCode::CAPSLOCK), &clock).unwrap();

        clock.set(ms(500));
        assert_eq!(d.on_record(&press(KeyCode::CAPSLOCK), &clock).unwrap(), TapDecision::Armed);

        clock.set(ms(600));
        let decision = d.on_record(&release(KeyCode::CAPSLOCK), &clock).unwrap();
        assert_eq!(decision, TapDecision::Tap { elapsed: ms(100) });
    }

    #[test]
    fn test_unknown_transition_value_is_ignored() {
        let clock = ManualClock::default();
        let mut d = Disambiguator::new(TIMEOUT);
        d.on_record(&press(KeyCode::CAPSLOCK), &clock).unwrap();

        let caps_odd = d.on_record(&RawRecord::key(KeyCode::CAPSLOCK, 5), &clock).unwrap();
        let other_odd = d.on_record(&RawRecord::key(KeyCode::A, -3), &clock).unwrap();

        assert_eq!(caps_odd, TapDecision::Ignored);
        assert_eq!(other_odd, TapDecision::Ignored);
        assert_eq!(d.phase(), Phase::Down);
    }

    #[test]
    fn test_non_key_records_do_not_touch_state() {
        let clock = ManualClock::default();
        let mut d = Disambiguator::new(TIMEOUT);
        d.on_record(&press(KeyCode::CAPSLOCK), &clock).unwrap();

        let decision = d.on_record(&RawRecord::sync_report(), &clock).unwrap();

        assert_eq!(decision, TapDecision::Ignored);
        assert_eq!(d.phase(), Phase::Down);
    }

    // ── Clock handling ────────────────────────────────────────────────────────

    #[test]
    fn test_clock_not_read_for_other_keys() {
        // Arrange – any call to now() would fail the expectation.
        let mut clock = MockClock::new();
        clock.expect_now().times(0);
        let mut d = Disambiguator::new(TIMEOUT);

        // Act
        for record in [press(KeyCode::A), release(KeyCode::A), repeat(KeyCode::S)] {
            assert_eq!(d.on_record(&record, &clock).unwrap(), TapDecision::Ignored);
        }

        // Assert
        assert_eq!(d.phase(), Phase::Up);
    }

    #[test]
    fn test_clock_not_read_for_spurious_release() {
        let mut clock = MockClock::new();
        clock.expect_now().times(0);
        let mut d = Disambiguator::new(TIMEOUT);

        assert_eq!(
            d.on_record(&release(KeyCode::CAPSLOCK), &clock).unwrap(),
            TapDecision::Spurious
        );
    }

    #[test]
    fn test_clock_failure_on_press_leaves_press_ineligible() {
        // Arrange
        let mut clock = MockClock::new();
        clock
            .expect_now()
            .times(1)
            .returning(|| Err(ClockError::Unavailable("test".into())));
        let mut d = Disambiguator::new(TIMEOUT);

        // Act
        let result = d.on_record(&press(KeyCode::CAPSLOCK), &clock);

        // Assert
        assert!(matches!(result, Err(ClockError::Unavailable(_))));
        assert_eq!(d.state(), CapsLockState::Up);
    }

    #[test]
    fn test_clock_failure_on_release_ends_hold_without_tap() {
        // Arrange
        let clock = ManualClock::new(ms(0));
        let mut d = Disambiguator::new(TIMEOUT);
        d.on_record(&press(KeyCode::CAPSLOCK), &clock).unwrap();

        // Act
        clock.fail("rtc offline");
        let result = d.on_record(&release(KeyCode::CAPSLOCK), &clock);

        // Assert
        assert!(result.is_err());
        assert_eq!(d.state(), CapsLockState::Up);
    }

    #[test]
    fn test_clock_going_backwards_is_a_clock_error() {
        let clock = ManualClock::new(ms(5_000));
        let mut d = Disambiguator::new(TIMEOUT);
        d.on_record(&press(KeyCode::CAPSLOCK), &clock).unwrap();

        clock.set(ms(4_900));
        let result = d.on_record(&release(KeyCode::CAPSLOCK), &clock);

        assert_eq!(result, Err(ClockError::WentBackwards(ms(100))));
        assert_eq!(d.phase(), Phase::Up);
    }

    #[test]
    fn test_default_timeout_is_200ms() {
        assert_eq!(Disambiguator::default().timeout(), Duration::from_millis(200));
    }
}
