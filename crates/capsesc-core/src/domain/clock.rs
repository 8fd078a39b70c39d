//! Clock sources used to time Caps Lock presses.
//!
//! The disambiguator never calls the OS directly; it asks a [`Clock`] for "now"
//! at press time and again at release time and compares the difference with
//! the configured timeout.  Only the difference matters, so each clock is free
//! to pick its own origin.
//!
//! | Clock              | Origin                  | Can fail?                          |
//! |--------------------|-------------------------|------------------------------------|
//! | [`MonotonicClock`] | construction time       | no                                 |
//! | [`WallClock`]      | Unix epoch              | yes, if the system time is pre-1970 |
//! | [`ManualClock`]    | whatever the test sets  | on demand                          |
//!
//! The monotonic clock is the default because a wall clock can jump when NTP
//! or the user adjusts the time, which would corrupt the elapsed-time check.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use thiserror::Error;

/// Error returned when a clock cannot produce a usable reading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("clock unavailable: {0}")]
    Unavailable(String),
    #[error("clock moved backwards by {0:?} since the Caps Lock press")]
    WentBackwards(Duration),
}

/// A source of "now", measured from an origin chosen by the implementation.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    /// Returns the current reading.
    fn now(&self) -> Result<Duration, ClockError>;
}

/// Monotonic clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Result<Duration, ClockError> {
        Ok(self.origin.elapsed())
    }
}

/// Wall-clock time since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl Clock for WallClock {
    fn now(&self) -> Result<Duration, ClockError> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ClockError::Unavailable(e.to_string()))
    }
}

/// A clock that only moves when told to.
///
/// Used by tests and benchmarks to drive exact press/release timings.
#[derive(Debug)]
pub struct ManualClock {
    state: Mutex<ManualReading>,
}

#[derive(Debug)]
struct ManualReading {
    /// Last reading set or advanced to; kept while a failure is injected.
    now: Duration,
    failure: Option<ClockError>,
}

impl ManualClock {
    /// Creates a clock reading `start`.
    pub fn new(start: Duration) -> Self {
        Self {
            state: Mutex::new(ManualReading {
                now: start,
                failure: None,
            }),
        }
    }

    /// Sets the reading to `now`, clearing any injected failure.
    pub fn set(&self, now: Duration) {
        let mut state = self.lock();
        state.now = now;
        state.failure = None;
    }

    /// Moves the last good reading forward by `by`, clearing any injected failure.
    pub fn advance(&self, by: Duration) {
        let mut state = self.lock();
        state.now += by;
        state.failure = None;
    }

    /// Makes every following read fail until the clock is set or advanced.
    pub fn fail(&self, reason: &str) {
        self.lock().failure = Some(ClockError::Unavailable(reason.to_string()));
    }

    fn lock(&self) -> MutexGuard<'_, ManualReading> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Result<Duration, ClockError> {
        let state = self.lock();
        match &state.failure {
            Some(e) => Err(e.clone()),
            None => Ok(state.now),
        }
    }
}
