//! Domain logic for capsesc.
//!
//! Pure code with no device access: the tap/hold state machine and the clock
//! abstraction it measures press durations with.  Infrastructure feeds records
//! in and acts on the returned decisions; nothing here performs I/O.

/// Time sources for measuring how long Caps Lock was held.
pub mod clock;

/// The Caps Lock tap/hold state machine.
///
/// See [`disambiguator::Disambiguator`] for the main type.
pub mod disambiguator;
