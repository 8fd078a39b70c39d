//! Readable keyboards.
//!
//! An [`EventSource`] yields raw records one at a time.  The multiplexer owns
//! each source inside its own reader task, so sources only need to be `Send`.

use std::fmt;
use std::io;
use std::path::Path;

use async_trait::async_trait;
use capsesc_core::RawRecord;

pub mod mock;

#[cfg(target_os = "linux")]
pub mod evdev;

/// Position of a source in the list handed to the multiplexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub usize);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One keyboard the daemon reads from.
#[async_trait]
pub trait EventSource: Send {
    /// Device node path, for logging.
    fn path(&self) -> &Path;

    /// Waits for the next record.
    ///
    /// # Errors
    ///
    /// `ENODEV` or [`io::ErrorKind::UnexpectedEof`] mean the device is gone
    /// for good; anything else may be transient.
    async fn next_record(&mut self) -> io::Result<RawRecord>;
}
