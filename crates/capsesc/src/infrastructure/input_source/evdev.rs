//! evdev event source.
//!
//! Wraps an [`::evdev::EventStream`], which reads the node through tokio's
//! reactor.  The device is never grabbed: other readers (the compositor, X)
//! keep receiving every event, Caps Lock included.

use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use ::evdev::{Device, EventStream, InputEvent};
use async_trait::async_trait;
use capsesc_core::{EventKind, RawRecord};

use super::EventSource;
use crate::infrastructure::discovery::DiscoveredKeyboard;

/// A keyboard read through evdev.
pub struct EvdevSource {
    path: PathBuf,
    stream: EventStream,
}

impl EvdevSource {
    /// Registers the keyboard's node with the tokio reactor.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from switching the node to non-blocking mode.
    pub fn new(keyboard: DiscoveredKeyboard<Device>) -> io::Result<Self> {
        Ok(Self {
            path: keyboard.path,
            stream: keyboard.node.into_event_stream()?,
        })
    }
}

#[async_trait]
impl EventSource for EvdevSource {
    fn path(&self) -> &Path {
        &self.path
    }

    async fn next_record(&mut self) -> io::Result<RawRecord> {
        let event = self.stream.next_event().await?;
        Ok(to_record(&event))
    }
}

fn to_record(event: &InputEvent) -> RawRecord {
    // Kernel timestamps before the epoch only happen with a broken RTC.
    let timestamp = event
        .timestamp()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    RawRecord::new(EventKind(event.event_type().0), event.code(), event.value()).at(timestamp)
}
