//! Fan-in of every keyboard into one ordered stream.
//!
//! # How it works
//!
//! ```text
//!  EventSource #0 ──reader task──┐
//!  EventSource #1 ──reader task──┼──▶ bounded mpsc ──▶ next() ──▶ event loop
//!  EventSource #N ──reader task──┘
//! ```
//!
//! Each reader task awaits one record at a time from its source and forwards
//! it.  The channel is the only path to the event loop, so records from all
//! keyboards reach the disambiguator in a single global order and the
//! disambiguator keeps exactly one owner.
//!
//! A reader retires its source (sending [`MuxEvent::Closed`]) when the device
//! disconnects or keeps failing.  Any other read error is logged and skipped.

use std::io;
use std::path::PathBuf;

use capsesc_core::RawRecord;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::infrastructure::input_source::{EventSource, SourceId};

/// Consecutive read failures after which a source is retired.
pub const MAX_CONSECUTIVE_READ_FAILURES: u32 = 32;

/// Default channel capacity.
pub const DEFAULT_CAPACITY: usize = 256;

/// Why a source stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The device was unplugged or its stream ended.
    Disconnected,
    /// Reads kept failing.
    TooManyFailures,
}

/// One item from the merged stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MuxEvent {
    Record { source: SourceId, record: RawRecord },
    Closed {
        source: SourceId,
        path: PathBuf,
        reason: CloseReason,
    },
}

/// Returns `true` when `err` means the device is gone for good.
pub fn is_disconnect(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        return true;
    }
    #[cfg(target_os = "linux")]
    if err.raw_os_error() == Some(libc::ENODEV) {
        return true;
    }
    false
}

/// Merges many [`EventSource`]s into one stream.
pub struct EventMultiplexer {
    rx: mpsc::Receiver<MuxEvent>,
    readers: Vec<JoinHandle<()>>,
    live: usize,
}

impl EventMultiplexer {
    /// Spawns one reader task per source.  Must be called inside a tokio runtime.
    pub fn start(sources: Vec<Box<dyn EventSource>>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let live = sources.len();
        let readers = sources
            .into_iter()
            .enumerate()
            .map(|(index, source)| tokio::spawn(read_loop(SourceId(index), source, tx.clone())))
            .collect();

        Self { rx, readers, live }
    }

    /// Waits for the next record or retirement.
    ///
    /// Returns `None` once every source has been retired (or after
    /// [`EventMultiplexer::shutdown`]).
    pub async fn next(&mut self) -> Option<MuxEvent> {
        let event = self.rx.recv().await?;
        if matches!(event, MuxEvent::Closed { .. }) {
            self.live = self.live.saturating_sub(1);
        }
        Some(event)
    }

    /// Number of sources not yet retired.
    pub fn live_sources(&self) -> usize {
        self.live
    }

    /// Aborts every reader task, closing the devices they own.
    pub fn shutdown(&mut self) {
        for reader in self.readers.drain(..) {
            reader.abort();
        }
        self.rx.close();
        self.live = 0;
    }
}

impl Drop for EventMultiplexer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn read_loop(id: SourceId, mut source: Box<dyn EventSource>, tx: mpsc::Sender<MuxEvent>) {
    let path = source.path().to_path_buf();
    let mut failures = 0u32;
    debug!(source = %id, path = %path.display(), "reader started");

    let reason = loop {
        match source.next_record().await {
            Ok(record) => {
                failures = 0;
                if tx.send(MuxEvent::Record { source: id, record }).await.is_err() {
                    // Receiver gone: the daemon is shutting down.
                    return;
                }
            }
            Err(e) if is_disconnect(&e) => {
                warn!(path = %path.display(), "keyboard disconnected");
                break CloseReason::Disconnected;
            }
            Err(e) => {
                failures += 1;
                warn!(path = %path.display(), error = %e, "read failed, skipping");
                if failures >= MAX_CONSECUTIVE_READ_FAILURES {
                    error!(
                        path = %path.display(),
                        failures, "keyboard keeps failing, no longer reading it"
                    );
                    break CloseReason::TooManyFailures;
                }
                tokio::task::yield_now().await;
            }
        }
    };

    info!(source = %id, path = %path.display(), ?reason, "reader stopped");
    let _ = tx
        .send(MuxEvent::Closed {
            source: id,
            path,
            reason,
        })
        .await;
}

// ── Tests ─────────────────────────────────────────────────────────────────────
