//! Channel-backed event source for tests.
//!
//! `MockEventSource::new` returns the source and a [`MockSourceHandle`].  Push
//! records (or injected read errors) through the handle; drop the handle to
//! make the source report end-of-file, which the multiplexer treats as a
//! disconnect.
//!
//! ```ignore
//! let (source, kbd) = MockEventSource::new("/dev/input/event3");
//! let mut mux = EventMultiplexer::start(vec![Box::new(source)], 64);
//! kbd.press(KeyCode::CAPSLOCK);
//! ```

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use capsesc_core::protocol::record::{VALUE_PRESSED, VALUE_RELEASED, VALUE_REPEAT};
use capsesc_core::{KeyCode, RawRecord};
use tokio::sync::mpsc;

use super::EventSource;

type Item = io::Result<RawRecord>;

/// An [`EventSource`] fed from a [`MockSourceHandle`].
pub struct MockEventSource {
    path: PathBuf,
    rx: mpsc::UnboundedReceiver<Item>,
}

/// Feeding end of a [`MockEventSource`].
#[derive(Clone)]
pub struct MockSourceHandle {
    tx: mpsc::UnboundedSender<Item>,
}

impl MockEventSource {
    pub fn new(path: impl Into<PathBuf>) -> (Self, MockSourceHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.into(),
                rx,
            },
            MockSourceHandle { tx },
        )
    }
}

#[async_trait]
impl EventSource for MockEventSource {
    fn path(&self) -> &Path {
        &self.path
    }

    async fn next_record(&mut self) -> io::Result<RawRecord> {
        match self.rx.recv().await {
            Some(item) => item,
            None => Err(io::Error::from(io::ErrorKind::UnexpectedEof)),
        }
    }
}

impl MockSourceHandle {
    /// Queues a raw record.  Silently dropped once the source is gone.
    pub fn send(&self, record: RawRecord) {
        let _ = self.tx.send(Ok(record));
    }

    /// Queues a key record followed by a sync report, like a real keyboard.
    pub fn key(&self, key: KeyCode, value: i32) {
        self.send(RawRecord::key(key, value));
        self.send(RawRecord::sync_report());
    }

    pub fn press(&self, key: KeyCode) {
        self.key(key, VALUE_PRESSED);
    }

    pub fn release(&self, key: KeyCode) {
        self.key(key, VALUE_RELEASED);
    }

    pub fn repeat(&self, key: KeyCode) {
        self.key(key, VALUE_REPEAT);
    }

    /// Queues a read failure of the given kind.
    pub fn fail(&self, kind: io::ErrorKind) {
        let _ = self.tx.send(Err(io::Error::from(kind)));
    }

    /// Queues a read failure carrying a raw OS error code.
    pub fn fail_os(&self, errno: i32) {
        let _ = self.tx.send(Err(io::Error::from_raw_os_error(errno)));
    }
}
