//! Keyboard discovery.
//!
//! # Which nodes count as keyboards?
//!
//! A node is a keyboard when it reports `EV_KEY` and can produce all of
//! Caps Lock, Escape, `A`, `Z` and Enter.  Mice, power buttons, lid switches
//! and media remotes also report `EV_KEY`, but never that whole set.
//!
//! Nodes whose name equals our own virtual keyboard's name are skipped, so the
//! daemon never reads back the Escape taps it writes.
//!
//! # Failure policy
//!
//! | Situation                          | Outcome                       |
//! |------------------------------------|-------------------------------|
//! | node vanished between list & open  | skipped                       |
//! | any other open failure             | fatal (`DiscoveryError::Open`) |
//! | keyboard limit reached             | later nodes never opened, warning |
//! | no keyboards at all                | fatal (`NoKeyboards`)         |

use std::io;
use std::path::{Path, PathBuf};

use capsesc_core::KeyCode;
use thiserror::Error;
use tracing::{debug, info, warn};

#[cfg(target_os = "linux")]
pub mod evdev;

/// Directory holding the event device nodes.
pub const INPUT_DIR: &str = "/dev/input";

/// Keys a node must support to be treated as a keyboard.
pub const REQUIRED_KEYS: [KeyCode; 5] = [
    KeyCode::CAPSLOCK,
    KeyCode::ESC,
    KeyCode::A,
    KeyCode::Z,
    KeyCode::ENTER,
];

/// Error type for keyboard discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("cannot list {dir}: {source}")]
    Enumerate {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no keyboards found under {0}")]
    NoKeyboards(PathBuf),
}

/// Capabilities of one opened input node.
pub trait InputNode {
    fn name(&self) -> Option<&str>;
    fn has_key_events(&self) -> bool;
    fn has_key(&self, key: KeyCode) -> bool;
}

/// Opens input nodes by path.
pub trait NodeOpener {
    type Node: InputNode;

    fn open(&self, path: &Path) -> io::Result<Self::Node>;
}

/// A node that passed the keyboard heuristic.
#[derive(Debug)]
pub struct DiscoveredKeyboard<N> {
    pub path: PathBuf,
    pub node: N,
}

/// Returns `true` when a node with these capabilities is a keyboard.
pub fn is_keyboard(has_key_events: bool, has_key: impl Fn(KeyCode) -> bool) -> bool {
    has_key_events && REQUIRED_KEYS.iter().all(|&k| has_key(k))
}

/// Parses the `N` out of an `eventN` file name.
pub fn event_index(file_name: &str) -> Option<u32> {
    let digits = file_name.strip_prefix("event")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Lists the `eventN` nodes under `dir`, ordered by `N`.
///
/// # Errors
///
/// Returns [`DiscoveryError::Enumerate`] when `dir` cannot be read.
pub fn list_event_nodes(dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    let enumerate_err = |source| DiscoveryError::Enumerate {
        dir: dir.to_path_buf(),
        source,
    };

    let mut nodes = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(enumerate_err)? {
        let entry = entry.map_err(enumerate_err)?;
        let name = entry.file_name();
        if let Some(index) = name.to_str().and_then(event_index) {
            nodes.push((index, entry.path()));
        }
    }
    nodes.sort_by_key(|(index, _)| *index);
    Ok(nodes.into_iter().map(|(_, path)| path).collect())
}

/// Opens each of `paths` in order and keeps the keyboards.
///
/// # Errors
///
/// See the failure policy in the module docs.
pub fn select_keyboards<O: NodeOpener>(
    opener: &O,
    paths: &[PathBuf],
    own_name: &str,
    limit: usize,
) -> Result<Vec<DiscoveredKeyboard<O::Node>>, DiscoveryError> {
    let mut keyboards = Vec::new();

    for (index, path) in paths.iter().enumerate() {
        // Nodes past the limit are never opened, so they cannot fail startup.
        if keyboards.len() == limit {
            warn!(
                limit,
                skipped = paths.len() - index,
                "too many keyboards, ignoring the remaining nodes"
            );
            break;
        }

        let node = match opener.open(path) {
            Ok(node) => node,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "node vanished before open");
                continue;
            }
            Err(source) => {
                return Err(DiscoveryError::Open {
                    path: path.clone(),
                    source,
                })
            }
        };

        if node.name() == Some(own_name) {
            debug!(path = %path.display(), "skipping our own virtual keyboard");
            continue;
        }
        if !is_keyboard(node.has_key_events(), |k| node.has_key(k)) {
            continue;
        }

        info!(
            path = %path.display(),
            name = node.name().unwrap_or("<unnamed>"),
            "keyboard found"
        );
        keyboards.push(DiscoveredKeyboard {
            path: path.clone(),
            node,
        });
    }

    Ok(keyboards)
}

/// Lists `dir` and selects its keyboards.
///
/// # Errors
///
/// Everything [`list_event_nodes`] and [`select_keyboards`] return, plus
/// [`DiscoveryError::NoKeyboards`] when nothing qualified.
pub fn discover_keyboards<O: NodeOpener>(
    opener: &O,
    dir: &Path,
    own_name: &str,
    limit: usize,
) -> Result<Vec<DiscoveredKeyboard<O::Node>>, DiscoveryError> {
    let paths = list_event_nodes(dir)?;
    let keyboards = select_keyboards(opener, &paths, own_name, limit)?;
    if keyboards.is_empty() {
        return Err(DiscoveryError::NoKeyboards(dir.to_path_buf()));
    }
    Ok(keyboards)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
