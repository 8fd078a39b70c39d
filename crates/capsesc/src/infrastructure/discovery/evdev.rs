//! evdev-backed node opener.

use std::io;
use std::path::Path;

use capsesc_core::KeyCode;
use ::evdev::{Device, EventType, Key};

use super::{InputNode, NodeOpener};

/// Opens `/dev/input/eventN` nodes read-only with evdev.
#[derive(Debug, Default, Clone, Copy)]
pub struct EvdevOpener;

impl NodeOpener for EvdevOpener {
    type Node = Device;

    fn open(&self, path: &Path) -> io::Result<Device> {
        Device::open(path)
    }
}

impl InputNode for Device {
    fn name(&self) -> Option<&str> {
        Device::name(self)
    }

    fn has_key_events(&self) -> bool {
        self.supported_events().contains(EventType::KEY)
    }

    fn has_key(&self, key: KeyCode) -> bool {
        self.supported_keys()
            .is_some_and(|keys| keys.contains(Key::new(key.code())))
    }
}
