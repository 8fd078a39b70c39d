//! uinput virtual keyboard.
//!
//! # What is uinput?
//!
//! `/dev/uinput` lets a process create an input device that the kernel treats
//! like real hardware.  Anything written to it is delivered to every reader of
//! the new `/dev/input/eventN` node, so the compositor sees our Escape taps as
//! coming from an ordinary keyboard.
//!
//! The device declares only the keys it was created with.  The kernel drops
//! writes for undeclared keys, so the set is fixed for the device's lifetime.
//!
//! # Permissions
//!
//! Creating the device needs write access to `/dev/uinput`, normally root or
//! membership in a group a udev rule grants it to.  Failure is fatal at
//! startup with [`OutputError::Open`].

use ::evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use ::evdev::{AttributeSet, BusType, EventType, InputEvent, InputId, Key};
use capsesc_core::{KeyCode, RawRecord};
use tracing::info;

use crate::application::remap_caps::{OutputError, VirtualKeyboard};
use crate::domain::config::VirtualDeviceIdentity;

/// Virtual keyboard backed by a uinput device.
///
/// Dropping it destroys the device.
pub struct UinputKeyboard {
    device: VirtualDevice,
}

impl UinputKeyboard {
    /// Creates and activates the device.
    ///
    /// # Errors
    ///
    /// - [`OutputError::Open`] when `/dev/uinput` cannot be opened.
    /// - [`OutputError::Capability`] when a key cannot be declared.
    /// - [`OutputError::Activate`] when the kernel refuses the device.
    pub fn create(identity: &VirtualDeviceIdentity, keys: &[KeyCode]) -> Result<Self, OutputError> {
        let mut builder = VirtualDeviceBuilder::new()
            .map_err(OutputError::Open)?
            .name(&identity.name)
            .input_id(InputId::new(
                BusType(identity.bus_type),
                identity.vendor,
                identity.product,
                identity.version,
            ));

        // One key per call so a failure names the key.
        for &key in keys {
            let mut one = AttributeSet::<Key>::new();
            one.insert(Key::new(key.code()));
            builder = builder
                .with_keys(&one)
                .map_err(|source| OutputError::Capability { key, source })?;
        }

        let device = builder.build().map_err(OutputError::Activate)?;
        info!(name = %identity.name, keys = keys.len(), "virtual keyboard created");
        Ok(Self { device })
    }
}

impl VirtualKeyboard for UinputKeyboard {
    /// `VirtualDevice::emit` terminates every batch with `SYN_REPORT` itself.
    fn emit_synced(&mut self, records: &[RawRecord]) -> Result<(), OutputError> {
        let events: Vec<InputEvent> = records
            .iter()
            .map(|r| InputEvent::new(EventType(r.kind.0), r.code, r.value))
            .collect();
        self.device.emit(&events).map_err(OutputError::Write)
    }
}
