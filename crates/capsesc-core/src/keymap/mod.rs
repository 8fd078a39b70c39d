//! Linux input key codes (`KEY_*` from `linux/input-event-codes.h`).
//!
//! The kernel identifies every key by a 16-bit code that describes the
//! **physical key position**, not the character it produces.  Caps Lock is
//! always code 58 no matter which layout or xkb option is active, which is
//! exactly what lets the daemon recognise it before any remapping happens.
//!
//! Only a small subset is named here: the two keys the virtual keyboard emits,
//! the keys used to recognise a keyboard during discovery, and a few common
//! keys so log lines are readable.  Any other code still flows through the
//! daemon untouched as a plain [`KeyCode`].

use std::fmt;

/// A Linux evdev key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub const ESC: KeyCode = KeyCode(1);
    pub const TAB: KeyCode = KeyCode(15);
    pub const Q: KeyCode = KeyCode(16);
    pub const ENTER: KeyCode = KeyCode(28);
    pub const LEFTCTRL: KeyCode = KeyCode(29);
    pub const A: KeyCode = KeyCode(30);
    pub const S: KeyCode = KeyCode(31);
    pub const J: KeyCode = KeyCode(36);
    pub const LEFTSHIFT: KeyCode = KeyCode(42);
    pub const Z: KeyCode = KeyCode(44);
    pub const RIGHTSHIFT: KeyCode = KeyCode(54);
    pub const LEFTALT: KeyCode = KeyCode(56);
    pub const SPACE: KeyCode = KeyCode(57);
    pub const CAPSLOCK: KeyCode = KeyCode(58);
    pub const RIGHTCTRL: KeyCode = KeyCode(97);
    pub const RIGHTALT: KeyCode = KeyCode(100);
    pub const LEFTMETA: KeyCode = KeyCode(125);
    pub const RIGHTMETA: KeyCode = KeyCode(126);

    /// Returns the raw 16-bit code.
    pub const fn code(self) -> u16 {
        self.0
    }

    /// Returns the kernel's symbolic name for well-known codes.
    pub fn name(self) -> Option<&'static str> {
        NAMES
            .iter()
            .find(|(code, _)| *code == self)
            .map(|(_, name)| *name)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "KEY_{}", self.0),
        }
    }
}

impl From<u16> for KeyCode {
    fn from(code: u16) -> Self {
        KeyCode(code)
    }
}

const NAMES: &[(KeyCode, &str)] = &[
    (KeyCode::ESC, "KEY_ESC"),
    (KeyCode::TAB, "KEY_TAB"),
    (KeyCode::Q, "KEY_Q"),
    (KeyCode::ENTER, "KEY_ENTER"),
    (KeyCode::LEFTCTRL, "KEY_LEFTCTRL"),
    (KeyCode::A, "KEY_A"),
    (KeyCode::S, "KEY_S"),
    (KeyCode::J, "KEY_J"),
    (KeyCode::LEFTSHIFT, "KEY_LEFTSHIFT"),
    (KeyCode::Z, "KEY_Z"),
    (KeyCode::RIGHTSHIFT, "KEY_RIGHTSHIFT"),
    (KeyCode::LEFTALT, "KEY_LEFTALT"),
    (KeyCode::SPACE, "KEY_SPACE"),
    (KeyCode::CAPSLOCK, "KEY_CAPSLOCK"),
    (KeyCode::RIGHTCTRL, "KEY_RIGHTCTRL"),
    (KeyCode::RIGHTALT, "KEY_RIGHTALT"),
    (KeyCode::LEFTMETA, "KEY_LEFTMETA"),
    (KeyCode::RIGHTMETA, "KEY_RIGHTMETA"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capslock_and_escape_match_kernel_values() {
        // These two codes are part of the virtual keyboard's capability set;
        // a wrong value would register the wrong key with uinput.
        assert_eq!(KeyCode::CAPSLOCK.code(), 58);
        assert_eq!(KeyCode::ESC.code(), 1);
    }

    #[test]
    fn test_display_uses_kernel_name_for_known_codes() {
        assert_eq!(KeyCode::CAPSLOCK.to_string(), "KEY_CAPSLOCK");
        assert_eq!(KeyCode::ESC.to_string(), "KEY_ESC");
    }

    #[test]
    fn test_display_falls_back_to_numeric_for_unnamed_codes() {
        // Arrange
        let code = KeyCode(240);

        // Act / Assert
        assert_eq!(code.name(), None);
        assert_eq!(code.to_string(), "KEY_240");
    }

    #[test]
    fn test_every_named_code_is_unique() {
        for (i, (code, _)) in NAMES.iter().enumerate() {
            let dupes = NAMES.iter().skip(i + 1).filter(|(c, _)| c == code).count();
            assert_eq!(dupes, 0, "{code:?} is listed more than once");
        }
    }
}
