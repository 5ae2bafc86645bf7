use num_enum::{IntoPrimitive, TryFromPrimitive, UnsafeFromPrimitive};
use static_assertions::const_assert_eq;

/// A key of the sixteen-key hexadecimal keypad.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    TryFromPrimitive,
    IntoPrimitive,
    UnsafeFromPrimitive,
)]
#[repr(u8)]
pub enum Key {
    K0,
    K1,
    K2,
    K3,
    K4,
    K5,
    K6,
    K7,
    K8,
    K9,
    KA,
    KB,
    KC,
    KD,
    KE,
    KF,
}

const_assert_eq!(Key::KF as u8, 0xF);

impl Key {
    /// The key selected by the low nibble of `value`. High bits are ignored,
    /// the same wrap-not-fault treatment the machine gives addresses.
    pub fn from_nibble(value: u8) -> Self {
        // SAFETY: masked to 0x0..=0xF, and Key has exactly those discriminants.
        unsafe { Self::from_unchecked(value & 0xF) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Pressed,
    Released,
}

impl Default for KeyState {
    fn default() -> Self {
        Self::Released
    }
}

/// Level-based state of the sixteen keys.
///
/// Written by the host in response to physical key transitions, read by the
/// machine. Last write wins; there is no debouncing or queuing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Keypad {
    key_states: [KeyState; 16],
}

impl Keypad {
    pub fn set_key(&mut self, key: Key, state: KeyState) {
        self.key_states[key as u8 as usize] = state;
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.key_states[key as u8 as usize] == KeyState::Pressed
    }

    /// The lowest-numbered key currently held down, if any.
    pub fn first_pressed(&self) -> Option<Key> {
        self.key_states
            .iter()
            .position(|&state| state == KeyState::Pressed)
            // SAFETY: positions in a 16-element array are valid Key discriminants.
            .map(|index| unsafe { Key::from_unchecked(index as u8) })
    }
}
