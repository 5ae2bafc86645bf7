use num_enum::{IntoPrimitive, TryFromPrimitive, UnsafeFromPrimitive};
use static_assertions::const_assert_eq;

/// Number of general data registers.
pub const DATA_REGISTER_COUNT: usize = 16;

/// A general-purpose data register of the machine.
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
pub enum DataRegister {
    /// Also the offset register for computed jumps.
    V0,
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
    V7,
    V8,
    V9,
    VA,
    VB,
    VC,
    VD,
    VE,
    /// Doubles as the flags register: carry, borrow, the shifted-out bit
    /// and the draw collision flag are all written here. Instructions that
    /// compute a flag write VF after their data write, so VF holds the flag
    /// even when it was also the destination operand.
    VF,
}

const_assert_eq!(DataRegister::VF as usize, DATA_REGISTER_COUNT - 1);

impl DataRegister {
    /// The register selected by an instruction nibble.
    pub(crate) fn from_nibble(nibble: u8) -> Self {
        // SAFETY: masked to 0x0..=0xF, and DataRegister has exactly those
        // discriminants.
        unsafe { Self::from_unchecked(nibble & 0xF) }
    }
}
