use crate::PAGE_OFFSET_MASK;
use core::fmt;

/// The offset within a 4 KiB page (`0..4096`).
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PageOffset(u16);

impl PageOffset {
    /// Create from a raw value, asserting it is < 4096 in debug.
    #[inline]
    #[must_use]
    pub const fn new(value: u16) -> Self {
        debug_assert!((value as u32) <= PAGE_OFFSET_MASK, "offset must be < page size");
        #[allow(clippy::cast_possible_truncation)]
        Self(value & PAGE_OFFSET_MASK as u16)
    }

    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for PageOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Offset(0x{:03X})", self.0)
    }
}

impl fmt::Display for PageOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:03X}", self.0)
    }
}
