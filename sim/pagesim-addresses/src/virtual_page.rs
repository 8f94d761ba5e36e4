use crate::{L1_ENTRIES, L2_ENTRIES, LEVEL_BITS, PAGE_COUNT, PAGE_SHIFT, PageOffset, VirtualAddress};
use core::fmt;

/// Virtual page number.
///
/// Always in `0..256`; the type cannot represent an out-of-range page.
/// Raw page numbers coming from callers go through
/// [`from_index`](Self::from_index), which rejects values `>= 256`.
///
/// ### Layout
/// - `l1()` = bits `[7:4]`: slot in the first-level table.
/// - `l2()` = bits `[3:0]`: entry in the second-level table.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VirtualPage(u8);

impl VirtualPage {
    #[inline]
    #[must_use]
    pub(crate) const fn new(v: u8) -> Self {
        Self(v)
    }

    /// Build a page from a raw page number; `None` if it is `>= 256`.
    #[inline]
    #[must_use]
    pub const fn from_index(index: u16) -> Option<Self> {
        if (index as usize) < PAGE_COUNT {
            #[allow(clippy::cast_possible_truncation)]
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Build a page from its two table indices; `None` if either is `>= 16`.
    #[inline]
    #[must_use]
    pub const fn from_parts(l1: u8, l2: u8) -> Option<Self> {
        if (l1 as usize) < L1_ENTRIES && (l2 as usize) < L2_ENTRIES {
            Some(Self((l1 << LEVEL_BITS) | l2))
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub const fn l1(self) -> u8 {
        self.0 >> LEVEL_BITS
    }

    #[inline]
    #[must_use]
    pub const fn l2(self) -> u8 {
        self.0 & ((1 << LEVEL_BITS) - 1)
    }

    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    #[inline]
    #[must_use]
    pub const fn base(self) -> VirtualAddress {
        VirtualAddress::new((self.0 as u32) << PAGE_SHIFT)
    }

    #[inline]
    #[must_use]
    pub const fn join(self, off: PageOffset) -> VirtualAddress {
        VirtualAddress::new(self.base().as_u32() | off.as_u16() as u32)
    }

    /// Iterate over every page of the address space in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..=u8::MAX).map(Self)
    }
}

impl fmt::Debug for VirtualPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtualPage(0x{:02X})", self.0)
    }
}

impl fmt::Display for VirtualPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}
