use crate::{ADDRESS_SPACE_SIZE, PAGE_OFFSET_MASK, PAGE_SHIFT, PageOffset, VirtualPage};
use core::fmt;

/// Virtual memory address.
///
/// A thin wrapper around `u32` that denotes a **virtual** address of the
/// simulated process. It does not validate the range on construction; it
/// only carries the *kind* of address at the type level. Whether the value
/// lies inside the 20-bit address space is decided when it is translated.
///
/// ### Semantics
/// - [`page`](Self::page) / [`offset`](Self::offset) / [`split`](Self::split)
///   derive the containing page and the in-page offset.
/// - [`VirtualPage::join`] reconstructs the address from both halves.
///
/// ### Examples
/// ```rust
/// # use pagesim_addresses::*;
/// let va = VirtualAddress::new(0x01_F200);
/// let page = va.page().unwrap();
/// assert_eq!(page.as_usize(), 0x1F);
/// assert_eq!(page.join(va.offset()), va);
///
/// assert!(VirtualAddress::new(0x20_0000).page().is_none());
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VirtualAddress(u32);

impl VirtualAddress {
    #[inline]
    #[must_use]
    pub const fn new(v: u32) -> Self {
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns `true` if the address lies inside the virtual address space.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 < ADDRESS_SPACE_SIZE
    }

    /// The page containing this address, or `None` if the address is outside
    /// the address space.
    #[inline]
    #[must_use]
    pub const fn page(self) -> Option<VirtualPage> {
        if !self.is_valid() {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        Some(VirtualPage::new((self.0 >> PAGE_SHIFT) as u8))
    }

    /// The in-page offset (bits `[11:0]`).
    #[inline]
    #[must_use]
    pub const fn offset(self) -> PageOffset {
        #[allow(clippy::cast_possible_truncation)]
        PageOffset::new((self.0 & PAGE_OFFSET_MASK) as u16)
    }

    #[inline]
    #[must_use]
    pub const fn split(self) -> Option<(VirtualPage, PageOffset)> {
        match self.page() {
            Some(page) => Some((page, self.offset())),
            None => None,
        }
    }
}

impl fmt::Debug for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VA(0x{:05X})", self.0)
    }
}

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:05X}", self.0)
    }
}

impl From<u32> for VirtualAddress {
    #[inline]
    fn from(v: u32) -> Self {
        Self::new(v)
    }
}

impl From<VirtualAddress> for u32 {
    #[inline]
    fn from(va: VirtualAddress) -> Self {
        va.as_u32()
    }
}
