use crate::{FRAME_COUNT, PAGE_SHIFT, PAGE_SIZE, PageOffset, PhysicalAddress};
use core::fmt;
use core::ops::Range;

/// Physical frame index.
///
/// Always in `0..256`. An *unassigned* frame is modelled as
/// `Option<PhysicalFrame>::None`, never as a sentinel value.
///
/// ### Examples
/// ```rust
/// # use pagesim_addresses::*;
/// let frame = PhysicalFrame::from_index(50).unwrap();
/// assert_eq!(frame.base().as_u32(), 50 * 4096);
/// assert!(PhysicalFrame::from_index(256).is_none());
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalFrame(u8);

impl PhysicalFrame {
    /// Build a frame from a raw index; `None` if it is `>= 256`.
    #[inline]
    #[must_use]
    pub const fn from_index(index: u16) -> Option<Self> {
        if (index as usize) < FRAME_COUNT {
            #[allow(clippy::cast_possible_truncation)]
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Build a frame from the 8-bit index stored in a page-table entry.
    #[inline]
    #[must_use]
    pub const fn from_u8(index: u8) -> Self {
        Self(index)
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

    /// First byte of the frame in the physical store.
    #[inline]
    #[must_use]
    pub const fn base(self) -> PhysicalAddress {
        PhysicalAddress::new((self.0 as u32) << PAGE_SHIFT)
    }

    #[inline]
    #[must_use]
    pub const fn join(self, off: PageOffset) -> PhysicalAddress {
        PhysicalAddress::new(self.base().as_u32() + off.as_u16() as u32)
    }

    /// Byte range the frame covers in the physical store.
    #[inline]
    #[must_use]
    pub const fn byte_range(self) -> Range<usize> {
        let start = self.base().as_usize();
        start..start + PAGE_SIZE
    }

    /// Iterate over every frame in ascending index order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..=u8::MAX).map(Self)
    }
}

impl fmt::Debug for PhysicalFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysicalFrame({})", self.0)
    }
}

impl fmt::Display for PhysicalFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
