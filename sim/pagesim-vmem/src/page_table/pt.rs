//! # Level-2 Page Table
//!
//! This module models the leaf paging level.
//!
//! - [`L2Index`]: index type for VA bits `[15:12]`.
//! - [`PtEntry`]: a leaf entry mapping one 4 KiB page to one frame.
//! - [`PageTable`]: a fixed array of 16 entries, all initially unassigned.
//!
//! ## Invariants & Notes
//!
//! - [`PtEntry::make`] always sets `VALID` and assigns the frame.
//! - [`PtEntry::mapping`] is the only way to read a translation; it yields
//!   `None` unless the entry is both valid and assigned.

use crate::{Flags, PageEntryBits};
use pagesim_addresses::{L2_ENTRIES, PhysicalFrame, VirtualPage};

/// Index into a [`PageTable`] (derived from page-number bits `[3:0]`).
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct L2Index(u8);

/// A single leaf entry.
#[doc(alias = "PTE")]
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PtEntry(PageEntryBits);

/// The level-2 table: 16 leaf entries.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageTable {
    entries: [PtEntry; L2_ENTRIES],
}

impl L2Index {
    /// Extract the level-2 index of `page`.
    #[inline]
    #[must_use]
    pub const fn from(page: VirtualPage) -> Self {
        Self(page.l2())
    }

    /// Construct from a raw `u8`.
    ///
    /// ### Debug assertions
    /// - Asserts `v < 16` in debug builds.
    #[inline]
    #[must_use]
    pub const fn new(v: u8) -> Self {
        debug_assert!((v as usize) < L2_ENTRIES);
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl PtEntry {
    /// Create an unassigned, invalid entry.
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self(PageEntryBits::new())
    }

    /// Create a leaf mapping to `frame` with `flags | VALID`.
    #[inline]
    #[must_use]
    pub const fn make(frame: PhysicalFrame, flags: Flags) -> Self {
        Self(PageEntryBits::from_flags(flags.union(Flags::VALID)).with_assigned_frame(frame))
    }

    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0.valid()
    }

    /// The frame recorded in the entry, whether or not the entry is valid.
    #[inline]
    #[must_use]
    pub const fn frame(self) -> Option<PhysicalFrame> {
        self.0.assigned_frame()
    }

    #[inline]
    #[must_use]
    pub const fn flags(self) -> Flags {
        self.0.flags()
    }

    /// If usable for translation, return the mapped frame and its flags.
    #[inline]
    #[must_use]
    pub const fn mapping(self) -> Option<(PhysicalFrame, Flags)> {
        if !self.is_valid() {
            return None;
        }
        match self.frame() {
            Some(frame) => Some((frame, self.flags())),
            None => None,
        }
    }
}

impl Default for PtEntry {
    fn default() -> Self {
        Self::zero()
    }
}

impl PageTable {
    /// Create a table with every entry unassigned.
    #[inline]
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            entries: [PtEntry::zero(); L2_ENTRIES],
        }
    }

    #[inline]
    #[must_use]
    pub const fn get(&self, i: L2Index) -> PtEntry {
        self.entries[i.as_usize()]
    }

    #[inline]
    pub const fn set(&mut self, i: L2Index, e: PtEntry) {
        self.entries[i.as_usize()] = e;
    }

    /// Iterate over `(index, entry)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (L2Index, PtEntry)> + '_ {
        (0u8..).zip(self.entries.iter()).map(|(i, e)| (L2Index(i), *e))
    }
}

impl Default for PageTable {
    fn default() -> Self {
        Self::zeroed()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn make_forces_valid() {
        let frame = PhysicalFrame::from_index(50).unwrap();
        let e = PtEntry::make(frame, Flags::READ);
        assert!(e.is_valid());
        assert_eq!(e.mapping(), Some((frame, Flags::VALID | Flags::READ)));
    }

    #[test]
    fn invalid_or_unassigned_entries_do_not_translate() {
        assert_eq!(PtEntry::zero().mapping(), None);

        // assigned frame but VALID clear
        let frame = PhysicalFrame::from_index(3).unwrap();
        let stale = PtEntry(PageEntryBits::from_flags(Flags::READ_WRITE).with_assigned_frame(frame));
        assert_eq!(stale.frame(), Some(frame));
        assert_eq!(stale.mapping(), None);

        // VALID set but no frame
        let orphan = PtEntry(PageEntryBits::from_bits(Flags::VALID.bits().into()));
        assert_eq!(orphan.mapping(), None);
    }

    #[test]
    fn fresh_table_is_empty() {
        let t = PageTable::zeroed();
        assert!(t.iter().all(|(_, e)| e == PtEntry::zero()));
        assert_eq!(t.iter().count(), L2_ENTRIES);
    }
}
