//! # Level-1 Page Directory
//!
//! The top paging level: 16 slots, each either absent or owning exactly one
//! level-2 [`PageTable`].
//!
//! - [`L1Index`]: index type for VA bits `[19:16]`.
//! - [`PageDirectory`]: the slots plus the storage of the tables they own.
//!
//! ## Ownership
//!
//! Level-2 tables live in an arena owned by the directory; a slot records the
//! arena position of its table. A table is created the first time something is
//! mapped under its slot and is never handed to a second slot, so there is no
//! sharing. Tables are not freed individually: [`PageDirectory::clear`]
//! releases all of them at once.
//!
//! Table creation is fallible ([`TableAllocError`]) instead of aborting the
//! process when the allocator is exhausted.

use crate::page_table::pt::PageTable;
use alloc::vec::Vec;
use pagesim_addresses::{L1_ENTRIES, VirtualPage};

/// Index into the [`PageDirectory`] (derived from page-number bits `[7:4]`).
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct L1Index(u8);

/// Error returned when a level-2 table cannot be allocated.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("out of memory allocating a level-2 page table")]
pub struct TableAllocError;

/// Position of a level-2 table in the directory's arena.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct TableSlot(u8);

/// The level-1 table.
#[derive(Debug, Default)]
pub struct PageDirectory {
    slots: [Option<TableSlot>; L1_ENTRIES],
    tables: Vec<PageTable>,
}

impl L1Index {
    /// Extract the level-1 index of `page`.
    #[inline]
    #[must_use]
    pub const fn from(page: VirtualPage) -> Self {
        Self(page.l1())
    }

    /// Construct from a raw `u8`.
    ///
    /// ### Debug assertions
    /// - Asserts `v < 16` in debug builds.
    #[inline]
    #[must_use]
    pub const fn new(v: u8) -> Self {
        debug_assert!((v as usize) < L1_ENTRIES);
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl PageDirectory {
    /// Create a directory with every slot absent.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [None; L1_ENTRIES],
            tables: Vec::new(),
        }
    }

    /// Borrow the table owned by slot `i`, if it exists.
    #[inline]
    #[must_use]
    pub fn table(&self, i: L1Index) -> Option<&PageTable> {
        let TableSlot(pos) = self.slots[i.as_usize()]?;
        self.tables.get(usize::from(pos))
    }

    /// Mutably borrow the table owned by slot `i`, if it exists.
    #[inline]
    pub fn table_mut(&mut self, i: L1Index) -> Option<&mut PageTable> {
        let TableSlot(pos) = self.slots[i.as_usize()]?;
        self.tables.get_mut(usize::from(pos))
    }

    /// Borrow the table of slot `i`, creating an empty one if the slot is absent.
    ///
    /// # Errors
    /// [`TableAllocError`] if storage for the new table cannot be reserved.
    /// The directory is left unchanged in that case.
    pub fn ensure_table(&mut self, i: L1Index) -> Result<&mut PageTable, TableAllocError> {
        let pos = match self.slots[i.as_usize()] {
            Some(TableSlot(pos)) => usize::from(pos),
            None => {
                self.tables
                    .try_reserve_exact(1)
                    .map_err(|_| TableAllocError)?;
                let pos = self.tables.len();
                let slot = u8::try_from(pos).map_err(|_| TableAllocError)?;
                self.tables.push(PageTable::zeroed());
                self.slots[i.as_usize()] = Some(TableSlot(slot));
                log::trace!("created level-2 table for L1 slot {}", i.as_usize());
                pos
            }
        };
        Ok(&mut self.tables[pos])
    }

    /// Whether slot `i` owns a table.
    #[inline]
    #[must_use]
    pub fn is_present(&self, i: L1Index) -> bool {
        self.slots[i.as_usize()].is_some()
    }

    /// Number of level-2 tables currently allocated.
    #[inline]
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Iterate over the present slots and their tables in index order.
    pub fn iter(&self) -> impl Iterator<Item = (L1Index, &PageTable)> + '_ {
        (0u8..)
            .zip(self.slots.iter())
            .filter_map(|(i, slot)| {
                let TableSlot(pos) = (*slot)?;
                Some((L1Index(i), &self.tables[usize::from(pos)]))
            })
    }

    /// Release every level-2 table and mark all slots absent.
    pub fn clear(&mut self) {
        self.slots = [None; L1_ENTRIES];
        self.tables = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Flags;
    use crate::page_table::pt::{L2Index, PtEntry};
    use pagesim_addresses::PhysicalFrame;

    #[test]
    fn slots_start_absent() {
        let dir = PageDirectory::new();
        for i in 0..16 {
            assert!(dir.table(L1Index::new(i)).is_none());
        }
        assert_eq!(dir.table_count(), 0);
    }

    #[test]
    fn ensure_table_creates_once() {
        let mut dir = PageDirectory::new();
        let i = L1Index::new(0xA);
        let frame = PhysicalFrame::from_index(52).unwrap();

        dir.ensure_table(i)
            .unwrap()
            .set(L2Index::new(0xB), PtEntry::make(frame, Flags::READ));
        // second call returns the same table, not a fresh one
        let t = dir.ensure_table(i).unwrap();
        assert_eq!(t.get(L2Index::new(0xB)).frame(), Some(frame));
        assert_eq!(dir.table_count(), 1);
        assert!(dir.is_present(i));
        assert!(!dir.is_present(L1Index::new(0x9)));
    }

    #[test]
    fn slots_do_not_share_tables() {
        let mut dir = PageDirectory::new();
        let frame = PhysicalFrame::from_index(1).unwrap();
        dir.ensure_table(L1Index::new(0))
            .unwrap()
            .set(L2Index::new(0), PtEntry::make(frame, Flags::READ));
        dir.ensure_table(L1Index::new(1)).unwrap();

        let other = dir.table(L1Index::new(1)).unwrap();
        assert_eq!(other.get(L2Index::new(0)), PtEntry::zero());
        assert_eq!(dir.iter().count(), 2);
    }

    #[test]
    fn clear_releases_everything() {
        let mut dir = PageDirectory::new();
        for i in 0..16 {
            dir.ensure_table(L1Index::new(i)).unwrap();
        }
        assert_eq!(dir.table_count(), 16);
        dir.clear();
        assert_eq!(dir.table_count(), 0);
        assert_eq!(dir.iter().count(), 0);
    }
}
