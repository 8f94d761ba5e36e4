//! # Address Space
//!
//! One complete simulated address space: a [`PageDirectory`] and the level-2
//! tables it owns.
//!
//! ## Highlights
//!
//! - [`AddressSpace::map_one`] installs one page → frame mapping, creating the
//!   level-2 table on demand and marking the frame used.
//! - [`AddressSpace::unmap_one`] clears one mapping and releases its frame.
//! - [`AddressSpace::query`] walks both levels and checks permissions.
//! - [`AddressSpace::clear`] drops every table at once.
//!
//! ## Design
//!
//! - Frame bookkeeping goes through a caller-provided [`FrameAlloc`]; the
//!   address space itself never chooses frames.
//! - `map_one` overwrites whatever the entry held before and does **not**
//!   check whether another page already maps the same frame; two pages may
//!   alias one frame.
//! - The walk distinguishes *fault-class* failures (no table, no usable
//!   entry) from permission and range failures, see
//!   [`TranslateError::is_page_fault`].

use crate::page_table::{PageDirectory, PtEntry, TableAllocError, split_indices};
use crate::{Access, Flags, FrameAlloc};
use pagesim_addresses::{PhysicalAddress, PhysicalFrame, VirtualAddress, VirtualPage};

/// Handle to a single, concrete address space.
#[derive(Debug, Default)]
pub struct AddressSpace {
    directory: PageDirectory,
}

/// Error returned by [`AddressSpace::map_one`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressSpaceMapOneError {
    #[error(transparent)]
    OutOfMemory(#[from] TableAllocError),
}

/// Error returned by [`AddressSpace::unmap_one`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressSpaceUnmapError {
    #[error("no page table covers page {0}")]
    MissingTable(VirtualPage),
}

/// Error returned by [`AddressSpace::query`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    #[error("virtual address {0} exceeds the address space")]
    OutOfRange(VirtualAddress),
    #[error("no page table covers page {0}")]
    MissingTable(VirtualPage),
    #[error("page {0} is not mapped")]
    NotPresent(VirtualPage),
    #[error("{access} permission denied at {va}")]
    PermissionDenied { va: VirtualAddress, access: Access },
    #[error("physical address {0} outside the physical store")]
    PhysicalOutOfRange(PhysicalAddress),
}

impl TranslateError {
    /// Whether demand paging may resolve this failure.
    ///
    /// True only for a missing level-1 slot or an unusable leaf entry.
    #[inline]
    #[must_use]
    pub const fn is_page_fault(&self) -> bool {
        self.faulting_page().is_some()
    }

    /// The page demand paging would have to back, for fault-class failures.
    #[inline]
    #[must_use]
    pub const fn faulting_page(&self) -> Option<VirtualPage> {
        match self {
            Self::MissingTable(page) | Self::NotPresent(page) => Some(*page),
            Self::OutOfRange(_) | Self::PermissionDenied { .. } | Self::PhysicalOutOfRange(_) => None,
        }
    }
}

impl AddressSpace {
    /// Create an empty address space; no page is mapped.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            directory: PageDirectory::new(),
        }
    }

    /// Map `page → frame` with `flags | VALID`.
    ///
    /// - Creates the level-2 table if this is the first mapping under the
    ///   page's level-1 slot.
    /// - Overwrites any previous entry.
    /// - Marks `frame` used in `alloc`, unconditionally.
    ///
    /// # Errors
    /// - [`AddressSpaceMapOneError::OutOfMemory`] if the level-2 table cannot
    ///   be allocated. Nothing is modified in that case.
    pub fn map_one<A: FrameAlloc>(
        &mut self,
        alloc: &mut A,
        page: VirtualPage,
        frame: PhysicalFrame,
        flags: Flags,
    ) -> Result<(), AddressSpaceMapOneError> {
        let (i1, i2) = split_indices(page);
        let table = self.directory.ensure_table(i1)?;
        table.set(i2, PtEntry::make(frame, flags));
        alloc.mark_used(frame);
        log::trace!("mapped page {page} -> frame {frame} ({flags:?})");
        Ok(())
    }

    /// Clear the mapping of `page`, releasing its frame to `alloc`.
    ///
    /// Returns the frame that was released, if the entry had one. Unmapping
    /// an already-unmapped page under an existing table succeeds.
    ///
    /// # Errors
    /// - [`AddressSpaceUnmapError::MissingTable`] if nothing was ever mapped
    ///   under the page's level-1 slot.
    pub fn unmap_one<A: FrameAlloc>(
        &mut self,
        alloc: &mut A,
        page: VirtualPage,
    ) -> Result<Option<PhysicalFrame>, AddressSpaceUnmapError> {
        let (i1, i2) = split_indices(page);
        let Some(table) = self.directory.table_mut(i1) else {
            return Err(AddressSpaceUnmapError::MissingTable(page));
        };

        let released = table.get(i2).frame();
        if let Some(frame) = released {
            alloc.free_frame(frame);
        }
        table.set(i2, PtEntry::zero());
        log::trace!("unmapped page {page} (released frame {released:?})");
        Ok(released)
    }

    /// The leaf entry for `page`, if its level-2 table exists.
    #[inline]
    #[must_use]
    pub fn entry(&self, page: VirtualPage) -> Option<PtEntry> {
        let (i1, i2) = split_indices(page);
        self.directory.table(i1).map(|t| t.get(i2))
    }

    /// Translate `va` for an access in direction `access`.
    ///
    /// # Errors
    /// - [`TranslateError::OutOfRange`] if `va >= 0x100000`.
    /// - [`TranslateError::MissingTable`] if the level-1 slot is absent.
    /// - [`TranslateError::NotPresent`] if the entry is invalid or unassigned.
    /// - [`TranslateError::PermissionDenied`] if the entry lacks the flag
    ///   `access` needs.
    /// - [`TranslateError::PhysicalOutOfRange`] if the resulting address is
    ///   outside the physical store.
    pub fn query(&self, va: VirtualAddress, access: Access) -> Result<PhysicalAddress, TranslateError> {
        let Some((page, offset)) = va.split() else {
            return Err(TranslateError::OutOfRange(va));
        };

        let (i1, i2) = split_indices(page);
        let table = self
            .directory
            .table(i1)
            .ok_or(TranslateError::MissingTable(page))?;

        let (frame, flags) = table
            .get(i2)
            .mapping()
            .ok_or(TranslateError::NotPresent(page))?;

        if !flags.contains(access.required_flag()) {
            return Err(TranslateError::PermissionDenied { va, access });
        }

        let pa = frame.join(offset);
        if !pa.is_valid() {
            return Err(TranslateError::PhysicalOutOfRange(pa));
        }
        Ok(pa)
    }

    /// Number of level-2 tables currently allocated.
    #[inline]
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.directory.table_count()
    }

    /// Release every level-2 table. Frames are not touched.
    pub fn clear(&mut self) {
        self.directory.clear();
        log::trace!("released all level-2 tables");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records frame traffic so tests can check what the address space asked for.
    struct RecordingAlloc {
        used: [bool; 256],
        freed: std::vec::Vec<PhysicalFrame>,
    }

    impl Default for RecordingAlloc {
        fn default() -> Self {
            Self {
                used: [false; 256],
                freed: std::vec::Vec::new(),
            }
        }
    }

    impl FrameAlloc for RecordingAlloc {
        fn alloc_frame(&mut self) -> Option<PhysicalFrame> {
            let frame = PhysicalFrame::all().find(|f| !self.used[f.as_usize()])?;
            self.used[frame.as_usize()] = true;
            Some(frame)
        }

        fn free_frame(&mut self, frame: PhysicalFrame) {
            self.used[frame.as_usize()] = false;
            self.freed.push(frame);
        }

        fn mark_used(&mut self, frame: PhysicalFrame) {
            self.used[frame.as_usize()] = true;
        }

        fn is_used(&self, frame: PhysicalFrame) -> bool {
            self.used[frame.as_usize()]
        }

        fn used_count(&self) -> usize {
            self.used.iter().filter(|u| **u).count()
        }

        fn release_all(&mut self) {
            self.used = [false; 256];
        }
    }

    fn page(n: u16) -> VirtualPage {
        VirtualPage::from_index(n).unwrap()
    }

    fn frame(n: u16) -> PhysicalFrame {
        PhysicalFrame::from_index(n).unwrap()
    }

    #[test]
    fn map_one_creates_table_and_leaf() {
        let mut alloc = RecordingAlloc::default();
        let mut aspace = AddressSpace::new();

        aspace
            .map_one(&mut alloc, page(0xAB), frame(52), Flags::READ_WRITE)
            .expect("map_one");

        assert_eq!(aspace.table_count(), 1);
        assert!(alloc.is_used(frame(52)));
        let (f, flags) = aspace.entry(page(0xAB)).unwrap().mapping().unwrap();
        assert_eq!(f, frame(52));
        assert_eq!(flags, Flags::VALID | Flags::READ_WRITE);

        let pa = aspace
            .query(VirtualAddress::new(0x0A_B300), Access::Write)
            .unwrap();
        assert_eq!(pa.as_u32(), 52 * 4096 + 0x300);
    }

    #[test]
    fn query_reports_missing_table_then_not_present() {
        let mut alloc = RecordingAlloc::default();
        let mut aspace = AddressSpace::new();

        let va = VirtualAddress::new(0x00_5000);
        assert_eq!(
            aspace.query(va, Access::Read),
            Err(TranslateError::MissingTable(page(0x05)))
        );

        aspace
            .map_one(&mut alloc, page(0x04), frame(1), Flags::READ)
            .unwrap();
        assert_eq!(
            aspace.query(va, Access::Read),
            Err(TranslateError::NotPresent(page(0x05)))
        );
        assert!(aspace.query(va, Access::Read).unwrap_err().is_page_fault());
    }

    #[test]
    fn only_fault_class_failures_name_a_page() {
        let va = VirtualAddress::new(0x00_1032);
        assert_eq!(
            TranslateError::MissingTable(page(0x01)).faulting_page(),
            Some(page(0x01))
        );
        assert_eq!(
            TranslateError::NotPresent(page(0xAB)).faulting_page(),
            Some(page(0xAB))
        );
        assert_eq!(TranslateError::OutOfRange(va).faulting_page(), None);
        assert_eq!(
            TranslateError::PermissionDenied {
                va,
                access: Access::Read
            }
            .faulting_page(),
            None
        );
        assert_eq!(
            TranslateError::PhysicalOutOfRange(PhysicalAddress::new(0x10_0000)).faulting_page(),
            None
        );
    }

    #[test]
    fn query_enforces_direction() {
        let mut alloc = RecordingAlloc::default();
        let mut aspace = AddressSpace::new();
        aspace
            .map_one(&mut alloc, page(0x01), frame(20), Flags::READ)
            .unwrap();
        aspace
            .map_one(&mut alloc, page(0x02), frame(21), Flags::WRITE)
            .unwrap();

        let ro = VirtualAddress::new(0x00_1032);
        let wo = VirtualAddress::new(0x00_2100);
        assert!(aspace.query(ro, Access::Read).is_ok());
        let denied = aspace.query(ro, Access::Write).unwrap_err();
        assert_eq!(
            denied,
            TranslateError::PermissionDenied {
                va: ro,
                access: Access::Write
            }
        );
        assert!(!denied.is_page_fault());

        assert!(aspace.query(wo, Access::Write).is_ok());
        assert!(matches!(
            aspace.query(wo, Access::Read),
            Err(TranslateError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn query_rejects_out_of_range_even_when_mapped() {
        let mut alloc = RecordingAlloc::default();
        let mut aspace = AddressSpace::new();
        aspace
            .map_one(&mut alloc, page(0x00), frame(0), Flags::READ_WRITE)
            .unwrap();

        let va = VirtualAddress::new(0x10_0000);
        let err = aspace.query(va, Access::Read).unwrap_err();
        assert_eq!(err, TranslateError::OutOfRange(va));
        assert!(!err.is_page_fault());
    }

    #[test]
    fn unmap_releases_frame_and_is_idempotent() {
        let mut alloc = RecordingAlloc::default();
        let mut aspace = AddressSpace::new();
        aspace
            .map_one(&mut alloc, page(0x06), frame(40), Flags::READ_WRITE)
            .unwrap();

        assert_eq!(aspace.unmap_one(&mut alloc, page(0x06)), Ok(Some(frame(40))));
        assert!(!alloc.is_used(frame(40)));
        assert_eq!(aspace.entry(page(0x06)), Some(PtEntry::zero()));

        // already unmapped, table still there
        assert_eq!(aspace.unmap_one(&mut alloc, page(0x06)), Ok(None));
        assert_eq!(alloc.freed, [frame(40)]);

        // never touched slot
        assert_eq!(
            aspace.unmap_one(&mut alloc, page(0x70)),
            Err(AddressSpaceUnmapError::MissingTable(page(0x70)))
        );
    }

    #[test]
    fn remap_overwrites_and_may_alias() {
        let mut alloc = RecordingAlloc::default();
        let mut aspace = AddressSpace::new();
        aspace
            .map_one(&mut alloc, page(0x10), frame(9), Flags::READ)
            .unwrap();
        aspace
            .map_one(&mut alloc, page(0x10), frame(9), Flags::WRITE)
            .unwrap();
        aspace
            .map_one(&mut alloc, page(0x11), frame(9), Flags::READ)
            .unwrap();

        let e = aspace.entry(page(0x10)).unwrap();
        assert_eq!(e.flags(), Flags::VALID | Flags::WRITE);
        assert_eq!(aspace.entry(page(0x11)).unwrap().frame(), Some(frame(9)));
        assert_eq!(alloc.used_count(), 1);
    }

    #[test]
    fn clear_drops_all_tables() {
        let mut alloc = RecordingAlloc::default();
        let mut aspace = AddressSpace::new();
        for n in [0x00, 0x1F, 0xAB] {
            aspace
                .map_one(&mut alloc, page(n), frame(n), Flags::READ_WRITE)
                .unwrap();
        }
        assert_eq!(aspace.table_count(), 3);
        aspace.clear();
        assert_eq!(aspace.table_count(), 0);
        assert!(matches!(
            aspace.query(VirtualAddress::new(0x01_F000), Access::Read),
            Err(TranslateError::MissingTable(_))
        ));
    }
}
