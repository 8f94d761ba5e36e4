//! Demand-paging virtual memory manager.
//!
//! [`Vmm`] owns every piece of one simulated machine: the address space, the
//! frame usage table, the physical store and the statistics. All operations
//! take `&mut self`; two instances never share state.
//!
//! # Example
//! ```
//! use pagesim_alloc::{Flags, Vmm, VmError};
//!
//! let mut vmm = Vmm::new();
//! vmm.map(0x00, 42, Flags::READ_WRITE)?;
//! vmm.write_byte(0x00_0510, 0xAB)?;
//! assert_eq!(vmm.read_byte(0x00_0510)?, 0xAB);
//!
//! // untouched page: served by demand paging
//! vmm.write_byte(0x01_00AB, 0xDE)?;
//! assert_eq!(vmm.stats().page_faults, 1);
//! # Ok::<(), VmError>(())
//! ```

use crate::frame_alloc::BitmapFrameAlloc;
use crate::physical_store::PhysicalStore;
use crate::stats::{StatsSnapshot, VmStats};
use pagesim_addresses::{
    FRAME_COUNT, PhysicalAddress, PhysicalFrame, VirtualAddress, VirtualPage,
};
use pagesim_vmem::{
    Access, AddressSpace, AddressSpaceMapOneError, AddressSpaceUnmapError, Flags, FrameAlloc,
    TranslateError,
};

#[allow(clippy::cast_possible_truncation)]
const FRAMES_TOTAL: u32 = FRAME_COUNT as u32;

/// Caller-facing error taxonomy of the memory manager.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VmError {
    #[error("address or index out of range")]
    OutOfRange,
    #[error("no valid mapping")]
    Unmapped,
    #[error("permission denied")]
    PermissionDenied,
    #[error("out of memory")]
    OutOfMemory,
}

/// One simulated machine: address space, frames, store and counters.
#[derive(Debug)]
pub struct Vmm<A: FrameAlloc = BitmapFrameAlloc> {
    aspace: AddressSpace,
    alloc: A,
    store: PhysicalStore,
    stats: VmStats,
}

impl Vmm<BitmapFrameAlloc> {
    /// Create a freshly initialised machine: nothing mapped, all frames free,
    /// zeroed store and counters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_allocator(BitmapFrameAlloc::new())
    }
}

impl Default for Vmm<BitmapFrameAlloc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: FrameAlloc> Vmm<A> {
    /// Create a machine whose frame usage is tracked by `alloc`.
    ///
    /// The allocator is used as given; frames it already reports as used stay
    /// unavailable to demand paging.
    #[must_use]
    pub fn with_allocator(alloc: A) -> Self {
        Self {
            aspace: AddressSpace::new(),
            alloc,
            store: PhysicalStore::new(),
            stats: VmStats::new(),
        }
    }

    /// Return to the freshly initialised state.
    pub fn reset(&mut self) {
        self.aspace.clear();
        self.alloc.release_all();
        self.store.clear();
        self.stats = VmStats::new();
    }

    /// Release every level-2 table and return every frame to the allocator.
    ///
    /// Counters are kept so the final numbers can still be reported. The
    /// instance stays usable; later accesses fault in fresh frames.
    pub fn teardown(&mut self) {
        let tables = self.aspace.table_count();
        self.aspace.clear();
        self.alloc.release_all();
        log::trace!("teardown released {tables} level-2 tables");
    }

    /// Map virtual page `page` to physical frame `frame` with `flags | VALID`.
    ///
    /// The frame is marked used without checking whether another page
    /// already maps it.
    ///
    /// # Errors
    /// - [`VmError::OutOfRange`] if `page >= 256` or `frame >= 256`; nothing
    ///   is modified.
    /// - [`VmError::OutOfMemory`] if the level-2 table cannot be allocated.
    pub fn map(&mut self, page: u16, frame: u16, flags: Flags) -> Result<(), VmError> {
        let Some(vp) = VirtualPage::from_index(page) else {
            log::warn!("virtual page {page:#x} out of range");
            return Err(VmError::OutOfRange);
        };
        let Some(pf) = PhysicalFrame::from_index(frame) else {
            log::warn!("physical frame {frame} out of range");
            return Err(VmError::OutOfRange);
        };
        self.aspace.map_one(&mut self.alloc, vp, pf, flags)?;
        Ok(())
    }

    /// Remove the mapping of virtual page `page` and free its frame.
    ///
    /// Unmapping an already-unmapped page is a no-op.
    ///
    /// # Errors
    /// - [`VmError::OutOfRange`] if `page >= 256`.
    /// - [`VmError::Unmapped`] if nothing was ever mapped under the page's
    ///   level-1 slot.
    pub fn unmap(&mut self, page: u16) -> Result<(), VmError> {
        let vp = VirtualPage::from_index(page).ok_or(VmError::OutOfRange)?;
        self.aspace.unmap_one(&mut self.alloc, vp)?;
        Ok(())
    }

    /// Translate `va` for an access in direction `access`.
    ///
    /// Every failure, whatever its kind, counts as one translation failure.
    /// No demand paging happens here.
    ///
    /// # Errors
    /// See [`AddressSpace::query`].
    pub fn translate(
        &mut self,
        va: u32,
        access: Access,
    ) -> Result<PhysicalAddress, TranslateError> {
        let va = VirtualAddress::new(va);
        let result = self.aspace.query(va, access);
        if let Err(err) = &result {
            self.stats.translation_failures = self.stats.translation_failures.saturating_add(1);
            match err {
                TranslateError::OutOfRange(_) | TranslateError::PhysicalOutOfRange(_) => {
                    log::warn!("{err}");
                }
                TranslateError::PermissionDenied {
                    access: Access::Write,
                    ..
                } => log::warn!("{err}"),
                _ => log::trace!("{err}"),
            }
        }
        result
    }

    /// Claim the lowest free frame and zero-fill it.
    ///
    /// # Errors
    /// [`VmError::OutOfMemory`] if every frame is in use.
    pub fn allocate_frame(&mut self) -> Result<PhysicalFrame, VmError> {
        let frame = self.alloc.alloc_frame().ok_or(VmError::OutOfMemory)?;
        self.store.zero_frame(frame);
        Ok(frame)
    }

    /// Mark `frame` free. Its contents are left as they are.
    pub fn free_frame(&mut self, frame: PhysicalFrame) {
        self.alloc.free_frame(frame);
    }

    /// Serve a fault on `page` with a fresh read-write frame.
    fn handle_page_fault(&mut self, page: VirtualPage) -> Result<(), VmError> {
        self.stats.page_faults = self.stats.page_faults.saturating_add(1);
        log::debug!("page fault: virtual page {page}");

        let frame = self.allocate_frame().inspect_err(|_| {
            log::warn!("out of physical memory serving page {page}");
        })?;
        log::debug!("allocated physical frame {frame} for page {page}");

        if let Err(err) = self
            .aspace
            .map_one(&mut self.alloc, page, frame, Flags::READ_WRITE)
        {
            self.alloc.free_frame(frame);
            return Err(err.into());
        }
        Ok(())
    }

    /// Translate, taking one demand-paging retry on a fault-class failure.
    fn resolve(&mut self, va: u32, access: Access) -> Result<PhysicalAddress, VmError> {
        let err = match self.translate(va, access) {
            Ok(pa) => return Ok(pa),
            Err(err) => err,
        };
        let Some(page) = err.faulting_page() else {
            return Err(err.into());
        };
        self.handle_page_fault(page)?;
        Ok(self.translate(va, access)?)
    }

    /// Read one byte at virtual address `va`.
    ///
    /// An unmapped page is faulted in (zero-filled, read-write) first.
    ///
    /// # Errors
    /// [`VmError::OutOfRange`], [`VmError::PermissionDenied`] or
    /// [`VmError::OutOfMemory`]; the store is never touched on failure.
    pub fn read_byte(&mut self, va: u32) -> Result<u8, VmError> {
        let pa = self.resolve(va, Access::Read)?;
        let value = self.store.read(pa).ok_or(VmError::OutOfRange)?;
        self.stats.reads = self.stats.reads.saturating_add(1);
        Ok(value)
    }

    /// Write one byte at virtual address `va`.
    ///
    /// An unmapped page is faulted in (zero-filled, read-write) first.
    ///
    /// # Errors
    /// [`VmError::OutOfRange`], [`VmError::PermissionDenied`] or
    /// [`VmError::OutOfMemory`]; the store is never touched on failure.
    pub fn write_byte(&mut self, va: u32, value: u8) -> Result<(), VmError> {
        let pa = self.resolve(va, Access::Write)?;
        if !self.store.write(pa, value) {
            return Err(VmError::OutOfRange);
        }
        self.stats.writes = self.stats.writes.saturating_add(1);
        Ok(())
    }

    /// Counters plus current frame usage.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        let used = u32::try_from(self.alloc.used_count()).unwrap_or(FRAMES_TOTAL);
        self.stats.snapshot(used, FRAMES_TOTAL)
    }

    /// The frame and flags `page` currently translates through, if any.
    #[must_use]
    pub fn mapping(&self, page: VirtualPage) -> Option<(PhysicalFrame, Flags)> {
        self.aspace.entry(page)?.mapping()
    }

    #[must_use]
    pub fn frame_in_use(&self, frame: PhysicalFrame) -> bool {
        self.alloc.is_used(frame)
    }

    #[must_use]
    pub const fn address_space(&self) -> &AddressSpace {
        &self.aspace
    }

    #[must_use]
    pub const fn physical_store(&self) -> &PhysicalStore {
        &self.store
    }

    /// Direct access to the store, bypassing translation and counters.
    pub const fn physical_store_mut(&mut self) -> &mut PhysicalStore {
        &mut self.store
    }
}

impl From<TranslateError> for VmError {
    fn from(value: TranslateError) -> Self {
        match value {
            TranslateError::OutOfRange(_) | TranslateError::PhysicalOutOfRange(_) => {
                Self::OutOfRange
            }
            TranslateError::MissingTable(_) | TranslateError::NotPresent(_) => Self::Unmapped,
            TranslateError::PermissionDenied { .. } => Self::PermissionDenied,
        }
    }
}

impl From<AddressSpaceMapOneError> for VmError {
    fn from(value: AddressSpaceMapOneError) -> Self {
        match value {
            AddressSpaceMapOneError::OutOfMemory(_) => Self::OutOfMemory,
        }
    }
}

impl From<AddressSpaceUnmapError> for VmError {
    fn from(value: AddressSpaceUnmapError) -> Self {
        match value {
            AddressSpaceUnmapError::MissingTable(_) => Self::Unmapped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(n: u16) -> VirtualPage {
        VirtualPage::from_index(n).unwrap()
    }

    fn frame(n: u16) -> PhysicalFrame {
        PhysicalFrame::from_index(n).unwrap()
    }

    #[test]
    fn fault_counts_one_failure_and_one_fault() {
        let mut vmm = Vmm::new();
        vmm.write_byte(0x00_5000, 0xBB).unwrap();

        let s = vmm.stats();
        assert_eq!(s.page_faults, 1);
        assert_eq!(s.translation_failures, 1);
        assert_eq!(s.writes, 1);
        assert_eq!(s.frames_used, 1);
        assert_eq!(vmm.mapping(page(0x05)), Some((frame(0), Flags::VALID | Flags::READ_WRITE)));
    }

    #[test]
    fn permission_failure_never_faults() {
        let mut vmm = Vmm::new();
        vmm.map(0x01, 20, Flags::READ).unwrap();

        assert_eq!(vmm.write_byte(0x00_1032, 0xDD), Err(VmError::PermissionDenied));
        let s = vmm.stats();
        assert_eq!(s.page_faults, 0);
        assert_eq!(s.translation_failures, 1);
        assert_eq!(s.writes, 0);
    }

    #[test]
    fn out_of_range_never_faults() {
        let mut vmm = Vmm::new();
        assert_eq!(vmm.read_byte(0x20_0000), Err(VmError::OutOfRange));
        assert_eq!(vmm.stats().page_faults, 0);
        assert_eq!(vmm.stats().translation_failures, 1);
        assert_eq!(vmm.stats().frames_used, 0);
    }

    #[test]
    fn translate_does_not_fault_in_pages() {
        let mut vmm = Vmm::new();
        assert_eq!(
            vmm.translate(0x00_3000, Access::Read),
            Err(TranslateError::MissingTable(page(0x03)))
        );
        assert_eq!(vmm.stats().page_faults, 0);
        assert!(vmm.mapping(page(0x03)).is_none());
    }

    #[test]
    fn allocate_frame_zero_fills() {
        let mut vmm = Vmm::new();
        vmm.physical_store_mut().frame_mut(frame(0)).fill(0xEE);

        let f = vmm.allocate_frame().unwrap();
        assert_eq!(f, frame(0));
        assert!(vmm.physical_store().frame(f).iter().all(|b| *b == 0));
        assert!(vmm.frame_in_use(f));

        // free keeps the bytes
        vmm.physical_store_mut().frame_mut(f)[0] = 0x12;
        vmm.free_frame(f);
        assert!(!vmm.frame_in_use(f));
        assert_eq!(vmm.physical_store().frame(f)[0], 0x12);
    }

    #[test]
    fn teardown_releases_tables_and_frames_but_keeps_counters() {
        let mut vmm = Vmm::new();
        for va in [0x00_0000_u32, 0x01_F000, 0x0A_B000] {
            vmm.write_byte(va, 1).unwrap();
        }
        assert_eq!(vmm.address_space().table_count(), 3);

        vmm.teardown();
        assert_eq!(vmm.address_space().table_count(), 0);
        let s = vmm.stats();
        assert_eq!(s.frames_used, 0);
        assert_eq!(s.page_faults, 3);
        assert_eq!(s.writes, 3);

        vmm.read_byte(0x00_0000).unwrap();
        assert_eq!(vmm.stats().page_faults, 4);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut vmm = Vmm::new();
        vmm.map(0x00, 42, Flags::READ_WRITE).unwrap();
        vmm.write_byte(0x00_0510, 0xAB).unwrap();
        vmm.reset();

        assert_eq!(vmm.stats(), StatsSnapshot {
            frames_total: 256,
            ..StatsSnapshot::default()
        });
        assert_eq!(vmm.physical_store().read(frame(42).base()), Some(0));
        assert_eq!(vmm.unmap(0x00), Err(VmError::Unmapped));
    }
}
