//! # Simulated Virtual Memory
//!
//! Two-level page tables for the simulated 1 MiB machine.
//!
//! ## What you get
//! - An [`address space`](address_space) owning the level-1 table and its
//!   lazily created level-2 tables.
//! - Per-page permission [`Flags`] (`VALID`, `WRITE`, `READ`).
//! - A packed 16-bit [`PageEntryBits`] and the typed [`PtEntry`] built on it.
//! - The [`FrameAlloc`] seam through which mappings claim and release
//!   physical frames.
//!
//! ## Virtual Address → Physical Address Walk
//!
//! Each 20-bit virtual address is divided into three fields:
//!
//! ```text
//! | 19‒16 | 15‒12 | 11‒0   |
//! |  L1   |  L2   | Offset |
//! ```
//!
//! ```text
//!  PageDirectory (L1)  →  PageTable (L2)  →  Physical Frame
//!        │                     │
//!        │                     └───► PTE: frame index + flags → maps one 4 KiB frame
//!        └─────────────────────────► slot: absent, or owns exactly one PageTable
//! ```
//!
//! | Level | Table | Entries | Description |
//! |:------|:------|:--------|:------------|
//! | 1 | [`PageDirectory`] | 16 | Optional, exclusively owned level-2 tables, created on first mapping. |
//! | 2 | [`PageTable`] | 16 | Leaf entries; each maps one 4 KiB page to one frame. |
//!
//! A walk fails with a *fault-class* error ([`TranslateError::is_page_fault`])
//! when the level-1 slot is absent or the leaf is not usable. Permission and
//! range violations are reported separately and never qualify for demand
//! paging.

#![cfg_attr(not(test), no_std)]

pub mod address_space;
mod page_entry_bits;
pub mod page_table;

extern crate alloc;

pub use crate::address_space::{
    AddressSpace, AddressSpaceMapOneError, AddressSpaceUnmapError, TranslateError,
};
pub use crate::page_entry_bits::PageEntryBits;
pub use crate::page_table::{L1Index, L2Index, PageDirectory, PageTable, PtEntry, TableAllocError};

/// Re-export the machine layout and address types.
pub use pagesim_addresses as addresses;

use core::fmt;
use pagesim_addresses::PhysicalFrame;

bitflags::bitflags! {
    /// Page table entry flags.
    ///
    /// The bit values are part of the external interface and match the
    /// low three bits of [`PageEntryBits`].
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
    pub struct Flags: u8 {
        /// Entry holds a usable translation.
        ///
        /// Always set by a mapping; callers may pass it or leave it out.
        const VALID = 0x01;

        /// Page may be written.
        const WRITE = 0x02;

        /// Page may be read.
        const READ  = 0x04;

        /// Readable and writable; what demand paging installs.
        const READ_WRITE = Self::READ.bits() | Self::WRITE.bits();
    }
}

/// Direction of a memory access.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Access {
    Read,
    Write,
}

impl Access {
    /// The permission flag an entry must carry to allow this access.
    #[inline]
    #[must_use]
    pub const fn required_flag(self) -> Flags {
        match self {
            Self::Read => Flags::READ,
            Self::Write => Flags::WRITE,
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
        })
    }
}

/// Tracks which physical frames are in use.
///
/// The implementation decides how frames are tracked (bitmap, free list, a
/// capped pool in tests). [`alloc_frame`](Self::alloc_frame) must hand out the
/// **first free frame in index order** so that runs are deterministic.
///
/// Allocation only claims the index; zeroing the frame contents is the
/// caller's job because the allocator does not own the physical store.
pub trait FrameAlloc {
    /// Claim the lowest free frame. Returns `None` on out-of-memory.
    fn alloc_frame(&mut self) -> Option<PhysicalFrame>;

    /// Return a frame to the pool. Freeing a free frame is a no-op.
    fn free_frame(&mut self, frame: PhysicalFrame);

    /// Mark a frame used without choosing it, e.g. for an explicit mapping.
    ///
    /// Does not check prior occupancy.
    fn mark_used(&mut self, frame: PhysicalFrame);

    fn is_used(&self, frame: PhysicalFrame) -> bool;

    /// Number of frames currently in use.
    fn used_count(&self) -> usize;

    /// Return every frame to the pool.
    fn release_all(&mut self);
}
