//! # Simulated Memory Allocation and Demand Paging
//!
//! This crate ties the page tables of `pagesim-vmem` to a simulated physical
//! store and turns them into a working machine: byte-granular reads and
//! writes, first-free frame allocation with zero-fill, and a page-fault
//! handler that backs untouched pages on first access.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              Memory Manager ([`Vmm`])               │
//! │    • read_byte / write_byte                         │
//! │    • demand paging, single retry                    │
//! │    • counters and snapshots                         │
//! └─────────────────┬───────────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────────┐
//! │        Address Space (pagesim-vmem)                 │
//! │    • 16 × 16 two-level tables                       │
//! │    • permission checks                              │
//! └─────────────────┬───────────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────────┐
//! │   Frame Allocator + Physical Store                  │
//! │    • 256 frames of 4 KiB, bitmap tracked            │
//! │    • 1 MiB byte array                               │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Core Components
//!
//! ### Frame Allocator ([`frame_alloc`])
//!
//! Bitmap over all 256 frames. Allocation always returns the lowest free
//! frame, so runs are reproducible.
//!
//! ### Physical Store ([`physical_store`])
//!
//! The 1 MiB of simulated RAM. Reads and writes are bounds checked; the
//! store knows nothing about pages or permissions.
//!
//! ### Memory Manager ([`vmm`])
//!
//! Owns one instance of everything above plus the [`stats`] counters. A
//! translation that fails because the level-2 table or the leaf entry is
//! missing triggers the fault handler exactly once; permission and range
//! failures are reported to the caller unchanged.
//!
//! ## Usage
//!
//! ```rust
//! use pagesim_alloc::{Flags, Vmm};
//!
//! let mut vmm = Vmm::new();
//! vmm.map(0x01, 20, Flags::READ).unwrap();
//! assert!(vmm.write_byte(0x00_1032, 0xDD).is_err());
//!
//! vmm.write_byte(0x00_5000, 0xBB).unwrap();
//! println!("{}", vmm.stats());
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

pub mod frame_alloc;
pub mod physical_store;
pub mod stats;
pub mod vmm;

extern crate alloc;

pub use crate::frame_alloc::BitmapFrameAlloc;
pub use crate::physical_store::PhysicalStore;
pub use crate::stats::StatsSnapshot;
pub use crate::vmm::{VmError, Vmm};
pub use pagesim_vmem::{Access, Flags, FrameAlloc, TranslateError};

/// Re-export the machine layout and address types.
pub use pagesim_vmem::addresses;
