//! # Simulated Address Types
//!
//! Strongly typed wrappers for the addresses, pages and frames of the
//! simulated 1 MiB machine.
//!
//! ## Overview
//!
//! The simulator uses one fixed geometry (see [`layout`]): a 20-bit virtual
//! address space split into 4 KiB pages, backed by 256 physical frames of
//! 4 KiB each. The types in this crate keep virtual and physical quantities
//! apart at compile time while remaining zero-cost wrappers around plain
//! integers.
//!
//! | Type | Meaning |
//! |------|---------|
//! | [`VirtualAddress`] | Raw 20-bit virtual address (range checked on translation). |
//! | [`VirtualPage`] | Virtual page number, always in `0..256`. |
//! | [`PageOffset`] | Byte offset inside a 4 KiB page. |
//! | [`PhysicalFrame`] | Physical frame index, always in `0..256`. |
//! | [`PhysicalAddress`] | Byte address into the physical store. |
//!
//! ## Virtual address layout
//!
//! ```text
//! | 19‒16 | 15‒12 | 11‒0   |
//! |  L1   |  L2   | Offset |
//! ```
//!
//! The two index fields together form the [`VirtualPage`] number
//! (`l1 * 16 + l2`).
//!
//! ## Typical Usage
//!
//! ```rust
//! # use pagesim_addresses::*;
//! let va = VirtualAddress::new(0x0AB_300);
//! let (page, off) = va.split().unwrap();
//! assert_eq!(page.l1(), 0xA);
//! assert_eq!(page.l2(), 0xB);
//! assert_eq!(off.as_u16(), 0x300);
//!
//! let frame = PhysicalFrame::from_index(52).unwrap();
//! assert_eq!(frame.join(off).as_u32(), 52 * 4096 + 0x300);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

pub mod layout;
mod page_offset;
mod physical_address;
mod physical_frame;
mod virtual_address;
mod virtual_page;

pub use crate::layout::*;
pub use crate::page_offset::PageOffset;
pub use crate::physical_address::PhysicalAddress;
pub use crate::physical_frame::PhysicalFrame;
pub use crate::virtual_address::VirtualAddress;
pub use crate::virtual_page::VirtualPage;
