//! # Page Tables
//!
//! Both table levels of the simulated MMU.
//!
//! - [`pt`]: the level-2 [`PageTable`] of 16 leaf entries and its [`L2Index`].
//! - [`directory`]: the level-1 [`PageDirectory`] of 16 optional level-2
//!   tables and its [`L1Index`].

pub mod directory;
pub mod pt;

pub use crate::page_table::directory::{L1Index, PageDirectory, TableAllocError};
pub use crate::page_table::pt::{L2Index, PageTable, PtEntry};

use pagesim_addresses::VirtualPage;

/// Split a page number into its level-1 and level-2 indices.
#[inline]
#[must_use]
pub const fn split_indices(page: VirtualPage) -> (L1Index, L2Index) {
    (L1Index::from(page), L2Index::from(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_ok() {
        let page = VirtualPage::from_index(0x1F).unwrap();
        let (i1, i2) = split_indices(page);
        assert_eq!(i1.as_usize(), 0x1);
        assert_eq!(i2.as_usize(), 0xF);
    }
}
