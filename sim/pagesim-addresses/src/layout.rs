//! # Machine Layout
//!
//! Fixed geometry of the simulated machine. None of these values are
//! configurable at runtime; the rest of the workspace derives its table
//! sizes and bounds checks from them.
//!
//! ```text
//! virtual:   0x00000 ┌──────────────────────────┐
//!                    │ 16 L1 slots × 16 pages   │  256 pages × 4 KiB
//!            0xFFFFF └──────────────────────────┘
//!
//! physical:  0x00000 ┌──────────────────────────┐
//!                    │ 256 frames × 4 KiB       │  1 MiB store
//!            0xFFFFF └──────────────────────────┘
//! ```

/// Number of offset bits inside a page.
pub const PAGE_SHIFT: u32 = 12;

/// Page and frame size in bytes (4 KiB).
pub const PAGE_SIZE: usize = 1 << PAGE_SHIFT;

/// Mask selecting the in-page offset of an address.
pub const PAGE_OFFSET_MASK: u32 = (1 << PAGE_SHIFT) - 1;

/// Number of index bits consumed by each table level.
pub const LEVEL_BITS: u32 = 4;

/// Entries in the first-level table.
pub const L1_ENTRIES: usize = 1 << LEVEL_BITS;

/// Entries in each second-level table.
pub const L2_ENTRIES: usize = 1 << LEVEL_BITS;

/// Number of virtual pages (`L1_ENTRIES * L2_ENTRIES`).
pub const PAGE_COUNT: usize = L1_ENTRIES * L2_ENTRIES;

/// Size of the virtual address space in bytes; valid addresses are `< 0x100000`.
pub const ADDRESS_SPACE_SIZE: u32 = 0x10_0000;

/// Size of the physical store in bytes (1 MiB).
pub const PHYSICAL_STORE_SIZE: usize = 1 << 20;

/// Number of physical frames.
pub const FRAME_COUNT: usize = PHYSICAL_STORE_SIZE / PAGE_SIZE;

const _: () = assert!(PAGE_COUNT * PAGE_SIZE == ADDRESS_SPACE_SIZE as usize);
const _: () = assert!(FRAME_COUNT == 256 && PAGE_COUNT == 256);
const _: () = assert!(FRAME_COUNT <= u8::MAX as usize + 1, "frame index must fit in u8");
