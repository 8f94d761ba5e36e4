use crate::Flags;
use bitfield_struct::bitfield;
use pagesim_addresses::PhysicalFrame;

/// A single 16-bit page table entry in its raw bitfield form.
///
/// The low three bits carry the permission [`Flags`] with the same values as
/// the external interface, so an entry can be built from and inspected as a
/// flag set without masking by hand.
///
/// ### Bit layout
///
/// | Bits  | Name             | Meaning |
/// |-------|------------------|---------|
/// | 0     | `valid`          | Entry may be used for translation |
/// | 1     | `writable`       | Writes allowed |
/// | 2     | `readable`       | Reads allowed |
/// | 3     | `frame_assigned` | `frame` holds a real frame index |
/// | 4–7   | reserved         | Always zero |
/// | 8–15  | `frame`          | Physical frame index |
///
/// ### Notes
/// - An entry is usable only if **both** `valid` and `frame_assigned` are set;
///   otherwise the remaining bits are meaningless.
/// - The all-zero value is the unassigned, invalid entry.
///
/// ### Example
/// ```rust
/// # use pagesim_vmem::{Flags, PageEntryBits};
/// # use pagesim_vmem::addresses::PhysicalFrame;
/// let frame = PhysicalFrame::from_index(7).unwrap();
/// let e = PageEntryBits::from_flags(Flags::READ).with_assigned_frame(frame);
/// assert!(e.readable());
/// assert!(!e.writable());
/// assert_eq!(e.assigned_frame(), Some(frame));
/// ```
#[bitfield(u16)]
#[derive(PartialEq, Eq)]
pub struct PageEntryBits {
    /// Valid (bit 0).
    ///
    /// Set if the entry holds a translation. Clear implies a fault on access.
    pub valid: bool,

    /// Writable (bit 1).
    pub writable: bool,

    /// Readable (bit 2).
    pub readable: bool,

    /// Frame assigned (bit 3).
    ///
    /// Clear means the `frame` field is not a frame index.
    pub frame_assigned: bool,

    #[bits(4)]
    __reserved: u8,

    /// Physical frame index (bits 8..=15).
    frame: u8,
}

impl PageEntryBits {
    /// Entry bits with exactly the permission bits of `flags` set.
    #[inline]
    #[must_use]
    pub const fn from_flags(flags: Flags) -> Self {
        Self::new()
            .with_valid(flags.contains(Flags::VALID))
            .with_writable(flags.contains(Flags::WRITE))
            .with_readable(flags.contains(Flags::READ))
    }

    /// The permission bits as a flag set.
    #[inline]
    #[must_use]
    pub const fn flags(&self) -> Flags {
        let mut flags = Flags::empty();
        if self.valid() {
            flags = flags.union(Flags::VALID);
        }
        if self.writable() {
            flags = flags.union(Flags::WRITE);
        }
        if self.readable() {
            flags = flags.union(Flags::READ);
        }
        flags
    }

    #[inline]
    #[must_use]
    pub const fn with_assigned_frame(self, frame: PhysicalFrame) -> Self {
        self.with_frame_assigned(true).with_frame(frame.as_u8())
    }

    #[inline]
    #[must_use]
    pub const fn assigned_frame(&self) -> Option<PhysicalFrame> {
        if self.frame_assigned() {
            Some(PhysicalFrame::from_u8(self.frame()))
        } else {
            None
        }
    }
}
