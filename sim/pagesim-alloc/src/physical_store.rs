//! The simulated RAM: one contiguous 1 MiB byte buffer addressed by
//! [`PhysicalAddress`].

use alloc::boxed::Box;
use alloc::vec;
use pagesim_addresses::{PHYSICAL_STORE_SIZE, PhysicalAddress, PhysicalFrame};

/// Fixed-size byte buffer backing every frame.
pub struct PhysicalStore {
    bytes: Box<[u8]>,
}

impl PhysicalStore {
    /// A store with every byte zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bytes: vec![0u8; PHYSICAL_STORE_SIZE].into_boxed_slice(),
        }
    }

    /// Read one byte; `None` if `pa` is outside the store.
    #[inline]
    #[must_use]
    pub fn read(&self, pa: PhysicalAddress) -> Option<u8> {
        self.bytes.get(pa.as_usize()).copied()
    }

    /// Write one byte. Returns `false` (and writes nothing) if `pa` is
    /// outside the store.
    #[inline]
    pub fn write(&mut self, pa: PhysicalAddress, value: u8) -> bool {
        match self.bytes.get_mut(pa.as_usize()) {
            Some(b) => {
                *b = value;
                true
            }
            None => false,
        }
    }

    /// The bytes of one frame.
    #[inline]
    #[must_use]
    pub fn frame(&self, frame: PhysicalFrame) -> &[u8] {
        &self.bytes[frame.byte_range()]
    }

    /// Mutable view of one frame.
    #[inline]
    pub fn frame_mut(&mut self, frame: PhysicalFrame) -> &mut [u8] {
        &mut self.bytes[frame.byte_range()]
    }

    /// Zero-fill one frame.
    #[inline]
    pub fn zero_frame(&mut self, frame: PhysicalFrame) {
        self.frame_mut(frame).fill(0);
    }

    /// Zero-fill the whole store.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Default for PhysicalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for PhysicalStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PhysicalStore")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagesim_addresses::PageOffset;

    #[test]
    fn starts_zeroed() {
        let store = PhysicalStore::new();
        assert_eq!(store.len(), PHYSICAL_STORE_SIZE);
        assert_eq!(store.read(PhysicalAddress::new(0)), Some(0));
        assert_eq!(store.read(PhysicalAddress::new(0xF_FFFF)), Some(0));
    }

    #[test]
    fn rejects_addresses_past_the_end() {
        let mut store = PhysicalStore::new();
        let pa = PhysicalAddress::new(0x10_0000);
        assert_eq!(store.read(pa), None);
        assert!(!store.write(pa, 0xAA));
    }

    #[test]
    fn zero_frame_only_touches_that_frame() {
        let mut store = PhysicalStore::new();
        let f10 = PhysicalFrame::from_index(10).unwrap();
        let f11 = PhysicalFrame::from_index(11).unwrap();
        store.frame_mut(f10).fill(0x5A);
        assert!(store.write(f11.join(PageOffset::new(0)), 0x77));

        store.zero_frame(f10);
        assert!(store.frame(f10).iter().all(|b| *b == 0));
        assert_eq!(store.read(f11.base()), Some(0x77));
    }
}
