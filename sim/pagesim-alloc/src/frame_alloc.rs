//! Bitmap physical frame allocator.
//!
//! One bit per frame; a set bit means "in use". Allocation scans for the
//! lowest clear bit so the first free frame in index order is always chosen.

use pagesim_addresses::{FRAME_COUNT, PhysicalFrame};
use pagesim_vmem::FrameAlloc;

const WORD_BITS: usize = u64::BITS as usize;
const WORDS: usize = FRAME_COUNT / WORD_BITS;

/// Frame usage table for the 256 frames of the physical store.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BitmapFrameAlloc {
    bitmap: [u64; WORDS],
}

impl BitmapFrameAlloc {
    /// All frames free.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bitmap: [0; WORDS],
        }
    }

    #[inline]
    const fn locate(frame: PhysicalFrame) -> (usize, u64) {
        let i = frame.as_usize();
        (i / WORD_BITS, 1 << (i % WORD_BITS))
    }

    /// Lowest free frame, without claiming it.
    #[must_use]
    pub fn first_free(&self) -> Option<PhysicalFrame> {
        self.bitmap.iter().enumerate().find_map(|(w, word)| {
            let bit = word.trailing_ones() as usize;
            if bit == WORD_BITS {
                return None;
            }
            let index = u16::try_from(w * WORD_BITS + bit).ok()?;
            PhysicalFrame::from_index(index)
        })
    }
}

impl FrameAlloc for BitmapFrameAlloc {
    fn alloc_frame(&mut self) -> Option<PhysicalFrame> {
        let frame = self.first_free()?;
        self.mark_used(frame);
        Some(frame)
    }

    fn free_frame(&mut self, frame: PhysicalFrame) {
        let (w, mask) = Self::locate(frame);
        self.bitmap[w] &= !mask;
    }

    fn mark_used(&mut self, frame: PhysicalFrame) {
        let (w, mask) = Self::locate(frame);
        self.bitmap[w] |= mask;
    }

    fn is_used(&self, frame: PhysicalFrame) -> bool {
        let (w, mask) = Self::locate(frame);
        self.bitmap[w] & mask != 0
    }

    fn used_count(&self) -> usize {
        self.bitmap.iter().map(|w| w.count_ones() as usize).sum()
    }

    fn release_all(&mut self) {
        self.bitmap = [0; WORDS];
    }
}
