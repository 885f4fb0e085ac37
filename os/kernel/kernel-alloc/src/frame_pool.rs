//! # Physical Frame Pool
//!
//! Bitmap-backed Page Provider over a fixed physical range. One bit per
//! 4 KiB frame; a set bit means the frame is handed out.
//!
//! The pool also owns the bytes behind its frames and implements
//! [`PhysMapper`] over them, so user memory written through a translated
//! address can be read back (the `print` system call does exactly that).
//! Frame contents only exist while the frame is allocated, which makes the
//! zero-fill on allocation implicit.
//!
//! All state sits behind a [`SpinLock`]; the pool is shared by every hart.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;
use kernel_info::memory::{FRAME_POOL_BASE, FRAME_POOL_FRAMES};
use kernel_sync::SpinLock;
use kernel_vmem::addresses::{PageSize, PhysicalAddress, Size4K};
use kernel_vmem::{FrameAlloc, PhysAccessError, PhysMapper};

const FRAME_SIZE: u64 = Size4K::SIZE;
const BITS: u64 = u64::BITS as u64;

pub struct FramePool {
    base: PhysicalAddress,
    frames: u64,
    state: SpinLock<PoolState>,
}

struct PoolState {
    /// Bit `i` set: frame `i` is allocated.
    bitmap: Vec<u64>,
    /// Contents of allocated frames, keyed by frame index.
    contents: BTreeMap<u64, Box<[u8]>>,
    /// Word index where the next search starts.
    hint: usize,
    allocated: u64,
}

impl FramePool {
    /// Pool of `frames` frames starting at the page-aligned `base`.
    #[must_use]
    pub fn new(base: PhysicalAddress, frames: u64) -> Self {
        debug_assert!(base.is_aligned::<Size4K>());
        let words = usize::try_from(frames.div_ceil(BITS)).unwrap_or(usize::MAX);
        let mut bitmap = vec![0u64; words];

        // Bits past the last frame stay permanently "allocated".
        let tail = frames % BITS;
        if tail != 0
            && let Some(last) = bitmap.last_mut()
        {
            *last = !((1u64 << tail) - 1);
        }

        Self {
            base,
            frames,
            state: SpinLock::new(PoolState {
                bitmap,
                contents: BTreeMap::new(),
                hint: 0,
                allocated: 0,
            }),
        }
    }

    #[must_use]
    pub const fn base(&self) -> PhysicalAddress {
        self.base
    }

    #[must_use]
    pub const fn capacity(&self) -> u64 {
        self.frames
    }

    /// Frames currently handed out.
    #[must_use]
    pub fn allocated(&self) -> u64 {
        self.state.lock().allocated
    }

    #[must_use]
    pub fn available(&self) -> u64 {
        self.frames - self.allocated()
    }

    /// Whether the frame containing `pa` is currently handed out.
    #[must_use]
    pub fn is_allocated(&self, pa: PhysicalAddress) -> bool {
        self.index_of(pa)
            .is_some_and(|i| self.state.lock().contents.contains_key(&i))
    }

    fn index_of(&self, pa: PhysicalAddress) -> Option<u64> {
        if pa < self.base {
            return None;
        }
        let index = (pa - self.base) / FRAME_SIZE;
        (index < self.frames).then_some(index)
    }

    /// Run `f` over each frame-bounded piece of `[pa, pa + len)`.
    #[allow(clippy::cast_possible_truncation)]
    fn for_each_piece(
        &self,
        pa: PhysicalAddress,
        len: usize,
        mut f: impl FnMut(&mut [u8], usize, usize),
    ) -> Result<(), PhysAccessError> {
        let out_of_range = PhysAccessError::OutOfRange {
            addr: pa,
            len: len as u64,
        };
        let mut state = self.state.lock();
        let mut done = 0usize;
        while done < len {
            let cur = pa + done as u64;
            let index = self.index_of(cur).ok_or(out_of_range)?;
            let frame = state.contents.get_mut(&index).ok_or(out_of_range)?;
            let offset = cur.offset::<Size4K>() as usize;
            let piece = (frame.len() - offset).min(len - done);
            f(&mut frame[offset..offset + piece], done, piece);
            done += piece;
        }
        Ok(())
    }
}

impl Default for FramePool {
    fn default() -> Self {
        Self::new(PhysicalAddress::new(FRAME_POOL_BASE), FRAME_POOL_FRAMES)
    }
}

impl FrameAlloc for FramePool {
    #[allow(clippy::cast_possible_truncation)]
    fn alloc_page(&self) -> Option<PhysicalAddress> {
        let mut state = self.state.lock();
        let words = state.bitmap.len();
        for step in 0..words {
            let w = (state.hint + step) % words;
            let word = state.bitmap[w];
            if word == u64::MAX {
                continue;
            }
            let bit = u64::from(word.trailing_ones());
            state.bitmap[w] |= 1 << bit;
            state.hint = w;
            state.allocated += 1;

            let index = w as u64 * BITS + bit;
            state
                .contents
                .insert(index, vec![0u8; FRAME_SIZE as usize].into_boxed_slice());
            return Some(self.base + index * FRAME_SIZE);
        }
        log::error!("frame pool exhausted ({} frames)", self.frames);
        None
    }

    #[allow(clippy::cast_possible_truncation)]
    fn free_page(&self, frame: PhysicalAddress) {
        let Some(index) = self.index_of(frame) else {
            log::warn!("freeing foreign frame {frame}");
            return;
        };
        let mut state = self.state.lock();
        let (w, bit) = ((index / BITS) as usize, index % BITS);
        if state.bitmap[w] & (1 << bit) == 0 {
            log::warn!("double free of frame {frame}");
            return;
        }
        state.bitmap[w] &= !(1 << bit);
        state.contents.remove(&index);
        state.allocated -= 1;
    }
}

impl PhysMapper for FramePool {
    fn read_phys(&self, pa: PhysicalAddress, buf: &mut [u8]) -> Result<(), PhysAccessError> {
        self.for_each_piece(pa, buf.len(), |frame, start, len| {
            buf[start..start + len].copy_from_slice(frame);
        })
    }

    fn write_phys(&self, pa: PhysicalAddress, data: &[u8]) -> Result<(), PhysAccessError> {
        self.for_each_piece(pa, data.len(), |frame, start, len| {
            frame.copy_from_slice(&data[start..start + len]);
        })
    }
}
