//! # Per-process User Heap
//!
//! Byte-granular allocator behind the `allocate`/`free` system calls. Memory
//! comes from whole 4 KiB pages mapped on demand at a growth pointer that
//! only ever moves up; within those pages the heap keeps two lists of
//! [`Block`]s:
//!
//! - **used**: blocks handed out to the application,
//! - **free**: blocks available for reuse, in ascending address order.
//!
//! Every block reserves [`BLOCK_HEADER_SIZE`] bytes in front of its usable
//! region, exactly as if the header were stored in-line, but the records
//! themselves live in [`BlockList`]s owned by the heap. A stray user write
//! can clobber user data, never the allocator's metadata.
//!
//! ## Allocation
//!
//! 1. Round the request up to 8 bytes.
//! 2. First fit over the free list (lowest address wins).
//! 3. Nothing fits: map pages at the growth pointer until one fresh block is
//!    large enough, merging it into the topmost free block when that one ends
//!    right at the old growth pointer.
//! 4. Split off the tail if it can hold a header plus 8 bytes, move the block
//!    to the used list.
//!
//! ## Freeing
//!
//! The block goes back to the free list and is merged with its right and
//! left neighbours when they abut. Whole pages inside the merged block's
//! usable region are then unmapped and their frames released; what is left
//! before and after the hole stays in the free list.
//!
//! ```text
//!   header  va          first                 last        end
//!   ├───────┼───────────┼─────────────────────┼───────────┤
//!   │  hdr  │   head    │   released pages    │ hdr│ tail │
//!   └───────┴───────────┴─────────────────────┴───────────┘
//! ```

mod audit;
mod block;
mod block_list;
mod config;

pub use audit::{AuditError, HeapStats};
pub use block::Block;
pub use block_list::{BlockList, Containment};
pub use config::HeapConfig;

use crate::vmm::{Vmm, VmmError};
use kernel_memory_addresses::checked_align_up;
use kernel_vmem::addresses::{PageSize, Size4K, VirtualAddress};
use kernel_vmem::{FrameAlloc, Mapper};
use log::{debug, trace, warn};

/// Bytes reserved in front of every block (four machine words).
pub const BLOCK_HEADER_SIZE: u64 = 32;

/// Granularity of requests and block boundaries.
pub const BLOCK_ALIGN: u64 = 8;

/// Smallest remainder worth splitting off: a header plus one aligned word.
const MIN_SPLIT: u64 = BLOCK_HEADER_SIZE + BLOCK_ALIGN;

const PAGE: u64 = Size4K::SIZE;

const _: () = {
    assert!(BLOCK_HEADER_SIZE.is_multiple_of(BLOCK_ALIGN));
    assert!(PAGE > MIN_SPLIT);
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HeapError {
    #[error("address {0} does not belong to an allocated block")]
    NotAllocated(VirtualAddress),
    #[error("request of {0} bytes cannot be represented")]
    RequestTooLarge(u64),
    #[error("heap window exhausted at {0}")]
    HeapExhausted(VirtualAddress),
    #[error(transparent)]
    Vmm(#[from] VmmError),
}

impl HeapError {
    /// Caller errors the system call reports as `-1`; everything else halts.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotAllocated(_))
    }
}

/// One process's heap.
pub struct UserHeap {
    config: HeapConfig,
    used: BlockList,
    free: BlockList,
    /// Next virtual address a fresh page goes to.
    growth: VirtualAddress,
    /// Pages in `[base, growth)` currently mapped.
    mapped_pages: u64,
}

impl UserHeap {
    #[must_use]
    pub const fn new(config: HeapConfig) -> Self {
        Self {
            growth: config.base,
            config,
            used: BlockList::new(),
            free: BlockList::new(),
            mapped_pages: 0,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &HeapConfig {
        &self.config
    }

    #[must_use]
    pub const fn growth_pointer(&self) -> VirtualAddress {
        self.growth
    }

    #[must_use]
    pub const fn mapped_pages(&self) -> u64 {
        self.mapped_pages
    }

    #[must_use]
    pub const fn used_blocks(&self) -> &BlockList {
        &self.used
    }

    #[must_use]
    pub const fn free_blocks(&self) -> &BlockList {
        &self.free
    }

    #[must_use]
    pub fn free_bytes(&self) -> u64 {
        self.free.total_size()
    }

    #[must_use]
    pub fn used_bytes(&self) -> u64 {
        self.used.total_size()
    }

    /// Hand out at least `requested` writable bytes.
    ///
    /// # Errors
    /// All errors are fatal for the calling process: the request does not
    /// fit the address space or the heap window, or no frame is left.
    pub fn allocate<M: Mapper, A: FrameAlloc>(
        &mut self,
        vmm: &mut Vmm<'_, M, A>,
        requested: u64,
    ) -> Result<VirtualAddress, HeapError> {
        let want = checked_align_up(requested.max(1), BLOCK_ALIGN)
            .ok_or(HeapError::RequestTooLarge(requested))?;

        let fit = self.free.first_fit(want).map(Block::header);
        let block = match fit.and_then(|header| self.free.remove(header)) {
            Some(block) => block,
            None => self.grow(vmm, want)?,
        };

        let va = self.hand_out(vmm, block, want);
        trace!("allocate({requested}) -> {va}");
        Ok(va)
    }

    /// Give back the block containing `addr`.
    ///
    /// # Errors
    /// [`HeapError::NotAllocated`] leaves the heap untouched. Any other
    /// error comes from unmapping and is fatal.
    pub fn free<M: Mapper, A: FrameAlloc>(
        &mut self,
        vmm: &mut Vmm<'_, M, A>,
        addr: VirtualAddress,
    ) -> Result<(), HeapError> {
        let Some(mut block) = self.used.containing(addr, self.config.containment).copied() else {
            warn!("free of {addr}, which is not an allocated block");
            return Err(HeapError::NotAllocated(addr));
        };
        self.used.remove(block.header());

        if let Some(next) = self.free.successor(block.header()).copied()
            && block.abuts(&next)
        {
            self.free.remove(next.header());
            block.absorb(&next);
            trace!("merged {} into {}", next.header(), block.header());
        }

        if let Some(mut prev) = self.free.predecessor(block.header()).copied()
            && prev.abuts(&block)
        {
            self.free.remove(prev.header());
            prev.absorb(&block);
            trace!("merged {} into {}", block.header(), prev.header());
            block = prev;
        }

        self.reclaim(vmm, block)
    }

    /// Map enough fresh pages at the growth pointer to hold `want` bytes.
    ///
    /// The returned block is in neither list.
    fn grow<M: Mapper, A: FrameAlloc>(
        &mut self,
        vmm: &mut Vmm<'_, M, A>,
        want: u64,
    ) -> Result<Block, HeapError> {
        let header = self.growth;
        let pages = want
            .checked_add(BLOCK_HEADER_SIZE)
            .ok_or(HeapError::RequestTooLarge(want))?
            .div_ceil(PAGE);
        let fits = pages
            .checked_mul(PAGE)
            .and_then(|len| header.checked_add(len))
            .is_some_and(|end| end <= self.config.limit);
        if !fits {
            return Err(HeapError::HeapExhausted(header));
        }

        let pa = vmm.map_fresh_page(header)?;
        self.advance();
        let mut block = Block::new(header, Some(pa + BLOCK_HEADER_SIZE), PAGE - BLOCK_HEADER_SIZE);
        while block.size() < want {
            vmm.map_fresh_page(self.growth)?;
            self.advance();
            block.grow(PAGE);
        }
        debug!("heap grew by {pages} page(s) at {header}");

        if let Some(mut prev) = self.free.predecessor(header).copied()
            && prev.abuts(&block)
        {
            self.free.remove(prev.header());
            prev.absorb(&block);
            trace!("fresh pages at {header} extend {}", prev.header());
            return Ok(prev);
        }
        Ok(block)
    }

    const fn advance(&mut self) {
        self.growth = VirtualAddress::new(self.growth.as_u64() + PAGE);
        self.mapped_pages += 1;
    }

    /// Split `block` down to `want` bytes if worthwhile and move it to the
    /// used list.
    fn hand_out<M: Mapper, A: FrameAlloc>(
        &mut self,
        vmm: &Vmm<'_, M, A>,
        mut block: Block,
        want: u64,
    ) -> VirtualAddress {
        let spare = block.size() - want;
        if spare >= MIN_SPLIT {
            let rest_header = block.virtual_address() + want;
            let rest = Block::new(
                rest_header,
                vmm.translate(rest_header + BLOCK_HEADER_SIZE),
                spare - BLOCK_HEADER_SIZE,
            );
            block.set_size(want);
            trace!("split {} off {}", rest.header(), block.header());
            self.free.insert(rest);
        }
        let va = block.virtual_address();
        self.used.insert(block);
        va
    }

    /// Release the whole pages inside `block`'s usable region and file what
    /// remains in the free list.
    fn reclaim<M: Mapper, A: FrameAlloc>(
        &mut self,
        vmm: &mut Vmm<'_, M, A>,
        block: Block,
    ) -> Result<(), HeapError> {
        let va = block.virtual_address();
        let end = block.end();
        let first = va.align_up::<Size4K>();
        let mut last = end.align_down::<Size4K>();

        // A tail too short for its own header keeps its page.
        let tail = end - last;
        if last > first && tail > 0 && tail < BLOCK_HEADER_SIZE {
            last = last - PAGE;
        }
        if last <= first {
            self.free.insert(block);
            return Ok(());
        }

        let pages = (last - first) / PAGE;
        if let Err(e) = vmm.release_pages(first, pages) {
            self.free.insert(block);
            return Err(e.into());
        }
        self.mapped_pages -= pages;

        self.free
            .insert(Block::new(block.header(), vmm.translate(va), first - va));
        let tail = end - last;
        if tail > 0 {
            self.free.insert(Block::new(
                last,
                vmm.translate(last + BLOCK_HEADER_SIZE),
                tail - BLOCK_HEADER_SIZE,
            ));
        }
        debug!("reclaimed {pages} page(s) at {first}");
        Ok(())
    }
}
