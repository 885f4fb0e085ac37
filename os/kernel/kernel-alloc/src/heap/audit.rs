use super::{BLOCK_HEADER_SIZE, Block, UserHeap};
use kernel_vmem::Mapper;
use kernel_vmem::addresses::{PageSize, Size4K, VirtualAddress};

/// Byte totals of a heap that passed [`UserHeap::audit`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HeapStats {
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub used_blocks: usize,
    pub free_blocks: usize,
    pub mapped_bytes: u64,
}

impl HeapStats {
    #[must_use]
    pub const fn blocks(&self) -> usize {
        self.used_blocks + self.free_blocks
    }
}

/// First broken invariant found by [`UserHeap::audit`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuditError {
    #[error("blocks at {0} and {1} overlap")]
    Overlap(VirtualAddress, VirtualAddress),
    #[error("free blocks at {0} and {1} are adjacent but not merged")]
    Unmerged(VirtualAddress, VirtualAddress),
    #[error("block at {0} lies outside [heap base, growth pointer)")]
    OutOfWindow(VirtualAddress),
    #[error("block at {block} covers unmapped page {page}")]
    Unmapped {
        block: VirtualAddress,
        page: VirtualAddress,
    },
    #[error("blocks account for {accounted} bytes but {mapped} bytes are mapped")]
    Conservation { accounted: u64, mapped: u64 },
    #[error("heap tracks {tracked} mapped pages, address space has {actual}")]
    PageCount { tracked: u64, actual: u64 },
}

impl UserHeap {
    /// Check every bookkeeping invariant against the address space `aspace`.
    ///
    /// - blocks in both lists are pairwise disjoint and inside the window
    /// - no two free blocks are mergeable
    /// - every page a block touches is mapped
    /// - used + free + headers == mapped bytes
    ///
    /// # Errors
    /// The first violated invariant.
    pub fn audit<M: Mapper>(&self, aspace: &M) -> Result<HeapStats, AuditError> {
        let mut all: alloc::vec::Vec<&Block> = self.used.iter().chain(self.free.iter()).collect();
        all.sort_unstable_by_key(|b| b.header());

        for b in &all {
            if b.header() < self.config.base || b.end() > self.growth {
                return Err(AuditError::OutOfWindow(b.header()));
            }
            let mut page = b.header().align_down::<Size4K>();
            while page < b.end() {
                if aspace.translate(page).is_none() {
                    return Err(AuditError::Unmapped {
                        block: b.header(),
                        page,
                    });
                }
                page += Size4K::SIZE;
            }
        }
        for pair in all.windows(2) {
            if pair[0].end() > pair[1].header() {
                return Err(AuditError::Overlap(pair[0].header(), pair[1].header()));
            }
        }

        let free: alloc::vec::Vec<&Block> = self.free.iter().collect();
        for pair in free.windows(2) {
            if pair[0].abuts(pair[1]) {
                return Err(AuditError::Unmerged(pair[0].header(), pair[1].header()));
            }
        }

        let mut actual = 0;
        let mut page = self.config.base;
        while page < self.growth {
            if aspace.translate(page).is_some() {
                actual += 1;
            }
            page += Size4K::SIZE;
        }
        if actual != self.mapped_pages {
            return Err(AuditError::PageCount {
                tracked: self.mapped_pages,
                actual,
            });
        }

        let stats = HeapStats {
            used_bytes: self.used.total_size(),
            free_bytes: self.free.total_size(),
            used_blocks: self.used.len(),
            free_blocks: self.free.len(),
            mapped_bytes: self.mapped_pages * Size4K::SIZE,
        };
        let accounted =
            stats.used_bytes + stats.free_bytes + stats.blocks() as u64 * BLOCK_HEADER_SIZE;
        if accounted != stats.mapped_bytes {
            return Err(AuditError::Conservation {
                accounted,
                mapped: stats.mapped_bytes,
            });
        }
        Ok(stats)
    }
}
