use super::Block;
use alloc::collections::BTreeMap;
use core::ops::Bound::{Excluded, Unbounded};
use kernel_vmem::addresses::VirtualAddress;

/// Blocks keyed by header address.
///
/// Iteration is always in ascending address order, which is what the free
/// list needs for first-fit and neighbour coalescing.
#[derive(Default)]
pub struct BlockList {
    blocks: BTreeMap<VirtualAddress, Block>,
}

impl BlockList {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            blocks: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Block> + '_ {
        self.blocks.values()
    }

    /// Sum of usable bytes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.blocks.values().map(Block::size).sum()
    }

    pub(crate) fn insert(&mut self, block: Block) {
        let previous = self.blocks.insert(block.header(), block);
        debug_assert!(previous.is_none(), "two blocks share header {}", block.header());
    }

    pub(crate) fn remove(&mut self, header: VirtualAddress) -> Option<Block> {
        self.blocks.remove(&header)
    }

    /// Lowest-addressed block with at least `size` usable bytes.
    #[must_use]
    pub fn first_fit(&self, size: u64) -> Option<&Block> {
        self.blocks.values().find(|b| b.size() >= size)
    }

    /// Closest block below `header`.
    #[must_use]
    pub fn predecessor(&self, header: VirtualAddress) -> Option<&Block> {
        self.blocks.range(..header).next_back().map(|(_, b)| b)
    }

    /// Closest block above `header`.
    #[must_use]
    pub fn successor(&self, header: VirtualAddress) -> Option<&Block> {
        self.blocks
            .range((Excluded(header), Unbounded))
            .next()
            .map(|(_, b)| b)
    }

    #[must_use]
    pub fn last(&self) -> Option<&Block> {
        self.blocks.values().next_back()
    }

    /// The block whose usable range holds `addr` under `containment`.
    ///
    /// Only the two closest blocks starting at or below `addr` can qualify:
    /// with the inclusive rule, the address one past a block's end may equal
    /// the header of the block after it.
    #[must_use]
    pub fn containing(&self, addr: VirtualAddress, containment: Containment) -> Option<&Block> {
        self.blocks
            .range(..=addr)
            .rev()
            .take(2)
            .map(|(_, b)| b)
            .find(|b| containment.contains(b, addr))
    }
}

/// Which addresses count as "inside" a used block when freeing it.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Containment {
    /// `start <= addr <= start + size`. The one-past-end address is accepted.
    #[default]
    InclusiveEnd,
    /// `start <= addr < start + size`.
    ExclusiveEnd,
}

impl Containment {
    #[must_use]
    pub fn contains(self, block: &Block, addr: VirtualAddress) -> bool {
        let start = block.virtual_address();
        match self {
            Self::InclusiveEnd => start <= addr && addr <= block.end(),
            Self::ExclusiveEnd => start <= addr && addr < block.end(),
        }
    }
}
