use super::BLOCK_HEADER_SIZE;
use core::fmt;
use kernel_vmem::addresses::{PhysicalAddress, VirtualAddress};

/// Bookkeeping record for one heap block.
///
/// A block occupies `[header, virtual_address + size)` of the process's
/// virtual address space:
///
/// ```text
/// +---------------------+-------------------------+
/// | header (32 bytes)   |      usable (size)      |
/// +---------------------+-------------------------+
/// ^ header              ^ virtual_address
/// ```
///
/// The header bytes are reserved in the address layout only. The record
/// itself lives in the allocator's own lists, never in user memory.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Block {
    header: VirtualAddress,
    /// Frame byte backing `virtual_address`, if that page is mapped.
    physical: Option<PhysicalAddress>,
    size: u64,
}

impl Block {
    pub(crate) const fn new(
        header: VirtualAddress,
        physical: Option<PhysicalAddress>,
        size: u64,
    ) -> Self {
        Self {
            header,
            physical,
            size,
        }
    }

    /// Start of the reserved header.
    #[inline]
    #[must_use]
    pub const fn header(&self) -> VirtualAddress {
        self.header
    }

    /// Start of the usable region; what `allocate` hands out.
    #[inline]
    #[must_use]
    pub const fn virtual_address(&self) -> VirtualAddress {
        VirtualAddress::new(self.header.as_u64() + BLOCK_HEADER_SIZE)
    }

    #[inline]
    #[must_use]
    pub const fn physical_address(&self) -> Option<PhysicalAddress> {
        self.physical
    }

    /// Usable bytes, header excluded.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// One past the last usable byte.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> VirtualAddress {
        VirtualAddress::new(self.virtual_address().as_u64() + self.size)
    }

    /// Header plus usable bytes.
    #[inline]
    #[must_use]
    pub const fn span(&self) -> u64 {
        BLOCK_HEADER_SIZE + self.size
    }

    /// Whether `next` starts exactly where this block ends (after 8-byte
    /// rounding), so the two can be merged into one.
    #[inline]
    #[must_use]
    pub const fn abuts(&self, next: &Self) -> bool {
        self.end().align_to(8).as_u64() == next.header.as_u64()
    }

    /// Grow by `other`'s header and usable bytes.
    pub(crate) const fn absorb(&mut self, other: &Self) {
        self.size += other.span();
    }

    pub(crate) const fn set_size(&mut self, size: u64) {
        self.size = size;
    }

    pub(crate) const fn grow(&mut self, bytes: u64) {
        self.size += bytes;
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("header", &self.header)
            .field("va", &self.virtual_address())
            .field("pa", &self.physical)
            .field("size", &self.size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_accessors() {
        let b = Block::new(VirtualAddress::new(0x1000), None, 104);
        assert_eq!(b.virtual_address().as_u64(), 0x1020);
        assert_eq!(b.end().as_u64(), 0x1088);
        assert_eq!(b.span(), 136);
    }

    #[test]
    fn abutting_blocks() {
        let a = Block::new(VirtualAddress::new(0x1000), None, 104);
        let b = Block::new(VirtualAddress::new(0x1088), None, 8);
        let c = Block::new(VirtualAddress::new(0x1090), None, 8);
        assert!(a.abuts(&b));
        assert!(!a.abuts(&c));
        assert!(!b.abuts(&a));
    }
}
