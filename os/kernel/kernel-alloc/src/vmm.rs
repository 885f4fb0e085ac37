//! Minimal Virtual Memory Manager (VMM) for user heaps.
//!
//! Pairs one process address space with the shared frame pool for the
//! duration of a system call. The heap only ever needs two things from it:
//! "put a fresh page here" and "take these pages away again".
//!
//! # Example
//! ```rust
//! use kernel_alloc::{FramePool, Vmm};
//! use kernel_vmem::AddressSpace;
//! use kernel_vmem::addresses::{PhysicalAddress, VirtualAddress};
//!
//! let frames = FramePool::new(PhysicalAddress::new(0x8200_0000), 4);
//! let mut aspace = AddressSpace::new();
//! let mut vmm = Vmm::new(&mut aspace, &frames);
//!
//! let va = VirtualAddress::new(0x0040_0000);
//! let pa = vmm.map_fresh_page(va).unwrap();
//! assert_eq!(vmm.translate(va + 8), Some(pa + 8));
//! vmm.release_pages(va, 1).unwrap();
//! assert_eq!(frames.allocated(), 0);
//! ```

use kernel_vmem::addresses::{PageSize, PhysicalAddress, Size4K, VirtualAddress};
use kernel_vmem::{FrameAlloc, MapError, Mapper, Protection};

/// Address space of the current process plus the shared frame pool.
pub struct Vmm<'m, M: Mapper, A: FrameAlloc> {
    aspace: &'m mut M,
    frames: &'m A,
}

impl<'m, M: Mapper, A: FrameAlloc> Vmm<'m, M, A> {
    pub const fn new(aspace: &'m mut M, frames: &'m A) -> Self {
        Self { aspace, frames }
    }

    /// Translate VA→PA if mapped.
    #[must_use]
    pub fn translate(&self, va: VirtualAddress) -> Option<PhysicalAddress> {
        self.aspace.translate(va)
    }

    #[must_use]
    pub fn is_mapped(&self, va: VirtualAddress) -> bool {
        self.translate(va).is_some()
    }

    /// Allocate one zeroed frame and map it user read/write at `va`.
    ///
    /// # Errors
    /// [`VmmError::OutOfMemory`] when the pool is empty; a mapping failure
    /// hands the frame back before returning.
    pub fn map_fresh_page(&mut self, va: VirtualAddress) -> Result<PhysicalAddress, VmmError> {
        let Some(pa) = self.frames.alloc_page() else {
            return Err(VmmError::OutOfMemory);
        };
        if let Err(e) = self.aspace.map(va, Size4K::SIZE, pa, Protection::user_rw()) {
            self.frames.free_page(pa);
            return Err(e.into());
        }
        log::debug!("mapped heap page {va} -> {pa}");
        Ok(pa)
    }

    /// Unmap `pages` pages starting at the page-aligned `va` and return
    /// their frames to the pool.
    ///
    /// # Errors
    /// Fails without unmapping anything if any page in the range is not mapped.
    pub fn release_pages(&mut self, va: VirtualAddress, pages: u64) -> Result<(), VmmError> {
        let len = pages
            .checked_mul(Size4K::SIZE)
            .ok_or(VmmError::InvalidRange)?;
        self.aspace.unmap(self.frames, va, len, true)?;
        log::debug!("released {pages} heap page(s) at {va}");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VmmError {
    #[error("out of memory")]
    OutOfMemory,
    #[error("invalid range")]
    InvalidRange,
    #[error("mapping failed: {0}")]
    Map(#[from] MapError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FramePool;
    use kernel_vmem::AddressSpace;

    const VA: VirtualAddress = VirtualAddress::new(0x0040_0000);

    fn pool(frames: u64) -> FramePool {
        FramePool::new(PhysicalAddress::new(0x8200_0000), frames)
    }

    #[test]
    fn exhausted_pool_maps_nothing() {
        let frames = pool(1);
        let mut aspace = AddressSpace::new();
        let mut vmm = Vmm::new(&mut aspace, &frames);
        vmm.map_fresh_page(VA).unwrap();
        assert_eq!(
            vmm.map_fresh_page(VA + Size4K::SIZE),
            Err(VmmError::OutOfMemory)
        );
        assert!(!vmm.is_mapped(VA + Size4K::SIZE));
    }

    #[test]
    fn failed_map_returns_the_frame() {
        let frames = pool(2);
        let mut aspace = AddressSpace::new();
        let mut vmm = Vmm::new(&mut aspace, &frames);
        vmm.map_fresh_page(VA).unwrap();
        assert_eq!(
            vmm.map_fresh_page(VA),
            Err(VmmError::Map(MapError::AlreadyMapped(VA)))
        );
        assert_eq!(frames.allocated(), 1);
    }

    #[test]
    fn release_of_unmapped_range_fails() {
        let frames = pool(2);
        let mut aspace = AddressSpace::new();
        let mut vmm = Vmm::new(&mut aspace, &frames);
        vmm.map_fresh_page(VA).unwrap();
        assert_eq!(
            vmm.release_pages(VA, 2),
            Err(VmmError::Map(MapError::NotMapped(VA + Size4K::SIZE)))
        );
        assert!(vmm.is_mapped(VA));
        assert_eq!(frames.allocated(), 1);
    }
}
