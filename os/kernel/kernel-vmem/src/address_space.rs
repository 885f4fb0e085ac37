//! # Software Address Space
//!
//! A per-process page table held as an ordered map from virtual page to
//! Sv39 leaf entry. It honours the [`Mapper`] contract exactly (aligned
//! ranges, all-or-nothing checks, optional frame release on unmap) and is
//! what each core's process uses off-target.

use crate::{FrameAlloc, MapError, Mapper, PageTableEntry, Protection};
use alloc::collections::BTreeMap;
use kernel_memory_addresses::{PageSize, PhysicalAddress, Size4K, VirtualAddress, VirtualPage};

#[derive(Default)]
pub struct AddressSpace {
    leaves: BTreeMap<VirtualPage<Size4K>, PageTableEntry>,
}

impl AddressSpace {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            leaves: BTreeMap::new(),
        }
    }

    /// Number of 4 KiB pages currently mapped.
    #[must_use]
    pub fn mapped_pages(&self) -> usize {
        self.leaves.len()
    }

    #[must_use]
    pub fn is_mapped(&self, va: VirtualAddress) -> bool {
        self.leaves.contains_key(&va.page::<Size4K>())
    }

    /// Leaf entry for the page containing `va`.
    #[must_use]
    pub fn entry(&self, va: VirtualAddress) -> Option<PageTableEntry> {
        self.leaves.get(&va.page::<Size4K>()).copied()
    }

    /// Iterate over `(page, leaf)` in ascending address order.
    pub fn leaves(&self) -> impl Iterator<Item = (VirtualPage<Size4K>, PageTableEntry)> + '_ {
        self.leaves.iter().map(|(p, e)| (*p, *e))
    }
}

/// Pages covered by `[va, va + len)`, after validating alignment.
fn page_span(va: VirtualAddress, len: u64) -> Result<(VirtualPage<Size4K>, u64), MapError> {
    if !va.is_aligned::<Size4K>() {
        return Err(MapError::Unaligned(va));
    }
    let pages = len.div_ceil(Size4K::SIZE);
    va.checked_add(pages * Size4K::SIZE)
        .ok_or(MapError::Overflow)?;
    Ok((va.page::<Size4K>(), pages))
}

impl Mapper for AddressSpace {
    fn map(
        &mut self,
        va: VirtualAddress,
        len: u64,
        pa: PhysicalAddress,
        prot: Protection,
    ) -> Result<(), MapError> {
        if !pa.is_aligned::<Size4K>() {
            return Err(MapError::UnalignedFrame(pa));
        }
        let (first, pages) = page_span(va, len)?;

        let mut page = first;
        for _ in 0..pages {
            if self.leaves.contains_key(&page) {
                return Err(MapError::AlreadyMapped(page.base()));
            }
            page = page.next();
        }

        let mut page = first;
        for i in 0..pages {
            let frame = (pa + i * Size4K::SIZE).page::<Size4K>();
            self.leaves.insert(page, PageTableEntry::leaf(frame, prot));
            page = page.next();
        }
        log::trace!("mapped {pages} page(s) at {va} -> {pa}");
        Ok(())
    }

    fn unmap<A: FrameAlloc>(
        &mut self,
        frames: &A,
        va: VirtualAddress,
        len: u64,
        release: bool,
    ) -> Result<(), MapError> {
        let (first, pages) = page_span(va, len)?;

        let mut page = first;
        for _ in 0..pages {
            if !self.leaves.contains_key(&page) {
                return Err(MapError::NotMapped(page.base()));
            }
            page = page.next();
        }

        let mut page = first;
        for _ in 0..pages {
            if let Some(leaf) = self.leaves.remove(&page)
                && release
            {
                frames.free_page(leaf.frame_base());
            }
            page = page.next();
        }
        log::trace!("unmapped {pages} page(s) at {va} (release: {release})");
        Ok(())
    }

    fn translate(&self, va: VirtualAddress) -> Option<PhysicalAddress> {
        let leaf = self.leaves.get(&va.page::<Size4K>())?;
        Some(leaf.frame_base() + va.offset::<Size4K>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;

    /// Hands out frames from a counter and records what comes back.
    #[derive(Default)]
    struct CountingFrames {
        next: RefCell<u64>,
        freed: RefCell<alloc::vec::Vec<PhysicalAddress>>,
    }

    impl FrameAlloc for CountingFrames {
        fn alloc_page(&self) -> Option<PhysicalAddress> {
            let mut n = self.next.borrow_mut();
            *n += 1;
            Some(PhysicalAddress::new(0x8000_0000 + *n * Size4K::SIZE))
        }

        fn free_page(&self, frame: PhysicalAddress) {
            self.freed.borrow_mut().push(frame);
        }
    }

    const VA: VirtualAddress = VirtualAddress::new(0x0040_0000);
    const PA: PhysicalAddress = PhysicalAddress::new(0x8100_0000);

    #[test]
    fn translate_adds_page_offset() {
        let mut aspace = AddressSpace::new();
        aspace.map(VA, Size4K::SIZE, PA, Protection::user_rw()).unwrap();
        assert_eq!(aspace.translate(VA + 0x123), Some(PA + 0x123));
        assert_eq!(aspace.translate(VA + Size4K::SIZE), None);
        assert_eq!(aspace.mapped_pages(), 1);
    }

    #[test]
    fn multi_page_map_is_physically_contiguous() {
        let mut aspace = AddressSpace::new();
        aspace.map(VA, 2 * Size4K::SIZE - 1, PA, Protection::user_rw()).unwrap();
        assert_eq!(aspace.mapped_pages(), 2);
        assert_eq!(aspace.translate(VA + Size4K::SIZE), Some(PA + Size4K::SIZE));
    }

    #[test]
    fn double_map_is_rejected_without_side_effects() {
        let mut aspace = AddressSpace::new();
        aspace.map(VA + Size4K::SIZE, Size4K::SIZE, PA, Protection::user_rw()).unwrap();
        let err = aspace.map(VA, 2 * Size4K::SIZE, PA, Protection::user_rw());
        assert_eq!(err, Err(MapError::AlreadyMapped(VA + Size4K::SIZE)));
        assert!(!aspace.is_mapped(VA));
    }

    #[test]
    fn unaligned_requests_are_rejected() {
        let mut aspace = AddressSpace::new();
        assert_eq!(
            aspace.map(VA + 8, 8, PA, Protection::user_rw()),
            Err(MapError::Unaligned(VA + 8))
        );
        assert_eq!(
            aspace.map(VA, 8, PA + 8, Protection::user_rw()),
            Err(MapError::UnalignedFrame(PA + 8))
        );
    }

    #[test]
    fn unmap_releases_frames_only_when_asked() {
        let frames = CountingFrames::default();
        let mut aspace = AddressSpace::new();
        let a = frames.alloc_page().unwrap();
        let b = frames.alloc_page().unwrap();
        aspace.map(VA, Size4K::SIZE, a, Protection::user_rw()).unwrap();
        aspace.map(VA + Size4K::SIZE, Size4K::SIZE, b, Protection::user_rw()).unwrap();

        aspace.unmap(&frames, VA, Size4K::SIZE, false).unwrap();
        assert!(frames.freed.borrow().is_empty());

        aspace.unmap(&frames, VA + Size4K::SIZE, Size4K::SIZE, true).unwrap();
        assert_eq!(frames.freed.borrow().as_slice(), &[b]);
        assert_eq!(aspace.mapped_pages(), 0);
    }

    #[test]
    fn unmap_of_hole_fails() {
        let frames = CountingFrames::default();
        let mut aspace = AddressSpace::new();
        aspace.map(VA, Size4K::SIZE, PA, Protection::user_rw()).unwrap();
        assert_eq!(
            aspace.unmap(&frames, VA, 2 * Size4K::SIZE, true),
            Err(MapError::NotMapped(VA + Size4K::SIZE))
        );
        assert!(aspace.is_mapped(VA));
    }
}
