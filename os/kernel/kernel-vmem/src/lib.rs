//! # Virtual Memory Support
//!
//! The narrow contracts the heap allocator consumes, plus a software
//! reference implementation of each so the allocator can run and be tested
//! off-target.
//!
//! ## Contracts
//!
//! | Trait | Role |
//! |-------|------|
//! | [`FrameAlloc`] | Page Provider: hands out and takes back zero-filled 4 KiB frames. Shared by all harts, so it takes `&self` and must serialize internally. |
//! | [`PhysMapper`] | Byte access to physical memory (the kernel runs direct-mapped). |
//! | [`Mapper`] | Address Space Mapper: installs/removes `va → pa` mappings with permission bits and translates. |
//!
//! ## Sv39 leaf entries
//!
//! [`AddressSpace`] keeps one [`PageTableEntry`] per mapped 4 KiB page. The
//! entry layout follows the Sv39 PTE:
//!
//! ```text
//! | 63‒54 | 53‒10 | 9‒8 | 7 | 6 | 5 | 4 | 3 | 2 | 1 | 0 |
//! |  rsv  |  PPN  | RSW | D | A | G | U | X | W | R | V |
//! ```
//!
//! Permissions requested through [`Protection`] are translated to the
//! `R/W/X/U` bits; `V` is set for every installed leaf.

#![cfg_attr(not(any(test, doctest)), no_std)]

extern crate alloc;

mod address_space;
mod page_table_entry;
mod user_access;

pub use crate::address_space::AddressSpace;
pub use crate::page_table_entry::{PageTableEntry, Protection};
pub use crate::user_access::{UserAccessError, copy_from_user, copy_to_user};
pub use kernel_memory_addresses as addresses;

use kernel_memory_addresses::{PhysicalAddress, VirtualAddress};

/// Page Provider contract.
///
/// Frames are 4 KiB, page aligned, and **zero-filled** when handed out.
/// The provider is the one resource shared by every hart; implementations
/// serialize concurrent callers themselves.
pub trait FrameAlloc {
    /// Allocate one frame, or `None` when the pool is exhausted.
    fn alloc_page(&self) -> Option<PhysicalAddress>;

    /// Return a frame previously obtained from [`alloc_page`](Self::alloc_page).
    fn free_page(&self, frame: PhysicalAddress);
}

/// Byte-level access to physical memory.
pub trait PhysMapper {
    /// Copy `buf.len()` bytes starting at `pa` into `buf`.
    ///
    /// # Errors
    /// [`PhysAccessError::OutOfRange`] if any byte lies outside backed memory.
    fn read_phys(&self, pa: PhysicalAddress, buf: &mut [u8]) -> Result<(), PhysAccessError>;

    /// Copy `data` to physical memory starting at `pa`.
    ///
    /// # Errors
    /// [`PhysAccessError::OutOfRange`] if any byte lies outside backed memory.
    fn write_phys(&self, pa: PhysicalAddress, data: &[u8]) -> Result<(), PhysAccessError>;
}

/// Address Space Mapper contract.
///
/// Addresses passed to [`map`](Self::map) and [`unmap`](Self::unmap) must be
/// page aligned; `len` is rounded up to whole pages.
pub trait Mapper {
    /// Map `len` bytes at `va` onto the physically contiguous range at `pa`.
    ///
    /// # Errors
    /// Fails without changing any mapping if the range is unaligned or any
    /// page in it is already mapped.
    fn map(
        &mut self,
        va: VirtualAddress,
        len: u64,
        pa: PhysicalAddress,
        prot: Protection,
    ) -> Result<(), MapError>;

    /// Remove the mappings for `len` bytes at `va`. With `release`, every
    /// backing frame goes back to `frames`.
    ///
    /// # Errors
    /// Fails without changing any mapping if the range is unaligned or any
    /// page in it is not mapped.
    fn unmap<A: FrameAlloc>(
        &mut self,
        frames: &A,
        va: VirtualAddress,
        len: u64,
        release: bool,
    ) -> Result<(), MapError>;

    /// Translate `va` to the physical address backing it.
    fn translate(&self, va: VirtualAddress) -> Option<PhysicalAddress>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("address {0} is not page aligned")]
    Unaligned(VirtualAddress),
    #[error("frame {0} is not page aligned")]
    UnalignedFrame(PhysicalAddress),
    #[error("page at {0} is already mapped")]
    AlreadyMapped(VirtualAddress),
    #[error("page at {0} is not mapped")]
    NotMapped(VirtualAddress),
    #[error("mapping range overflows the address space")]
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PhysAccessError {
    #[error("physical range {addr}+{len:#x} is not backed by memory")]
    OutOfRange { addr: PhysicalAddress, len: u64 },
}
