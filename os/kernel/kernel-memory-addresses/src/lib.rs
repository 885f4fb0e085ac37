//! # Virtual and Physical Memory Address Types
//!
//! Strongly typed wrappers for the addresses the heap, the page mapper and the
//! trap layer pass around. Mixing a user-virtual address with the physical
//! frame behind it is a type error rather than a silent bug.
//!
//! | Type | Meaning |
//! |------|---------|
//! | [`VirtualAddress`] | An address in a process's private (page-table translated) space. |
//! | [`PhysicalAddress`] | An address naming actual memory. |
//! | [`VirtualPage<S>`] / [`PhysicalPage<S>`] | A page-aligned base for page size `S`. |
//!
//! Only the Sv39 base page ([`Size4K`]) is used by this system; the
//! [`PageSize`] trait keeps the page size at the type level so conversions
//! stay explicit.
//!
//! ## Typical Usage
//!
//! ```rust
//! # use kernel_memory_addresses::*;
//! let va = VirtualAddress::new(0x0040_0020);
//! assert_eq!(va.page::<Size4K>().base().as_u64(), 0x0040_0000);
//! assert_eq!(va.offset::<Size4K>(), 0x20);
//! assert_eq!(va.align_up::<Size4K>().as_u64(), 0x0040_1000);
//! assert_eq!(align_up(0x65, 8), 0x68);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(clippy::inline_always)]

mod page;
mod page_size;
mod physical_address;
mod virtual_address;

pub use crate::page::{PhysicalPage, VirtualPage};
pub use crate::page_size::{PageSize, Size4K};
pub use crate::physical_address::PhysicalAddress;
pub use crate::virtual_address::VirtualAddress;

/// Round `value` up to the next multiple of `align` (a power of two).
///
/// Wraps on overflow; use [`checked_align_up`] for untrusted input.
#[inline]
#[must_use]
pub const fn align_up(value: u64, align: u64) -> u64 {
    debug_assert!(align.is_power_of_two());
    value.wrapping_add(align - 1) & !(align - 1)
}

/// Round `value` up to the next multiple of `align`, or `None` on overflow.
#[inline]
#[must_use]
pub const fn checked_align_up(value: u64, align: u64) -> Option<u64> {
    debug_assert!(align.is_power_of_two());
    match value.checked_add(align - 1) {
        Some(v) => Some(v & !(align - 1)),
        None => None,
    }
}

/// Round `value` down to a multiple of `align` (a power of two).
#[inline]
#[must_use]
pub const fn align_down(value: u64, align: u64) -> u64 {
    debug_assert!(align.is_power_of_two());
    value & !(align - 1)
}
