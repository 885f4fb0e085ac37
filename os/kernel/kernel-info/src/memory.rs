//! # Memory Layout

use kernel_memory_addresses::{PageSize, Size4K};

/// First byte of DRAM; the firmware and kernel image are loaded here.
pub const DRAM_BASE: u64 = 0x8000_0000;

/// Start of the per-core user regions (stacks, kernel stacks, trap frames).
pub const USER_BASE: u64 = 0x8100_0000;

/// Bytes reserved per core starting at [`USER_BASE`].
pub const USER_SIZE: u64 = 0x0400_0000;

/// Size of each stack carved out of a core's user region.
pub const STACK_SIZE: u64 = 0x0010_0000;

/// Top of the user stack of `core`.
#[must_use]
pub const fn user_stack(core: u64) -> u64 {
    USER_BASE + USER_SIZE * core + STACK_SIZE
}

/// Top of the stack the kernel switches to when `core` traps.
#[must_use]
pub const fn user_kernel_stack(core: u64) -> u64 {
    USER_BASE + USER_SIZE * core + STACK_SIZE * 2
}

/// Trap frame used to save the user context of `core`.
#[must_use]
pub const fn user_trap_frame(core: u64) -> u64 {
    USER_BASE + USER_SIZE * core + STACK_SIZE * 3
}

/// First virtual address handed out by a fresh user heap.
pub const USER_HEAP_BASE: u64 = 0x0040_0000;

/// Virtual bytes a single user heap may grow into.
pub const USER_HEAP_SIZE: u64 = 0x4000_0000;

/// One past the last virtual address of the user heap window.
pub const USER_HEAP_END: u64 = USER_HEAP_BASE + USER_HEAP_SIZE;

/// Physical base of the page pool backing user heaps.
pub const FRAME_POOL_BASE: u64 = USER_BASE + USER_SIZE * crate::machine::NCPU as u64;

/// Number of 4 KiB frames in the page pool.
pub const FRAME_POOL_FRAMES: u64 = 1024;

const _: () = {
    assert!(USER_BASE > DRAM_BASE);
    assert!(USER_SIZE.is_multiple_of(Size4K::SIZE));
    assert!(STACK_SIZE * 3 < USER_SIZE);
    assert!(USER_HEAP_BASE.is_multiple_of(Size4K::SIZE));
    assert!(USER_HEAP_SIZE.is_multiple_of(Size4K::SIZE));
    assert!(FRAME_POOL_BASE.is_multiple_of(Size4K::SIZE));
    assert!(USER_HEAP_END < DRAM_BASE);
};
