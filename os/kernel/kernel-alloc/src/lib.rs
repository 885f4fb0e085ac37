//! # User Heap and Physical Page Management
//!
//! This crate provides the memory side of the privileged-mode support layer:
//! the physical page pool shared by every hart, a thin virtual memory manager
//! on top of a process address space, and the per-process block allocator
//! that serves the `allocate`/`free` system calls.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 User Heap ([`heap`])                │
//! │    • first-fit over an address-ordered free list    │
//! │    • split on allocate, coalesce on free            │
//! │    • grows by whole pages, trims whole pages        │
//! └─────────────────┬───────────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────────┐
//! │        Virtual Memory Manager ([`vmm`])             │
//! │    • map a fresh zeroed frame at a user address     │
//! │    • unmap and release pages                        │
//! └─────────────────┬───────────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────────┐
//! │          Physical Frame Pool ([`frame_pool`])       │
//! │    • bitmap of 4 KiB frames                         │
//! │    • zero-filled on allocation                      │
//! │    • serialized across harts                        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//!
//! The heap state (used list, free list, growth pointer) belongs to exactly
//! one core's process and is only ever touched from that core, so
//! [`UserHeap`] needs `&mut self` and no lock. The frame pool is the only
//! shared structure and locks internally.
//!
//! ## Usage
//!
//! ```rust
//! use kernel_alloc::frame_pool::FramePool;
//! use kernel_alloc::heap::{HeapConfig, UserHeap};
//! use kernel_alloc::vmm::Vmm;
//! use kernel_vmem::AddressSpace;
//! use kernel_vmem::addresses::PhysicalAddress;
//!
//! let frames = FramePool::new(PhysicalAddress::new(0x8200_0000), 16);
//! let mut aspace = AddressSpace::new();
//! let mut heap = UserHeap::new(HeapConfig::default());
//!
//! let mut vmm = Vmm::new(&mut aspace, &frames);
//! let p = heap.allocate(&mut vmm, 100).unwrap();
//! assert_eq!(heap.mapped_pages(), 1);
//! heap.free(&mut vmm, p).unwrap();
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

extern crate alloc;

pub mod frame_pool;
pub mod heap;
pub mod vmm;

pub use frame_pool::FramePool;
pub use heap::{Block, HeapConfig, HeapError, UserHeap};
pub use vmm::{Vmm, VmmError};
