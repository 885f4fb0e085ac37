//! # Machine Configuration and Memory Layout
//!
//! Compile-time constants shared by every layer of the privileged-mode support
//! code: how many harts the machine has, how often the machine timer fires,
//! where DRAM starts, and how each core's user process is laid out.
//!
//! ## Modules
//!
//! ### Machine ([`machine`])
//! Hart count and timer cadence. These drive the exit barrier (every hart must
//! arrive) and the timer re-arm interval.
//!
//! ### Memory Layout ([`memory`])
//! Physical and user-virtual layout:
//!
//! ```text
//! Physical:
//! DRAM_BASE        ┌──────────────────────────────┐ 0x8000_0000
//!                  │  firmware + kernel image     │
//! USER_BASE        ├──────────────────────────────┤ 0x8100_0000
//!                  │  per-core stacks and frames  │ USER_SIZE per core
//! FRAME_POOL_BASE  ├──────────────────────────────┤
//!                  │  page pool for user heaps    │ FRAME_POOL_FRAMES × 4 KiB
//!                  └──────────────────────────────┘
//!
//! User virtual (per core, private page table):
//! USER_HEAP_BASE   ┌──────────────────────────────┐ 0x0040_0000
//!                  │  heap, grows upwards only    │
//! USER_HEAP_END    └──────────────────────────────┘
//! ```
//!
//! Runtime structures (`HeapConfig`, `MachineConfig`) take their defaults from
//! here; nothing in this crate allocates or holds state.

#![cfg_attr(not(any(test, doctest)), no_std)]

pub mod machine;
pub mod memory;
