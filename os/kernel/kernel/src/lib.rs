//! # Privileged-Mode Trap and Syscall Layer
//!
//! Everything that runs when a hart traps out of its user program: the
//! machine-mode trap handler, the system call dispatcher behind the user
//! `ecall`, and the glue between both and the per-core user heap.
//!
//! ## State
//!
//! ```text
//!                 ┌──────────────────── Machine<C> (shared) ─────────────────────┐
//!                 │ FramePool · Clint · exit Rendezvous · PowerController · C    │
//!                 └──────────────────────────────────────────────────────────────┘
//!                        ▲                      ▲                      ▲
//!      &Machine          │                      │                      │
//! ┌──── CoreContext 0 ───┴───┐   ┌──── CoreContext 1 ───┴───┐        ...
//! │ TrapFrame · ticks · SSIP │   │ TrapFrame · ticks · SSIP │
//! │ Process (aspace, heap,   │   │ Process (aspace, heap,   │
//! │          line table)     │   │          line table)     │
//! └──────────────────────────┘   └──────────────────────────┘
//! ```
//!
//! Each hart owns its [`CoreContext`] exclusively (`&mut`), so the heap
//! lists are never shared and never locked. The only state harts share is
//! the [`Machine`]: the page pool, the timer compare registers, the exit
//! barrier, the power-off record and the console. Each of those serializes
//! itself.
//!
//! ## Control flow
//!
//! ```text
//! trap ─▶ handle_trap ─▶ TrapCause
//!           │  Timer ─────────▶ re-arm mtimecmp, raise SSIP ─▶ Resume
//!           │  EnvironmentCall ▶ syscall::dispatch ─▶ a0, mepc += 4 ─▶ Resume
//!           │                                     └▶ exit ─▶ Halt(PowerOff | Parked)
//!           │  Fault ─────────▶ diagnostic ─▶ Halt(Fatal)
//!           └  Unexpected ────▶ register dump ─▶ Halt(Fatal)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use kernel::{Machine, MachineConfig, TrapOutcome};
//! use kernel_console::BufferConsole;
//! use kernel_registers::Mcause;
//! use kernel_syscall::Sysno;
//!
//! let machine = Machine::new(MachineConfig::default(), BufferConsole::new());
//! let mut ctx = machine.core_context(0).unwrap();
//!
//! ctx.frame.a[0] = Sysno::Allocate.into();
//! ctx.frame.a[1] = 100;
//! let outcome = kernel::handle_trap(&mut ctx, &machine, Mcause::exception(Mcause::USER_ECALL), 0);
//! assert_eq!(outcome, TrapOutcome::Resume);
//! assert_eq!(ctx.frame.a[0], kernel_info::memory::USER_HEAP_BASE + 32);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

extern crate alloc;

mod clint;
mod config;
mod core_context;
mod error;
mod line_table;
mod machine;
pub mod syscall;
pub mod trap;

pub use clint::Clint;
pub use config::MachineConfig;
pub use core_context::{CoreContext, Process};
pub use error::FatalError;
pub use line_table::{
    LineEntry, LineTable, MemorySources, NoSources, SourceFile, SourceLocation, SourceReader,
};
pub use machine::{Machine, PowerController, ShutdownRecord};
pub use trap::{HaltReason, TrapFrame, TrapOutcome, handle_trap};
