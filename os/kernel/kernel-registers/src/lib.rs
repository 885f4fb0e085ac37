//! # Typed RISC-V Machine-Mode Registers
//!
//! Bit-level models of the control and status registers the trap layer reads
//! and writes: the trap cause ([`Mcause`]) and the interrupt-pending bits
//! ([`Mip`], whose supervisor view is `sip`). The values are plain
//! `bitfield-struct` types so they can be built and inspected on any host;
//! actual CSR access is only compiled in with the `asm` feature on riscv64.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod mcause;
pub mod mip;

pub use mcause::Mcause;
pub use mip::Mip;

pub trait LoadRegisterUnsafe {
    /// # Safety
    /// The caller must uphold the implementation-specific safety requirements.
    /// Machine-mode CSRs are only accessible while running in M-mode.
    unsafe fn load_unsafe() -> Self;
}

pub trait StoreRegisterUnsafe {
    /// # Safety
    /// The caller must uphold the implementation-specific safety requirements.
    /// Machine-mode CSRs are only accessible while running in M-mode.
    unsafe fn store_unsafe(self);
}

/// Read the raw `mepc` CSR (address of the trapping instruction).
///
/// # Safety
/// Must run in M-mode.
#[cfg(all(feature = "asm", target_arch = "riscv64"))]
#[must_use]
pub unsafe fn read_mepc() -> u64 {
    let v: u64;
    unsafe {
        core::arch::asm!("csrr {}, mepc", out(reg) v, options(nomem, nostack, preserves_flags));
    }
    v
}

/// Read the raw `mtval` CSR (faulting address or instruction bits).
///
/// # Safety
/// Must run in M-mode.
#[cfg(all(feature = "asm", target_arch = "riscv64"))]
#[must_use]
pub unsafe fn read_mtval() -> u64 {
    let v: u64;
    unsafe {
        core::arch::asm!("csrr {}, mtval", out(reg) v, options(nomem, nostack, preserves_flags));
    }
    v
}
