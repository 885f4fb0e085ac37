use alloc::boxed::Box;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};

/// Core-local interruptor: one timer compare register per hart.
///
/// The deadlines live in atomics so every hart can re-arm its own register
/// through a shared `&Clint`. On riscv64 with the `asm` feature the new
/// deadline is also written to the memory-mapped `mtimecmp` of that hart.
pub struct Clint {
    mtimecmp: Box<[AtomicU64]>,
}

impl Clint {
    /// `harts` compare registers, each first firing at `first_deadline`.
    #[must_use]
    pub fn new(harts: usize, first_deadline: u64) -> Self {
        let mtimecmp: Vec<AtomicU64> = (0..harts).map(|_| AtomicU64::new(first_deadline)).collect();
        Self {
            mtimecmp: mtimecmp.into_boxed_slice(),
        }
    }

    #[must_use]
    pub fn harts(&self) -> usize {
        self.mtimecmp.len()
    }

    /// Current deadline of `hart`.
    #[must_use]
    pub fn mtimecmp(&self, hart: usize) -> Option<u64> {
        self.mtimecmp.get(hart).map(|r| r.load(Ordering::Acquire))
    }

    /// Push the deadline of `hart` one `interval` further and return it.
    ///
    /// The deadline advances from its previous value, not from the current
    /// time, so a late interrupt does not shift the cadence.
    pub fn rearm(&self, hart: usize, interval: u64) -> Option<u64> {
        let reg = self.mtimecmp.get(hart)?;
        let deadline = reg.fetch_add(interval, Ordering::AcqRel).wrapping_add(interval);

        #[cfg(all(feature = "asm", target_arch = "riscv64"))]
        unsafe {
            let mmio = kernel_info::machine::clint_mtimecmp(hart as u64) as *mut u64;
            core::ptr::write_volatile(mmio, deadline);
        }

        Some(deadline)
    }
}
