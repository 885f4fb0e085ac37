use crate::line_table::LineTable;
use crate::trap::TrapFrame;
use kernel_alloc::{HeapConfig, UserHeap, Vmm};
use kernel_info::memory::{user_kernel_stack, user_stack, user_trap_frame};
use kernel_vmem::AddressSpace;
use kernel_vmem::FrameAlloc;
use log::debug;

/// The user program a hart runs: its page table, heap and line table.
pub struct Process {
    pub address_space: AddressSpace,
    pub heap: UserHeap,
    pub line_table: LineTable,
}

impl Process {
    #[must_use]
    pub const fn new(heap: HeapConfig) -> Self {
        Self {
            address_space: AddressSpace::new(),
            heap: UserHeap::new(heap),
            line_table: LineTable::new(),
        }
    }

    /// Run `f` with this process's heap and a [`Vmm`] over its address
    /// space backed by `frames`.
    pub fn with_heap<A: FrameAlloc, R>(
        &mut self,
        frames: &A,
        f: impl FnOnce(&mut UserHeap, &mut Vmm<'_, AddressSpace, A>) -> R,
    ) -> R {
        let mut vmm = Vmm::new(&mut self.address_space, frames);
        f(&mut self.heap, &mut vmm)
    }
}

/// Everything one hart owns while it handles traps.
///
/// A context is never shared: the trap path takes it by `&mut`, which is
/// what lets the heap run without locks.
pub struct CoreContext {
    hart: usize,
    pub process: Process,
    /// User registers saved on trap entry.
    pub frame: TrapFrame,
    ticks: u64,
    soft_pending: bool,
}

impl CoreContext {
    #[must_use]
    pub fn new(hart: usize, heap: HeapConfig) -> Self {
        let core = hart as u64;
        debug!(
            "hart {hart}: user stack {:#x}, kernel stack {:#x}, trap frame {:#x}",
            user_stack(core),
            user_kernel_stack(core),
            user_trap_frame(core)
        );
        Self {
            hart,
            process: Process::new(heap),
            frame: TrapFrame::default(),
            ticks: 0,
            soft_pending: false,
        }
    }

    #[must_use]
    pub const fn hart(&self) -> usize {
        self.hart
    }

    /// Timer interrupts handled on this hart.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    pub(crate) const fn count_tick(&mut self) {
        self.ticks += 1;
    }

    /// Mark a supervisor software interrupt pending (`sip.SSIP`).
    pub(crate) fn raise_soft_interrupt(&mut self) {
        self.soft_pending = true;

        #[cfg(all(feature = "asm", target_arch = "riscv64"))]
        unsafe {
            use kernel_registers::StoreRegisterUnsafe;
            kernel_registers::Mip::SIP_SSIP.store_unsafe();
        }
    }

    #[must_use]
    pub const fn soft_interrupt_pending(&self) -> bool {
        self.soft_pending
    }

    /// Consume the pending software interrupt, as the supervisor does on
    /// re-entry. Returns whether one was pending.
    pub const fn take_soft_interrupt(&mut self) -> bool {
        let pending = self.soft_pending;
        self.soft_pending = false;
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_interrupt_is_consumed_once() {
        let mut ctx = CoreContext::new(1, HeapConfig::default());
        assert!(!ctx.take_soft_interrupt());
        ctx.raise_soft_interrupt();
        assert!(ctx.soft_interrupt_pending());
        assert!(ctx.take_soft_interrupt());
        assert!(!ctx.take_soft_interrupt());
        assert_eq!(ctx.hart(), 1);
    }
}
