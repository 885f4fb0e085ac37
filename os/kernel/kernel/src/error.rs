use crate::trap::FaultKind;
use kernel_alloc::HeapError;
use kernel_vmem::UserAccessError;

/// Conditions after which a hart does not return to its user program.
///
/// The `Display` text is what the console shows before the halt, except
/// for faults and unexpected traps, which get a longer diagnostic.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FatalError {
    #[error("Unknown syscall {0}")]
    UnknownSyscall(u64),
    #[error("{kind}")]
    Fault { kind: FaultKind, mepc: u64, mtval: u64 },
    #[error("unexpected mcause {mcause:#x}")]
    UnexpectedTrap { mcause: u64, mepc: u64, mtval: u64 },
    #[error("print from an unreadable user buffer: {0}")]
    BadUserBuffer(#[from] UserAccessError),
    #[error("heap: {0}")]
    Heap(#[from] HeapError),
}
