use crate::core_context::CoreContext;
use crate::error::FatalError;
use crate::machine::Machine;
use kernel_console::Console;
use kernel_syscall::{FAILURE, SUCCESS, from_address};
use kernel_vmem::addresses::VirtualAddress;

pub(super) fn allocate<C: Console>(
    ctx: &mut CoreContext,
    machine: &Machine<C>,
    bytes: u64,
) -> Result<i64, FatalError> {
    let va = ctx
        .process
        .with_heap(machine.frames(), |heap, vmm| heap.allocate(vmm, bytes))?;
    Ok(from_address(va.as_u64()))
}

/// `-1` for an address no used block holds; the heap is left as it was.
pub(super) fn free<C: Console>(
    ctx: &mut CoreContext,
    machine: &Machine<C>,
    addr: VirtualAddress,
) -> Result<i64, FatalError> {
    match ctx
        .process
        .with_heap(machine.frames(), |heap, vmm| heap.free(vmm, addr))
    {
        Ok(()) => Ok(SUCCESS),
        Err(e) if e.is_recoverable() => Ok(FAILURE),
        Err(e) => Err(e.into()),
    }
}
