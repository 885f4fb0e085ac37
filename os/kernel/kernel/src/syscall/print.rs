use crate::core_context::CoreContext;
use crate::error::FatalError;
use crate::machine::Machine;
use alloc::vec;
use kernel_console::Console;
use kernel_syscall::SUCCESS;
use kernel_vmem::addresses::{PageSize, Size4K, VirtualAddress};
use kernel_vmem::{Mapper, UserAccessError, copy_from_user};

/// Write exactly `len` bytes of the user buffer at `va` to the console.
///
/// Every page of the buffer is checked before anything is copied, so an
/// unmapped tail produces no partial output.
pub(super) fn print<C: Console>(
    ctx: &CoreContext,
    machine: &Machine<C>,
    va: VirtualAddress,
    len: u64,
) -> Result<i64, FatalError> {
    if len == 0 {
        return Ok(SUCCESS);
    }
    let aspace = &ctx.process.address_space;
    let end = va.checked_add(len).ok_or(UserAccessError::Overflow)?;

    let mut page = Some(va.align_down::<Size4K>());
    while let Some(p) = page
        && p < end
    {
        if aspace.translate(p).is_none() {
            return Err(UserAccessError::NotMapped(p.max(va)).into());
        }
        page = p.checked_add(Size4K::SIZE);
    }

    let len = usize::try_from(len).map_err(|_| UserAccessError::Overflow)?;
    let mut bytes = vec![0u8; len];
    copy_from_user(aspace, machine.frames(), va, &mut bytes)?;
    machine.console().write_bytes(&bytes);
    Ok(SUCCESS)
}
