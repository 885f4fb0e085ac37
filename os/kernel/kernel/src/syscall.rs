//! # System Call Dispatch
//!
//! [`dispatch`] decodes the call number and routes to one handler. It keeps
//! no state of its own: everything a handler touches comes in through the
//! calling hart's [`CoreContext`] or the shared [`Machine`].
//!
//! | Call | Arguments | Result |
//! |------|-----------|--------|
//! | `print` | buffer address, length | `0` |
//! | `exit` | status | never returns to the user |
//! | `allocate` | byte count | block address |
//! | `free` | address inside a block | `0`, or `-1` if no block holds it |
//!
//! An unknown call number is fatal: there is no caller that could make
//! sense of an error code for a call it should not have made.

mod exit;
mod memory;
mod print;

use crate::core_context::CoreContext;
use crate::error::FatalError;
use crate::machine::Machine;
use crate::trap::HaltReason;
use kernel_console::Console;
use kernel_syscall::{SyscallArgs, Sysno, UnknownSyscall};
use kernel_vmem::addresses::VirtualAddress;
use log::debug;

/// What the trap path does after a call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SyscallOutcome {
    /// Hand the value back in `a0`.
    Return(i64),
    /// The caller is gone; the hart stops.
    Exited(HaltReason),
}

/// Run the call in `args` on behalf of the hart owning `ctx`.
///
/// # Errors
/// Every error is fatal for the calling hart.
pub fn dispatch<C: Console>(
    ctx: &mut CoreContext,
    machine: &Machine<C>,
    args: SyscallArgs,
) -> Result<SyscallOutcome, FatalError> {
    let sysno = args
        .sysno()
        .map_err(|UnknownSyscall(number)| FatalError::UnknownSyscall(number))?;
    debug!(
        "hart {}: {}({:#x}, {:#x})",
        ctx.hart(),
        sysno.name(),
        args.arg(0),
        args.arg(1)
    );

    let value = match sysno {
        Sysno::Print => print::print(ctx, machine, VirtualAddress::new(args.arg(0)), args.arg(1))?,
        Sysno::Exit => {
            #[allow(clippy::cast_possible_wrap)]
            let code = args.arg(0) as i64;
            return Ok(SyscallOutcome::Exited(exit::exit(ctx, machine, code)));
        }
        Sysno::Allocate => memory::allocate(ctx, machine, args.arg(0))?,
        Sysno::Free => memory::free(ctx, machine, VirtualAddress::new(args.arg(0)))?,
    };
    Ok(SyscallOutcome::Return(value))
}
