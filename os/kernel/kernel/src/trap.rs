//! # Machine-Mode Trap Handling
//!
//! [`handle_trap`] is the single entry point. It decodes `mcause` into a
//! [`TrapCause`] and applies that cause's policy:
//!
//! | Cause | Effect | Outcome |
//! |-------|--------|---------|
//! | [`TrapCause::Timer`] | `mtimecmp += interval`, raise `sip.SSIP`, count the tick | `Resume` |
//! | [`TrapCause::EnvironmentCall`] | run the system call, result to `a0`, `mepc += 4` | `Resume`, or `Halt` after `exit` |
//! | [`TrapCause::Fault`] | print the fault with its source line | `Halt(Fatal)` |
//! | [`TrapCause::Unexpected`] | print `mcause`, `mepc`, `mtval` | `Halt(Fatal)` |
//!
//! Saving and restoring user registers around the call is the trap
//! vector's job; the handler only sees the [`TrapFrame`] in the context.

mod cause;
mod diagnostics;

pub use cause::{FaultKind, TrapCause};

use crate::core_context::CoreContext;
use crate::error::FatalError;
use crate::machine::Machine;
use crate::syscall::{self, SyscallOutcome};
use kernel_console::Console;
use kernel_registers::Mcause;
use kernel_syscall::{SyscallArgs, to_register};
use log::{error, trace, warn};

/// Width of `ecall`; the user resumes after it.
const ECALL_LENGTH: u64 = 4;

/// User registers the trap path reads and writes.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[repr(C)]
pub struct TrapFrame {
    /// `a0`..`a7`: system call number and arguments in, result out in `a0`.
    pub a: [u64; 8],
    /// Address of the trapping instruction; where the user resumes.
    pub mepc: u64,
}

/// Where a hart goes after a trap.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrapOutcome {
    /// Return to the interrupted user program.
    Resume,
    /// Never return; see [`halt`].
    Halt(HaltReason),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HaltReason {
    /// This hart powered the machine off with the given exit code.
    PowerOff { code: i64 },
    /// This hart exited and waits for the power-off.
    Parked,
    Fatal(FatalError),
}

/// Handle one trap on the hart owning `ctx`.
///
/// `mcause` and `mtval` are the CSR values at entry; `mepc` is in
/// `ctx.frame`.
pub fn handle_trap<C: Console>(
    ctx: &mut CoreContext,
    machine: &Machine<C>,
    mcause: Mcause,
    mtval: u64,
) -> TrapOutcome {
    let mepc = ctx.frame.mepc;
    let result = match TrapCause::from(mcause) {
        TrapCause::Timer => {
            handle_timer(ctx, machine);
            Ok(TrapOutcome::Resume)
        }
        TrapCause::EnvironmentCall => handle_ecall(ctx, machine),
        TrapCause::Fault(kind) => Err(FatalError::Fault { kind, mepc, mtval }),
        TrapCause::Unexpected(cause) => Err(FatalError::UnexpectedTrap {
            mcause: cause.into_bits(),
            mepc,
            mtval,
        }),
    };

    result.unwrap_or_else(|err| {
        error!("hart {}: {err} (mepc={mepc:#x})", ctx.hart());
        diagnostics::report(
            machine.console(),
            &ctx.process.line_table,
            machine.sources(),
            &err,
        );
        TrapOutcome::Halt(HaltReason::Fatal(err))
    })
}

fn handle_timer<C: Console>(ctx: &mut CoreContext, machine: &Machine<C>) {
    let interval = machine.config().timer_interval;
    match machine.clint().rearm(ctx.hart(), interval) {
        Some(deadline) => trace!("hart {}: next timer at {deadline}", ctx.hart()),
        None => warn!("hart {} has no timer compare register", ctx.hart()),
    }
    ctx.raise_soft_interrupt();
    ctx.count_tick();
}

fn handle_ecall<C: Console>(
    ctx: &mut CoreContext,
    machine: &Machine<C>,
) -> Result<TrapOutcome, FatalError> {
    let args = SyscallArgs::from_registers(ctx.frame.a);
    match syscall::dispatch(ctx, machine, args)? {
        SyscallOutcome::Return(value) => {
            ctx.frame.a[0] = to_register(value);
            ctx.frame.mepc = ctx.frame.mepc.wrapping_add(ECALL_LENGTH);
            Ok(TrapOutcome::Resume)
        }
        SyscallOutcome::Exited(reason) => Ok(TrapOutcome::Halt(reason)),
    }
}

/// Read the trap CSRs and handle the trap of the current hart.
///
/// # Safety
/// Must run in M-mode on the hart owning `ctx`, with `ctx.frame` holding
/// the registers the trap vector saved.
#[cfg(all(feature = "asm", target_arch = "riscv64"))]
pub unsafe fn handle_current_trap<C: Console>(
    ctx: &mut CoreContext,
    machine: &Machine<C>,
) -> TrapOutcome {
    use kernel_registers::LoadRegisterUnsafe;
    let (mcause, mepc, mtval) = unsafe {
        (
            Mcause::load_unsafe(),
            kernel_registers::read_mepc(),
            kernel_registers::read_mtval(),
        )
    };
    ctx.frame.mepc = mepc;
    handle_trap(ctx, machine, mcause, mtval)
}

/// Stop this hart for good.
pub fn halt(reason: HaltReason) -> ! {
    match reason {
        HaltReason::PowerOff { code } => log::info!("halting after power-off, code {code}"),
        HaltReason::Parked => log::debug!("hart parked"),
        HaltReason::Fatal(err) => error!("halting: {err}"),
    }
    loop {
        #[cfg(all(feature = "asm", target_arch = "riscv64"))]
        unsafe {
            core::arch::asm!("wfi", options(nomem, nostack));
        }
        core::hint::spin_loop();
    }
}
