use crate::core_context::CoreContext;
use crate::machine::{Machine, ShutdownRecord};
use crate::trap::HaltReason;
use kernel_console::{Console, console_print};
use kernel_info::machine::BOOT_HART;
use log::{debug, info};

/// Announce the exit, then wait until every hart has exited.
///
/// The boot hart powers the machine off once the barrier opens; every
/// other hart parks. No hart tears anything down before all have arrived.
pub(super) fn exit<C: Console>(ctx: &CoreContext, machine: &Machine<C>, code: i64) -> HaltReason {
    let hart = ctx.hart();
    console_print!(machine.console(), "User exit with code:{code}.\n");
    info!("hart {hart} exits with code {code}");

    let order = machine.exit_barrier().arrive_and_wait();
    debug!("hart {hart} left the exit barrier (arrival {order})");

    if hart != BOOT_HART {
        return HaltReason::Parked;
    }
    machine.power().power_off(ShutdownRecord {
        code,
        hart,
        arrived: machine.exit_barrier().arrived(),
    });
    HaltReason::PowerOff { code }
}
