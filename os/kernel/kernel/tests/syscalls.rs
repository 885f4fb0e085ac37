use kernel::syscall::{SyscallOutcome, dispatch};
use kernel::{CoreContext, FatalError, HaltReason, Machine, MachineConfig, TrapOutcome, handle_trap};
use kernel_alloc::{HeapError, VmmError};
use kernel_console::BufferConsole;
use kernel_info::memory::USER_HEAP_BASE;
use kernel_registers::Mcause;
use kernel_syscall::{SyscallArgs, Sysno, to_register};
use kernel_vmem::addresses::{PageSize, Size4K, VirtualAddress};
use kernel_vmem::{UserAccessError, copy_to_user};

const PAGE: u64 = Size4K::SIZE;
const ECALL: Mcause = Mcause::exception(Mcause::USER_ECALL);

fn machine(frames: u64) -> Machine<BufferConsole> {
    Machine::new(
        MachineConfig::default().with_cores(1).with_frames(frames),
        BufferConsole::new(),
    )
}

/// Issue `sysno(args..)` through the trap path the way a user `ecall` does.
fn ecall(ctx: &mut CoreContext, machine: &Machine<BufferConsole>, sysno: u64, args: &[u64]) -> TrapOutcome {
    ctx.frame.a = [0; 8];
    ctx.frame.a[0] = sysno;
    ctx.frame.a[1..=args.len()].copy_from_slice(args);
    handle_trap(ctx, machine, ECALL, 0)
}

#[test]
fn allocate_returns_the_first_payload_address() {
    let m = machine(16);
    let mut ctx = m.core_context(0).unwrap();
    ctx.frame.mepc = 0x8100_0100;

    assert_eq!(ecall(&mut ctx, &m, Sysno::Allocate.into(), &[100]), TrapOutcome::Resume);
    assert_eq!(ctx.frame.a[0], USER_HEAP_BASE + 32);
    assert_eq!(ctx.frame.mepc, 0x8100_0104);
    assert_eq!(m.frames().allocated(), 1);
}

#[test]
fn allocate_then_free_round_trips() {
    let m = machine(16);
    let mut ctx = m.core_context(0).unwrap();

    ecall(&mut ctx, &m, Sysno::Allocate.into(), &[PAGE + 100]);
    let va = ctx.frame.a[0];
    assert_eq!(m.frames().allocated(), 2);

    assert_eq!(ecall(&mut ctx, &m, Sysno::Free.into(), &[va]), TrapOutcome::Resume);
    assert_eq!(ctx.frame.a[0], 0);
    assert_eq!(m.frames().allocated(), 1);
    ctx.process.heap.audit(&ctx.process.address_space).unwrap();
}

#[test]
fn free_of_a_foreign_address_returns_minus_one() {
    let m = machine(16);
    let mut ctx = m.core_context(0).unwrap();
    ecall(&mut ctx, &m, Sysno::Allocate.into(), &[64]);
    let free_before = ctx.process.heap.free_bytes();

    assert_eq!(ecall(&mut ctx, &m, Sysno::Free.into(), &[0xdead_0000]), TrapOutcome::Resume);
    assert_eq!(ctx.frame.a[0], to_register(-1));
    assert_eq!(ctx.process.heap.free_bytes(), free_before);
    assert_eq!(ctx.process.heap.used_blocks().len(), 1);
}

#[test]
fn print_copies_across_a_page_boundary() {
    let m = machine(16);
    let mut ctx = m.core_context(0).unwrap();
    ecall(&mut ctx, &m, Sysno::Allocate.into(), &[PAGE + 100]);

    let msg = b"hello, world\n";
    let va = VirtualAddress::new(USER_HEAP_BASE + PAGE - 5);
    copy_to_user(&ctx.process.address_space, m.frames(), va, msg).unwrap();

    let outcome = ecall(&mut ctx, &m, Sysno::Print.into(), &[va.as_u64(), msg.len() as u64]);
    assert_eq!(outcome, TrapOutcome::Resume);
    assert_eq!(ctx.frame.a[0], 0);
    assert_eq!(m.console().bytes(), msg);
}

#[test]
fn print_writes_exactly_the_requested_length() {
    let m = machine(16);
    let mut ctx = m.core_context(0).unwrap();
    ecall(&mut ctx, &m, Sysno::Allocate.into(), &[32]);
    let va = VirtualAddress::new(ctx.frame.a[0]);
    copy_to_user(&ctx.process.address_space, m.frames(), va, b"abc\0def").unwrap();

    ecall(&mut ctx, &m, Sysno::Print.into(), &[va.as_u64(), 7]);
    assert_eq!(m.console().bytes(), b"abc\0def");

    ecall(&mut ctx, &m, Sysno::Print.into(), &[va.as_u64(), 0]);
    assert_eq!(m.console().bytes().len(), 7);
}

#[test]
fn print_from_unmapped_memory_halts() {
    let m = machine(16);
    let mut ctx = m.core_context(0).unwrap();
    let va = VirtualAddress::new(0x1000);

    let outcome = ecall(&mut ctx, &m, Sysno::Print.into(), &[va.as_u64(), 8]);
    assert_eq!(
        outcome,
        TrapOutcome::Halt(HaltReason::Fatal(FatalError::BadUserBuffer(
            UserAccessError::NotMapped(va)
        )))
    );
    assert!(m.console().contents().starts_with("print from an unreadable user buffer"));
}

#[test]
fn print_with_an_unmapped_tail_prints_nothing() {
    let m = machine(16);
    let mut ctx = m.core_context(0).unwrap();
    ecall(&mut ctx, &m, Sysno::Allocate.into(), &[64]);
    let va = ctx.frame.a[0];

    let outcome = ecall(&mut ctx, &m, Sysno::Print.into(), &[va, PAGE]);
    let tail = VirtualAddress::new(USER_HEAP_BASE + PAGE);
    assert_eq!(
        outcome,
        TrapOutcome::Halt(HaltReason::Fatal(FatalError::BadUserBuffer(
            UserAccessError::NotMapped(tail)
        )))
    );
    // the diagnostic is the only output; no user bytes went out first
    assert!(m.console().contents().starts_with("print from an unreadable user buffer"));
}

#[test]
fn scenario_c_unknown_syscall_halts_with_a_diagnostic() {
    let m = machine(4);
    let mut ctx = m.core_context(0).unwrap();
    ctx.frame.mepc = 0x8100_0000;

    let outcome = ecall(&mut ctx, &m, 999, &[1, 2, 3]);
    assert_eq!(
        outcome,
        TrapOutcome::Halt(HaltReason::Fatal(FatalError::UnknownSyscall(999)))
    );
    assert_eq!(m.console().contents(), "Unknown syscall 999\n");
    // no return value, no resume
    assert_eq!(ctx.frame.a[0], 999);
    assert_eq!(ctx.frame.mepc, 0x8100_0000);
}

#[test]
fn running_out_of_frames_is_fatal() {
    let m = machine(1);
    let mut ctx = m.core_context(0).unwrap();

    let outcome = ecall(&mut ctx, &m, Sysno::Allocate.into(), &[2 * PAGE]);
    assert_eq!(
        outcome,
        TrapOutcome::Halt(HaltReason::Fatal(FatalError::Heap(HeapError::Vmm(
            VmmError::OutOfMemory
        ))))
    );
}

#[test]
fn dispatch_can_be_driven_without_a_trap() {
    let m = machine(4);
    let mut ctx = m.core_context(0).unwrap();
    let args = SyscallArgs::new(Sysno::Allocate.into(), [8, 0, 0, 0, 0, 0, 0]);

    let outcome = dispatch(&mut ctx, &m, args).unwrap();
    assert_eq!(outcome, SyscallOutcome::Return((USER_HEAP_BASE + 32) as i64));
    assert_eq!(
        dispatch(&mut ctx, &m, SyscallArgs::new(12, [0; 7])),
        Err(FatalError::UnknownSyscall(12))
    );
}
