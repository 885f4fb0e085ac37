use kernel::trap::FaultKind;
use kernel::{FatalError, HaltReason, Machine, MachineConfig, MemorySources, TrapOutcome, handle_trap};
use kernel_console::BufferConsole;
use kernel_info::machine::TIMER_INTERVAL;
use kernel_registers::Mcause;

const FAULT_PC: u64 = 0x8100_0038;

fn machine() -> Machine<BufferConsole> {
    Machine::new(MachineConfig::default().with_frames(8), BufferConsole::new())
}

#[test]
fn timer_rearms_and_raises_a_soft_interrupt() {
    let m = machine();
    let mut ctx = m.core_context(1).unwrap();
    ctx.frame.mepc = 0x8100_0200;
    ctx.frame.a[0] = 42;
    let before = ctx.frame;

    let timer = Mcause::interrupt_of(Mcause::MACHINE_TIMER);
    assert_eq!(handle_trap(&mut ctx, &m, timer, 0), TrapOutcome::Resume);
    assert_eq!(m.clint().mtimecmp(1), Some(2 * TIMER_INTERVAL));
    assert_eq!(m.clint().mtimecmp(0), Some(TIMER_INTERVAL));
    assert_eq!(ctx.ticks(), 1);
    assert!(ctx.take_soft_interrupt());
    // the interrupted program resumes exactly where it was
    assert_eq!(ctx.frame, before);

    assert_eq!(handle_trap(&mut ctx, &m, timer, 0), TrapOutcome::Resume);
    assert_eq!(m.clint().mtimecmp(1), Some(3 * TIMER_INTERVAL));
    assert_eq!(ctx.ticks(), 2);
    assert!(m.console().contents().is_empty());
}

#[test]
fn fault_quotes_the_source_line() {
    let source = "#include \"user_lib.h\"\n\nint main(void) {\n  asm volatile(\"csrw sscratch, 0\");\n  return 0;\n}\n";
    let m = machine().with_sources(MemorySources::new().with_file("user/app_errorline.c", source));
    let mut ctx = m.core_context(0).unwrap();
    let lines = &mut ctx.process.line_table;
    let dir = lines.add_dir("user");
    let file = lines.add_file(dir, "app_errorline.c");
    lines.add_line(FAULT_PC - 8, file, 3);
    lines.add_line(FAULT_PC, file, 4);
    ctx.frame.mepc = FAULT_PC;

    let outcome = handle_trap(&mut ctx, &m, Mcause::exception(Mcause::ILLEGAL_INSTRUCTION), 0x1401_1073);
    assert_eq!(
        outcome,
        TrapOutcome::Halt(HaltReason::Fatal(FatalError::Fault {
            kind: FaultKind::IllegalInstruction,
            mepc: FAULT_PC,
            mtval: 0x1401_1073,
        }))
    );
    assert_eq!(
        m.console().contents(),
        "Runtime error at user/app_errorline.c:4\n  asm volatile(\"csrw sscratch, 0\");\nIllegal instruction!\n"
    );
}

#[test]
fn fault_without_a_line_table_match_prints_the_fault_only() {
    let m = machine();
    let mut ctx = m.core_context(0).unwrap();
    ctx.frame.mepc = FAULT_PC;

    let outcome = handle_trap(&mut ctx, &m, Mcause::exception(Mcause::LOAD_ACCESS_FAULT), 0);
    assert!(matches!(outcome, TrapOutcome::Halt(HaltReason::Fatal(_))));
    assert_eq!(m.console().contents(), "Load access fault!\n");
}

#[test]
fn fault_with_a_location_but_no_source_file() {
    let m = machine();
    let mut ctx = m.core_context(0).unwrap();
    let lines = &mut ctx.process.line_table;
    let dir = lines.add_dir("user");
    let file = lines.add_file(dir, "app.c");
    lines.add_line(FAULT_PC, file, 9);
    ctx.frame.mepc = FAULT_PC;

    handle_trap(&mut ctx, &m, Mcause::exception(Mcause::STORE_MISALIGNED), 0x3);
    assert_eq!(
        m.console().contents(),
        "Runtime error at user/app.c:9\nMisaligned Store/AMO!\n"
    );
}

#[test]
fn every_fault_has_its_own_message() {
    let cases = [
        (Mcause::INSTRUCTION_ACCESS_FAULT, "Instruction access fault!\n"),
        (Mcause::LOAD_ACCESS_FAULT, "Load access fault!\n"),
        (Mcause::STORE_ACCESS_FAULT, "Store/AMO access fault!\n"),
        (Mcause::ILLEGAL_INSTRUCTION, "Illegal instruction!\n"),
        (Mcause::LOAD_MISALIGNED, "Misaligned Load!\n"),
        (Mcause::STORE_MISALIGNED, "Misaligned Store/AMO!\n"),
    ];
    for (code, message) in cases {
        let m = machine();
        let mut ctx = m.core_context(0).unwrap();
        handle_trap(&mut ctx, &m, Mcause::exception(code), 0);
        assert_eq!(m.console().contents(), message);
    }
}

#[test]
fn unexpected_cause_dumps_registers() {
    let m = machine();
    let mut ctx = m.core_context(0).unwrap();
    ctx.frame.mepc = 0x8100_0010;

    let cause = Mcause::exception(Mcause::BREAKPOINT);
    let outcome = handle_trap(&mut ctx, &m, cause, 0xbad);
    assert_eq!(
        outcome,
        TrapOutcome::Halt(HaltReason::Fatal(FatalError::UnexpectedTrap {
            mcause: 3,
            mepc: 0x8100_0010,
            mtval: 0xbad,
        }))
    );
    assert_eq!(
        m.console().contents(),
        "machine trap(): unexpected mcause 0x3\n            mepc=0x81000010 mtval=0xbad\nunexpected exception happened in M-mode.\n"
    );
}

#[test]
fn unexpected_interrupt_keeps_the_interrupt_bit() {
    let m = machine();
    let mut ctx = m.core_context(0).unwrap();
    handle_trap(&mut ctx, &m, Mcause::interrupt_of(Mcause::MACHINE_SOFT), 0);
    assert!(
        m.console()
            .contents()
            .starts_with("machine trap(): unexpected mcause 0x8000000000000003\n")
    );
    assert_eq!(ctx.ticks(), 0);
}
