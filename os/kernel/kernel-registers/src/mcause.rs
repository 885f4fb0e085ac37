use bitfield_struct::bitfield;

/// `mcause` — Machine Trap Cause.
///
/// The top bit tells interrupts from synchronous exceptions; the remaining
/// bits carry the cause code within that class.
///
/// ```rust
/// # use kernel_registers::Mcause;
/// let c = Mcause::from_bits(0x8000_0000_0000_0007);
/// assert!(c.interrupt());
/// assert_eq!(c.code(), Mcause::MACHINE_TIMER);
/// ```
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct Mcause {
    /// Bits 0–62 — Exception or interrupt code.
    #[bits(63)]
    pub code: u64,

    /// Bit 63 — Set for asynchronous interrupts.
    pub interrupt: bool,
}

impl Mcause {
    // Exception codes (interrupt = 0).
    pub const INSTRUCTION_MISALIGNED: u64 = 0;
    pub const INSTRUCTION_ACCESS_FAULT: u64 = 1;
    pub const ILLEGAL_INSTRUCTION: u64 = 2;
    pub const BREAKPOINT: u64 = 3;
    pub const LOAD_MISALIGNED: u64 = 4;
    pub const LOAD_ACCESS_FAULT: u64 = 5;
    pub const STORE_MISALIGNED: u64 = 6;
    pub const STORE_ACCESS_FAULT: u64 = 7;
    pub const USER_ECALL: u64 = 8;
    pub const SUPERVISOR_ECALL: u64 = 9;
    pub const MACHINE_ECALL: u64 = 11;

    // Interrupt codes (interrupt = 1).
    pub const SUPERVISOR_SOFT: u64 = 1;
    pub const MACHINE_SOFT: u64 = 3;
    pub const SUPERVISOR_TIMER: u64 = 5;
    pub const MACHINE_TIMER: u64 = 7;
    pub const SUPERVISOR_EXTERNAL: u64 = 9;
    pub const MACHINE_EXTERNAL: u64 = 11;

    /// A synchronous exception with the given code.
    #[must_use]
    pub const fn exception(code: u64) -> Self {
        Self::new().with_code(code).with_interrupt(false)
    }

    /// An asynchronous interrupt with the given code.
    #[must_use]
    pub const fn interrupt_of(code: u64) -> Self {
        Self::new().with_code(code).with_interrupt(true)
    }
}

#[cfg(all(feature = "asm", target_arch = "riscv64"))]
impl crate::LoadRegisterUnsafe for Mcause {
    unsafe fn load_unsafe() -> Self {
        let v: u64;
        unsafe {
            core::arch::asm!("csrr {}, mcause", out(reg) v, options(nomem, nostack, preserves_flags));
        }
        Self::from_bits(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_interrupt_encoding() {
        let c = Mcause::interrupt_of(Mcause::MACHINE_TIMER);
        assert_eq!(c.into_bits(), 0x8000_0000_0000_0007);
    }

    #[test]
    fn exception_encoding() {
        let c = Mcause::exception(Mcause::ILLEGAL_INSTRUCTION);
        assert_eq!(c.into_bits(), 2);
        assert!(!c.interrupt());
    }
}
