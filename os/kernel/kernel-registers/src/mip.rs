use bitfield_struct::bitfield;

/// `mip` — Machine Interrupt Pending.
///
/// The supervisor-visible subset (`sip`) is the `s*` bits. The timer handler
/// sets [`ssip`](Self::ssip) so that S-mode takes a software interrupt once
/// the machine-mode handler returns.
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct Mip {
    /// Bit 0 — Reserved.
    #[bits(1)]
    __r0: u8,

    /// Bit 1 — Supervisor software interrupt pending.
    pub ssip: bool,

    /// Bit 2 — Reserved.
    #[bits(1)]
    __r2: u8,

    /// Bit 3 — Machine software interrupt pending.
    pub msip: bool,

    /// Bit 4 — Reserved.
    #[bits(1)]
    __r4: u8,

    /// Bit 5 — Supervisor timer interrupt pending.
    pub stip: bool,

    /// Bit 6 — Reserved.
    #[bits(1)]
    __r6: u8,

    /// Bit 7 — Machine timer interrupt pending.
    pub mtip: bool,

    /// Bit 8 — Reserved.
    #[bits(1)]
    __r8: u8,

    /// Bit 9 — Supervisor external interrupt pending.
    pub seip: bool,

    /// Bit 10 — Reserved.
    #[bits(1)]
    __r10: u8,

    /// Bit 11 — Machine external interrupt pending.
    pub meip: bool,

    /// Bits 12–63 — Reserved / platform defined.
    #[bits(52)]
    __r12: u64,
}

impl Mip {
    /// `sip` value with only the supervisor software interrupt pending.
    pub const SIP_SSIP: Self = Self::new().with_ssip(true);
}

#[cfg(all(feature = "asm", target_arch = "riscv64"))]
impl crate::StoreRegisterUnsafe for Mip {
    /// Sets the given bits in `sip` (`csrs`), leaving the others untouched.
    unsafe fn store_unsafe(self) {
        unsafe {
            core::arch::asm!("csrs sip, {}", in(reg) self.into_bits(), options(nomem, nostack));
        }
    }
}
