use core::fmt;
use kernel_registers::Mcause;

/// What a trap means to the handler, decoded from `mcause`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrapCause {
    /// Machine timer interrupt.
    Timer,
    /// `ecall` from user mode.
    EnvironmentCall,
    /// A synchronous fault the user program cannot recover from.
    Fault(FaultKind),
    /// Anything else. Carries the raw cause for the register dump.
    Unexpected(Mcause),
}

impl TrapCause {
    /// Whether this cause always ends in a halt.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::Fault(_) | Self::Unexpected(_))
    }
}

impl From<Mcause> for TrapCause {
    fn from(mcause: Mcause) -> Self {
        if mcause.interrupt() {
            return match mcause.code() {
                Mcause::MACHINE_TIMER => Self::Timer,
                _ => Self::Unexpected(mcause),
            };
        }
        match mcause.code() {
            Mcause::USER_ECALL => Self::EnvironmentCall,
            code => FaultKind::from_code(code).map_or(Self::Unexpected(mcause), Self::Fault),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FaultKind {
    InstructionAccess,
    LoadAccess,
    StoreAccess,
    IllegalInstruction,
    MisalignedLoad,
    MisalignedStore,
}

impl FaultKind {
    /// The fault for exception `code`, if it is one.
    #[must_use]
    pub const fn from_code(code: u64) -> Option<Self> {
        Some(match code {
            Mcause::INSTRUCTION_ACCESS_FAULT => Self::InstructionAccess,
            Mcause::LOAD_ACCESS_FAULT => Self::LoadAccess,
            Mcause::STORE_ACCESS_FAULT => Self::StoreAccess,
            Mcause::ILLEGAL_INSTRUCTION => Self::IllegalInstruction,
            Mcause::LOAD_MISALIGNED => Self::MisalignedLoad,
            Mcause::STORE_MISALIGNED => Self::MisalignedStore,
            _ => return None,
        })
    }

    /// Console text for this fault.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InstructionAccess => "Instruction access fault!",
            Self::LoadAccess => "Load access fault!",
            Self::StoreAccess => "Store/AMO access fault!",
            Self::IllegalInstruction => "Illegal instruction!",
            Self::MisalignedLoad => "Misaligned Load!",
            Self::MisalignedStore => "Misaligned Store/AMO!",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert_eq!(TrapCause::from(Mcause::interrupt_of(Mcause::MACHINE_TIMER)), TrapCause::Timer);
        assert_eq!(
            TrapCause::from(Mcause::exception(Mcause::USER_ECALL)),
            TrapCause::EnvironmentCall
        );
        assert_eq!(
            TrapCause::from(Mcause::exception(Mcause::ILLEGAL_INSTRUCTION)),
            TrapCause::Fault(FaultKind::IllegalInstruction)
        );
        assert_eq!(
            TrapCause::from(Mcause::exception(Mcause::STORE_MISALIGNED)),
            TrapCause::Fault(FaultKind::MisalignedStore)
        );
    }

    #[test]
    fn same_code_differs_by_interrupt_bit() {
        // code 7: store access fault as an exception, machine timer as an interrupt
        assert_eq!(
            TrapCause::from(Mcause::exception(7)),
            TrapCause::Fault(FaultKind::StoreAccess)
        );
        assert_eq!(TrapCause::from(Mcause::interrupt_of(7)), TrapCause::Timer);
    }

    #[test]
    fn everything_else_is_unexpected() {
        for cause in [
            Mcause::exception(Mcause::BREAKPOINT),
            Mcause::exception(Mcause::SUPERVISOR_ECALL),
            Mcause::exception(Mcause::INSTRUCTION_MISALIGNED),
            Mcause::interrupt_of(Mcause::MACHINE_SOFT),
        ] {
            let decoded = TrapCause::from(cause);
            assert_eq!(decoded, TrapCause::Unexpected(cause));
            assert!(decoded.is_fatal());
        }
        assert!(!TrapCause::Timer.is_fatal());
    }
}
