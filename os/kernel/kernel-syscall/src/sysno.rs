use crate::SYS_USER_BASE;

/// System call numbers.
#[repr(u64)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Sysno {
    /// Write `a2` bytes from the user buffer at `a1` to the console.
    Print = SYS_USER_BASE,
    /// Leave with status `a1` once every hart has exited.
    Exit = SYS_USER_BASE + 1,
    /// Allocate `a1` bytes on the caller's heap; returns the address.
    Allocate = SYS_USER_BASE + 2,
    /// Free the heap block holding address `a1`.
    Free = SYS_USER_BASE + 3,
}

impl Sysno {
    pub const ALL: [Self; 4] = [Self::Print, Self::Exit, Self::Allocate, Self::Free];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Print => "print",
            Self::Exit => "exit",
            Self::Allocate => "allocate",
            Self::Free => "free",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown syscall {0}")]
pub struct UnknownSyscall(pub u64);

impl TryFrom<u64> for Sysno {
    type Error = UnknownSyscall;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|s| *s as u64 == value)
            .ok_or(UnknownSyscall(value))
    }
}

impl From<Sysno> for u64 {
    fn from(value: Sysno) -> Self {
        value as Self
    }
}
