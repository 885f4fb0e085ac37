//! # System Call ABI
//!
//! Register convention shared by the kernel's dispatcher and user programs:
//!
//! | register | on entry              | on return     |
//! |----------|-----------------------|---------------|
//! | `a0`     | call number ([`Sysno`]) | result      |
//! | `a1‥a7`  | arguments             | preserved     |
//!
//! Results are a single signed integer. Calls that hand out an address
//! return it as-is; `free` returns [`SUCCESS`] or [`FAILURE`].

#![cfg_attr(not(any(test, doctest)), no_std)]
#![cfg_attr(feature = "user", allow(unsafe_code))]

mod sysno;

#[cfg(all(feature = "user", target_arch = "riscv64"))]
pub mod user;

pub use sysno::{Sysno, UnknownSyscall};

/// First number of the user-facing call range.
pub const SYS_USER_BASE: u64 = 64;

/// Return value of a call that succeeded without producing a value.
pub const SUCCESS: i64 = 0;

/// Return value of a call the caller got wrong (e.g. freeing a foreign address).
pub const FAILURE: i64 = -1;

/// Raw argument registers of one call, as saved in the trap frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct SyscallArgs {
    /// `a0`.
    pub number: u64,
    /// `a1` through `a7`.
    pub args: [u64; 7],
}

impl SyscallArgs {
    #[must_use]
    pub const fn new(number: u64, args: [u64; 7]) -> Self {
        Self { number, args }
    }

    /// Split `a0..=a7` into call number and arguments.
    #[must_use]
    pub const fn from_registers(a: [u64; 8]) -> Self {
        Self {
            number: a[0],
            args: [a[1], a[2], a[3], a[4], a[5], a[6], a[7]],
        }
    }

    /// Argument `n` (0-based, so `arg(0)` is `a1`).
    #[must_use]
    pub const fn arg(&self, n: usize) -> u64 {
        self.args[n]
    }

    /// The call number decoded, if it is one this ABI knows.
    ///
    /// # Errors
    /// [`UnknownSyscall`] carries the raw number.
    pub fn sysno(&self) -> Result<Sysno, UnknownSyscall> {
        Sysno::try_from(self.number)
    }
}

/// Reinterpret a return value the way it travels back in `a0`.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn to_register(ret: i64) -> u64 {
    ret as u64
}

/// Reinterpret an address-valued result as a return value.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub const fn from_address(addr: u64) -> i64 {
    addr as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_split_into_number_and_arguments() {
        let args = SyscallArgs::from_registers([66, 100, 2, 3, 4, 5, 6, 7]);
        assert_eq!(args.number, 66);
        assert_eq!(args.arg(0), 100);
        assert_eq!(args.arg(6), 7);
        assert_eq!(args.sysno(), Ok(Sysno::Allocate));
    }

    #[test]
    fn failure_is_all_ones_in_a0() {
        assert_eq!(to_register(FAILURE), u64::MAX);
        assert_eq!(to_register(SUCCESS), 0);
        assert_eq!(from_address(0x40_0020), 0x40_0020);
    }
}
