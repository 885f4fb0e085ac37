//! # Harts and Timer

/// Number of harts (cores) brought up by the firmware.
///
/// Every hart runs exactly one user process, and all of them must reach the
/// exit barrier before the machine powers off.
pub const NCPU: usize = 2;

/// Hart that performs the final power-off once every hart has exited.
pub const BOOT_HART: usize = 0;

/// Machine timer ticks between two timer interrupts.
pub const TIMER_INTERVAL: u64 = 1_000_000;

/// Base of the core-local interruptor (timer compare registers).
pub const CLINT_BASE: u64 = 0x0200_0000;

/// Address of the `mtimecmp` register of `hart`.
#[must_use]
pub const fn clint_mtimecmp(hart: u64) -> u64 {
    CLINT_BASE + 0x4000 + 8 * hart
}

const _: () = {
    assert!(NCPU >= 1);
    assert!(BOOT_HART < NCPU);
    assert!(TIMER_INTERVAL > 0);
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mtimecmp_registers_are_word_apart() {
        assert_eq!(clint_mtimecmp(0), 0x0200_4000);
        assert_eq!(clint_mtimecmp(1) - clint_mtimecmp(0), 8);
    }
}
