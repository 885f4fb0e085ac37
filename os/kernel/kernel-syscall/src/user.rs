//! `ecall` wrappers for user programs.

use crate::Sysno;

#[inline(always)]
#[allow(clippy::inline_always)]
unsafe fn ecall(sysno: Sysno, a1: u64, a2: u64) -> i64 {
    let ret: i64;
    unsafe {
        core::arch::asm!(
            "ecall",
            inlateout("a0") u64::from(sysno) => ret,
            in("a1") a1,
            in("a2") a2,
            options(nostack)
        );
    }
    ret
}

/// Write `bytes` to the console.
pub fn print(bytes: &[u8]) -> i64 {
    unsafe { ecall(Sysno::Print, bytes.as_ptr() as u64, bytes.len() as u64) }
}

/// Leave the program; returns only if the kernel refuses.
pub fn exit(code: u64) -> i64 {
    unsafe { ecall(Sysno::Exit, code, 0) }
}

/// Allocate `n` bytes on this program's heap.
#[must_use]
pub fn allocate(n: u64) -> *mut u8 {
    unsafe { ecall(Sysno::Allocate, n, 0) as *mut u8 }
}

/// Free a pointer obtained from [`allocate`]. `0` on success, `-1` otherwise.
pub fn free(ptr: *mut u8) -> i64 {
    unsafe { ecall(Sysno::Free, ptr as u64, 0) }
}
