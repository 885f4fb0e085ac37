//! Copying between kernel buffers and user virtual memory.
//!
//! A user buffer may straddle pages whose frames are not physically
//! contiguous, so every copy walks the range one page at a time and
//! translates each piece separately.

use crate::{Mapper, PhysAccessError, PhysMapper};
use kernel_memory_addresses::{PageSize, Size4K, VirtualAddress};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UserAccessError {
    #[error("user address {0} is not mapped")]
    NotMapped(VirtualAddress),
    #[error("user range overflows the address space")]
    Overflow,
    #[error(transparent)]
    Phys(#[from] PhysAccessError),
}

/// Call `f(va, start, len)` for each page-bounded piece of `[va, va + len)`.
#[allow(clippy::cast_possible_truncation)]
fn for_each_piece(
    va: VirtualAddress,
    len: usize,
    mut f: impl FnMut(VirtualAddress, usize, usize) -> Result<(), UserAccessError>,
) -> Result<(), UserAccessError> {
    va.checked_add(len as u64).ok_or(UserAccessError::Overflow)?;
    let mut done = 0usize;
    while done < len {
        let cur = va + done as u64;
        let room = (Size4K::SIZE - cur.offset::<Size4K>()) as usize;
        let piece = room.min(len - done);
        f(cur, done, piece)?;
        done += piece;
    }
    Ok(())
}

/// Fill `buf` from user memory at `va`.
///
/// # Errors
/// [`UserAccessError::NotMapped`] names the first untranslatable address.
pub fn copy_from_user<M: Mapper, P: PhysMapper + ?Sized>(
    aspace: &M,
    phys: &P,
    va: VirtualAddress,
    buf: &mut [u8],
) -> Result<(), UserAccessError> {
    for_each_piece(va, buf.len(), |cur, start, len| {
        let pa = aspace
            .translate(cur)
            .ok_or(UserAccessError::NotMapped(cur))?;
        phys.read_phys(pa, &mut buf[start..start + len])?;
        Ok(())
    })
}

/// Write `data` to user memory at `va`.
///
/// # Errors
/// [`UserAccessError::NotMapped`] names the first untranslatable address.
pub fn copy_to_user<M: Mapper, P: PhysMapper + ?Sized>(
    aspace: &M,
    phys: &P,
    va: VirtualAddress,
    data: &[u8],
) -> Result<(), UserAccessError> {
    for_each_piece(va, data.len(), |cur, start, len| {
        let pa = aspace
            .translate(cur)
            .ok_or(UserAccessError::NotMapped(cur))?;
        phys.write_phys(pa, &data[start..start + len])?;
        Ok(())
    })
}
