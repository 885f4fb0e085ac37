use bitfield_struct::bitfield;
use kernel_memory_addresses::{PhysicalAddress, PhysicalPage, Size4K};

/// Requested access rights for a mapping.
///
/// ```rust
/// # use kernel_vmem::Protection;
/// let p = Protection::user_rw();
/// assert!(p.read() && p.write() && p.user());
/// assert!(!p.execute());
/// ```
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct Protection {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
    /// Accessible from U-mode.
    pub user: bool,
    #[bits(4)]
    __reserved: u8,
}

impl Protection {
    /// Read + write, user accessible. Every heap page is mapped this way.
    #[must_use]
    pub const fn user_rw() -> Self {
        Self::new().with_read(true).with_write(true).with_user(true)
    }
}

/// One Sv39 leaf page-table entry.
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct PageTableEntry {
    /// V (bit 0): the entry is valid.
    pub valid: bool,
    /// R (bit 1).
    pub readable: bool,
    /// W (bit 2).
    pub writable: bool,
    /// X (bit 3).
    pub executable: bool,
    /// U (bit 4): accessible from U-mode.
    pub user: bool,
    /// G (bit 5).
    pub global: bool,
    /// A (bit 6).
    pub accessed: bool,
    /// D (bit 7).
    pub dirty: bool,
    /// RSW (bits 8–9): reserved for software.
    #[bits(2)]
    pub rsw: u8,
    /// PPN (bits 10–53).
    #[bits(44)]
    ppn: u64,
    #[bits(10)]
    __reserved: u16,
}

impl PageTableEntry {
    /// A valid leaf for `frame` with the given rights.
    #[must_use]
    pub fn leaf(frame: PhysicalPage<Size4K>, prot: Protection) -> Self {
        Self::new()
            .with_valid(true)
            .with_readable(prot.read())
            .with_writable(prot.write())
            .with_executable(prot.execute())
            .with_user(prot.user())
            .with_ppn(frame.number())
    }

    #[must_use]
    pub fn frame(&self) -> PhysicalPage<Size4K> {
        PhysicalPage::from_number(self.ppn())
    }

    #[must_use]
    pub fn frame_base(&self) -> PhysicalAddress {
        self.frame().base()
    }

    #[must_use]
    pub fn protection(&self) -> Protection {
        Protection::new()
            .with_read(self.readable())
            .with_write(self.writable())
            .with_execute(self.executable())
            .with_user(self.user())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_round_trips_frame_and_rights() {
        let frame = PhysicalPage::<Size4K>::containing_address(PhysicalAddress::new(0x8500_3000));
        let e = PageTableEntry::leaf(frame, Protection::user_rw());
        assert!(e.valid());
        assert_eq!(e.frame_base().as_u64(), 0x8500_3000);
        assert_eq!(e.protection(), Protection::user_rw());
        // V | R | W | U
        assert_eq!(e.into_bits() & 0xFF, 0b1_0111);
        assert_eq!(e.into_bits() >> 10, 0x8500_3000 >> 12);
    }
}
