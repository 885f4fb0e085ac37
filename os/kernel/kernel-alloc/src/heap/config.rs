use super::Containment;
use kernel_info::memory::{USER_HEAP_BASE, USER_HEAP_END};
use kernel_vmem::addresses::VirtualAddress;

/// Placement and policy of one user heap.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HeapConfig {
    /// First page the heap maps; the initial growth pointer.
    pub base: VirtualAddress,
    /// The growth pointer never moves past this address.
    pub limit: VirtualAddress,
    /// How `free` matches an address to a used block.
    pub containment: Containment,
}

impl HeapConfig {
    #[must_use]
    pub const fn with_containment(mut self, containment: Containment) -> Self {
        self.containment = containment;
        self
    }
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            base: VirtualAddress::new(USER_HEAP_BASE),
            limit: VirtualAddress::new(USER_HEAP_END),
            containment: Containment::default(),
        }
    }
}
