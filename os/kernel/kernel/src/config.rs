use kernel_alloc::HeapConfig;
use kernel_info::machine::{NCPU, TIMER_INTERVAL};
use kernel_info::memory::{FRAME_POOL_BASE, FRAME_POOL_FRAMES};
use kernel_vmem::addresses::PhysicalAddress;

/// Shape of the machine a [`Machine`](crate::Machine) is built for.
///
/// The default mirrors the compile-time layout in `kernel-info`; tests
/// shrink the page pool or change the hart count.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    /// Harts that take part in the exit barrier.
    pub cores: usize,
    pub frame_pool_base: PhysicalAddress,
    pub frame_pool_frames: u64,
    /// Timer ticks between two machine timer interrupts.
    pub timer_interval: u64,
    /// Heap window and policy of every core's process.
    pub heap: HeapConfig,
}

impl MachineConfig {
    #[must_use]
    pub const fn with_cores(mut self, cores: usize) -> Self {
        self.cores = cores;
        self
    }

    #[must_use]
    pub const fn with_frames(mut self, frames: u64) -> Self {
        self.frame_pool_frames = frames;
        self
    }

    #[must_use]
    pub const fn with_heap(mut self, heap: HeapConfig) -> Self {
        self.heap = heap;
        self
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            cores: NCPU,
            frame_pool_base: PhysicalAddress::new(FRAME_POOL_BASE),
            frame_pool_frames: FRAME_POOL_FRAMES,
            timer_interval: TIMER_INTERVAL,
            heap: HeapConfig::default(),
        }
    }
}
