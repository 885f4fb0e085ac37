use crate::clint::Clint;
use crate::config::MachineConfig;
use crate::core_context::CoreContext;
use crate::line_table::{NoSources, SourceReader};
use alloc::boxed::Box;
use alloc::vec::Vec;
use kernel_alloc::FramePool;
use kernel_console::Console;
use kernel_sync::{Rendezvous, SyncOnceCell};
use log::info;

/// State every hart shares.
pub struct Machine<C: Console> {
    config: MachineConfig,
    frames: FramePool,
    clint: Clint,
    exit_barrier: Rendezvous,
    power: PowerController,
    console: C,
    sources: Box<dyn SourceReader>,
}

impl<C: Console> Machine<C> {
    #[must_use]
    pub fn new(config: MachineConfig, console: C) -> Self {
        Self {
            frames: FramePool::new(config.frame_pool_base, config.frame_pool_frames),
            clint: Clint::new(config.cores, config.timer_interval),
            exit_barrier: Rendezvous::new(config.cores),
            power: PowerController::new(),
            console,
            sources: Box::new(NoSources),
            config,
        }
    }

    /// Quote source lines from `sources` in fault diagnostics.
    #[must_use]
    pub fn with_sources(mut self, sources: impl SourceReader + 'static) -> Self {
        self.sources = Box::new(sources);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &MachineConfig {
        &self.config
    }

    #[must_use]
    pub const fn frames(&self) -> &FramePool {
        &self.frames
    }

    #[must_use]
    pub const fn clint(&self) -> &Clint {
        &self.clint
    }

    #[must_use]
    pub const fn exit_barrier(&self) -> &Rendezvous {
        &self.exit_barrier
    }

    #[must_use]
    pub const fn power(&self) -> &PowerController {
        &self.power
    }

    #[must_use]
    pub const fn console(&self) -> &C {
        &self.console
    }

    #[must_use]
    pub fn sources(&self) -> &dyn SourceReader {
        self.sources.as_ref()
    }

    /// A fresh context for `hart`, or `None` if the machine has no such hart.
    #[must_use]
    pub fn core_context(&self, hart: usize) -> Option<CoreContext> {
        (hart < self.config.cores).then(|| CoreContext::new(hart, self.config.heap))
    }

    /// One context per hart, in hart order.
    #[must_use]
    pub fn core_contexts(&self) -> Vec<CoreContext> {
        (0..self.config.cores)
            .map(|hart| CoreContext::new(hart, self.config.heap))
            .collect()
    }
}

/// How the machine went down.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ShutdownRecord {
    /// Exit code of the hart that powered off.
    pub code: i64,
    pub hart: usize,
    /// Harts that had reached the exit barrier at power-off.
    pub arrived: usize,
}

/// Records the single power-off of the machine.
#[derive(Default)]
pub struct PowerController {
    record: SyncOnceCell<ShutdownRecord>,
}

impl PowerController {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            record: SyncOnceCell::new(),
        }
    }

    /// Power off with `record`. Only the first call takes effect; later
    /// ones return `false`.
    pub fn power_off(&self, record: ShutdownRecord) -> bool {
        let first = self.record.set(record).is_ok();
        if first {
            info!(
                "power off by hart {} with code {} ({} harts at the barrier)",
                record.hart, record.code, record.arrived
            );
        }
        first
    }

    #[must_use]
    pub fn shutdown(&self) -> Option<&ShutdownRecord> {
        self.record.get()
    }

    #[must_use]
    pub fn is_off(&self) -> bool {
        self.record.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel_console::BufferConsole;

    #[test]
    fn first_power_off_wins() {
        let power = PowerController::new();
        assert!(!power.is_off());
        let first = ShutdownRecord {
            code: 3,
            hart: 0,
            arrived: 2,
        };
        assert!(power.power_off(first));
        assert!(!power.power_off(ShutdownRecord { code: 9, ..first }));
        assert_eq!(power.shutdown(), Some(&first));
    }

    #[test]
    fn contexts_only_for_existing_harts() {
        let machine = Machine::new(MachineConfig::default().with_cores(2), BufferConsole::new());
        assert!(machine.core_context(1).is_some());
        assert!(machine.core_context(2).is_none());
        let harts: Vec<usize> = machine.core_contexts().iter().map(CoreContext::hart).collect();
        assert_eq!(harts, vec![0, 1]);
        assert_eq!(machine.clint().harts(), 2);
        assert_eq!(machine.exit_barrier().parties(), 2);
    }
}
