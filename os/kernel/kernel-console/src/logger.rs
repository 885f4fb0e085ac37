use crate::{Console, console_print};
use kernel_sync::SyncOnceCell;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// `log` backend writing `[LEVEL] target: message` lines to a [`Console`].
pub struct ConsoleLogger {
    max_level: LevelFilter,
    console: &'static dyn Console,
}

static LOGGER: SyncOnceCell<ConsoleLogger> = SyncOnceCell::new();

impl ConsoleLogger {
    #[must_use]
    pub const fn new(console: &'static dyn Console, max_level: LevelFilter) -> Self {
        Self { max_level, console }
    }

    /// Install as the global logger. Call once during early init.
    ///
    /// # Errors
    /// Fails if some logger is already installed; the first one stays.
    pub fn init(self) -> Result<(), SetLoggerError> {
        let max_level = self.max_level;
        // A losing value is dropped; `set_logger` below then reports the error.
        let _ = LOGGER.set(self);
        log::set_logger(LOGGER.wait())?;
        log::set_max_level(max_level);
        Ok(())
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        console_print!(
            self.console,
            "[{}] {}: {}\n",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BufferConsole;
    use log::Level;

    static CONSOLE: BufferConsole = BufferConsole::new();

    #[test]
    fn formats_and_filters_records() {
        let logger = ConsoleLogger::new(&CONSOLE, LevelFilter::Info);
        logger.log(
            &Record::builder()
                .level(Level::Warn)
                .target("heap")
                .args(format_args!("free of {:#x}", 0x40))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Trace)
                .target("heap")
                .args(format_args!("hidden"))
                .build(),
        );
        assert_eq!(CONSOLE.take(), "[WARN] heap: free of 0x40\n");
    }
}
