//! # Diagnostic Console and Logging
//!
//! Everything the privileged layer prints goes through a [`Console`]: the
//! bytes a user program passes to the `print` system call, the exit notice,
//! fault diagnostics, and (via [`ConsoleLogger`]) the `log` records of every
//! crate in the workspace.
//!
//! ## Output Path
//! ```text
//! console_print! / ConsoleLogger
//!     ↓
//! ConsoleWriter (fmt::Write)
//!     ↓
//! Console::write_bytes
//!     ↓
//! platform sink (firmware console, UART, or a BufferConsole in tests)
//! ```
//!
//! A console is shared by all harts, so [`Console::write_bytes`] takes
//! `&self` and implementations serialize internally. Output of one call is
//! never interleaved with another hart's.
//!
//! ## Feature System
//!
//! With the `enabled` feature (default) [`console_print!`] formats and
//! writes. Without it the macro only evaluates its console argument, so
//! diagnostics compile away entirely.
//!
//! ## Usage
//! ```rust
//! use kernel_console::{BufferConsole, console_print};
//!
//! let console = BufferConsole::new();
//! console_print!(&console, "User exit with code:{}.\n", 0);
//! assert_eq!(console.contents(), "User exit with code:0.\n");
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

extern crate alloc;

mod buffer;
mod logger;

pub use buffer::BufferConsole;
pub use logger::ConsoleLogger;

use core::fmt::{self, Write};

/// A byte sink shared by every hart.
pub trait Console: Sync {
    /// Emit `bytes` as one uninterrupted unit.
    fn write_bytes(&self, bytes: &[u8]);
}

impl<C: Console + ?Sized> Console for &C {
    fn write_bytes(&self, bytes: &[u8]) {
        (**self).write_bytes(bytes);
    }
}

/// [`fmt::Write`] adapter over a [`Console`].
pub struct ConsoleWriter<'a, C: Console + ?Sized>(pub &'a C);

impl<C: Console + ?Sized> Write for ConsoleWriter<'_, C> {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_bytes(s.as_bytes());
        Ok(())
    }
}

#[doc(hidden)]
#[cfg(feature = "enabled")]
#[inline]
pub fn console_write<C: Console + ?Sized>(console: &C, args: fmt::Arguments) {
    // Render into one buffer first so a line reaches the sink in one piece.
    let mut line = alloc::string::String::new();
    if fmt::write(&mut line, args).is_ok() {
        console.write_bytes(line.as_bytes());
    } else {
        // Best effort: whatever formatted before the error.
        let _ = fmt::write(&mut ConsoleWriter(console), args);
    }
}

#[doc(hidden)]
#[cfg(not(feature = "enabled"))]
#[inline]
pub fn console_write<C: Console + ?Sized>(_console: &C, _args: fmt::Arguments) {
    // no-op when feature disabled
}

/// `print!` onto a [`Console`].
#[macro_export]
macro_rules! console_print {
    ($console:expr, $($arg:tt)*) => {{
        // No allocation in the caller: `format_args!` builds a lightweight `Arguments`.
        $crate::console_write($console, core::format_args!($($arg)*));
    }};
}
