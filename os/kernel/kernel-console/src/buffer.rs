use crate::Console;
use alloc::string::String;
use alloc::vec::Vec;
use kernel_sync::SpinLock;

/// A console that keeps everything written to it.
///
/// Used as the sink for machines that run off-target, and by tests that
/// assert on diagnostics.
pub struct BufferConsole {
    bytes: SpinLock<Vec<u8>>,
}

impl BufferConsole {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: SpinLock::new(Vec::new()),
        }
    }

    /// Everything written so far, lossily decoded as UTF-8.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    /// Raw bytes written so far.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.lock().clone()
    }

    /// Return and forget everything written so far.
    pub fn take(&self) -> String {
        let bytes = core::mem::take(&mut *self.bytes.lock());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Default for BufferConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for BufferConsole {
    fn write_bytes(&self, bytes: &[u8]) {
        self.bytes.lock().extend_from_slice(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console_print;

    #[test]
    fn collects_and_drains() {
        let c = BufferConsole::new();
        console_print!(&c, "{}-{:#x}", "a", 16);
        c.write_bytes(b"\xff");
        assert_eq!(c.bytes(), b"a-0x10\xff");
        assert_eq!(c.take(), "a-0x10\u{fffd}");
        assert!(c.contents().is_empty());
    }

    #[test]
    fn works_behind_a_trait_object() {
        let c = BufferConsole::new();
        let dynamic: &dyn Console = &c;
        console_print!(dynamic, "x={}\n", 1);
        assert_eq!(c.contents(), "x=1\n");
    }
}
