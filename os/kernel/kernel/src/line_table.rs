//! Code address to source line lookup for fault diagnostics.
//!
//! The loader fills one [`LineTable`] per process from the program's
//! debug line information: a directory table, a file table pointing into
//! it, and one entry per instruction address that starts a source line.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// `addr` is the first instruction of `line` in file `file`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LineEntry {
    pub addr: u64,
    /// Index into the file table.
    pub file: usize,
    pub line: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Index into the directory table.
    pub dir: usize,
    pub name: String,
}

/// A resolved `dir/file:line`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub path: String,
    pub line: u64,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.line)
    }
}

#[derive(Debug, Default, Clone)]
pub struct LineTable {
    dirs: Vec<String>,
    files: Vec<SourceFile>,
    lines: Vec<LineEntry>,
}

impl LineTable {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            dirs: Vec::new(),
            files: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// Append a directory and return its index.
    pub fn add_dir(&mut self, dir: impl Into<String>) -> usize {
        self.dirs.push(dir.into());
        self.dirs.len() - 1
    }

    /// Append a file in directory `dir` and return its index.
    pub fn add_file(&mut self, dir: usize, name: impl Into<String>) -> usize {
        self.files.push(SourceFile {
            dir,
            name: name.into(),
        });
        self.files.len() - 1
    }

    pub fn add_line(&mut self, addr: u64, file: usize, line: u64) {
        self.lines.push(LineEntry { addr, file, line });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The location whose entry starts exactly at `addr`.
    ///
    /// Returns `None` when no entry matches or the entry points at a file
    /// or directory the tables do not hold.
    #[must_use]
    pub fn resolve(&self, addr: u64) -> Option<SourceLocation> {
        let entry = self.lines.iter().find(|e| e.addr == addr)?;
        let file = self.files.get(entry.file)?;
        let dir = self.dirs.get(file.dir)?;

        let mut path = String::with_capacity(dir.len() + 1 + file.name.len());
        path.push_str(dir);
        path.push('/');
        path.push_str(&file.name);
        Some(SourceLocation {
            path,
            line: entry.line,
        })
    }
}

/// Access to the program's source files, for quoting the faulting line.
pub trait SourceReader: Send + Sync {
    /// Full contents of the file at `path`.
    fn read(&self, path: &str) -> Option<Vec<u8>>;

    /// Line `line` (1-based) of the file at `path`, without its newline.
    fn line(&self, path: &str, line: u64) -> Option<String> {
        let index = usize::try_from(line.checked_sub(1)?).ok()?;
        let contents = self.read(path)?;
        let text = contents.split(|&b| b == b'\n').nth(index)?;
        let text = text.strip_suffix(b"\r").unwrap_or(text);
        Some(String::from_utf8_lossy(text).into_owned())
    }
}

/// No sources available; diagnostics show the location only.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoSources;

impl SourceReader for NoSources {
    fn read(&self, _path: &str) -> Option<Vec<u8>> {
        None
    }
}

/// Sources held in memory, keyed by path.
#[derive(Debug, Default, Clone)]
pub struct MemorySources {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemorySources {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            files: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }
}

impl SourceReader for MemorySources {
    fn read(&self, path: &str) -> Option<Vec<u8>> {
        self.files.get(path).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> LineTable {
        let mut t = LineTable::new();
        let dir = t.add_dir("user");
        let file = t.add_file(dir, "app_errorline.c");
        t.add_line(0x8100_0000, file, 11);
        t.add_line(0x8100_0010, file, 14);
        t
    }

    #[test]
    fn resolves_exact_addresses_only() {
        let t = table();
        let loc = t.resolve(0x8100_0010).unwrap();
        assert_eq!(loc.to_string(), "user/app_errorline.c:14");
        assert!(t.resolve(0x8100_0004).is_none());
    }

    #[test]
    fn dangling_file_index_does_not_resolve() {
        let mut t = LineTable::new();
        t.add_line(0x10, 3, 1);
        assert!(t.resolve(0x10).is_none());
    }

    #[test]
    fn quotes_one_based_lines() {
        let sources = MemorySources::new().with_file("a/b.c", "first\r\nsecond\nthird");
        assert_eq!(sources.line("a/b.c", 1).as_deref(), Some("first"));
        assert_eq!(sources.line("a/b.c", 3).as_deref(), Some("third"));
        assert_eq!(sources.line("a/b.c", 0), None);
        assert_eq!(sources.line("a/b.c", 4), None);
        assert_eq!(NoSources.line("a/b.c", 1), None);
    }
}
