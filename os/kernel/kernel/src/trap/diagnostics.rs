//! Console output printed right before a hart halts.

use super::FaultKind;
use crate::error::FatalError;
use crate::line_table::{LineTable, SourceReader};
use kernel_console::{Console, console_print};

/// Print the diagnostic for `err` on `console`.
pub(super) fn report<C: Console + ?Sized>(
    console: &C,
    lines: &LineTable,
    sources: &dyn SourceReader,
    err: &FatalError,
) {
    match *err {
        FatalError::Fault { kind, mepc, .. } => report_fault(console, lines, sources, kind, mepc),
        FatalError::UnexpectedTrap { mcause, mepc, mtval } => {
            console_print!(console, "machine trap(): unexpected mcause {mcause:#x}\n");
            console_print!(console, "            mepc={mepc:#x} mtval={mtval:#x}\n");
            console_print!(console, "unexpected exception happened in M-mode.\n");
        }
        _ => console_print!(console, "{err}\n"),
    }
}

/// `Runtime error at dir/file:line`, the quoted line, then the fault name.
///
/// The location lines are left out when `mepc` is not in the line table;
/// the quote is left out when the source file cannot be read.
fn report_fault<C: Console + ?Sized>(
    console: &C,
    lines: &LineTable,
    sources: &dyn SourceReader,
    kind: FaultKind,
    mepc: u64,
) {
    if let Some(loc) = lines.resolve(mepc) {
        console_print!(console, "Runtime error at {loc}\n");
        if let Some(text) = sources.line(&loc.path, loc.line) {
            console_print!(console, "{text}\n");
        }
    }
    console_print!(console, "{kind}\n");
}
