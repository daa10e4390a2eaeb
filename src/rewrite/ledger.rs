//! In-process bookkeeping for rewrites.
//!
//! Line numbers captured by a test binary describe the file as it was compiled. Once one
//! literal in a file grows or shrinks, every call below it moves. The ledger remembers those
//! shifts and serialises rewrites across the test threads of one process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;

static LEDGER: Lazy<Mutex<Ledger>> = Lazy::new(|| Mutex::new(Ledger::default()));

/// Run `f` with exclusive access to the process-wide ledger.
pub(crate) fn with_ledger<T>(f: impl FnOnce(&mut Ledger) -> T) -> T {
    // A panicking test must not disable rewrites for the rest of the run.
    let mut guard = LEDGER.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
}

#[derive(Debug, Default)]
pub(crate) struct Ledger {
    shifts: HashMap<PathBuf, Vec<LineShift>>,
}

#[derive(Debug, Clone, Copy)]
struct LineShift {
    /// Compiled line of the rewritten call.
    line: u32,
    delta: i64,
}

impl Ledger {
    /// Translate a compiled line into the file's current line.
    pub(crate) fn current_line(&self, file: &Path, line: u32) -> u32 {
        let delta: i64 = self
            .shifts
            .get(file)
            .into_iter()
            .flatten()
            .filter(|shift| shift.line < line)
            .map(|shift| shift.delta)
            .sum();
        (i64::from(line) + delta).max(1) as u32
    }

    /// Record that the literal of the call on compiled `line` changed its height by `delta`.
    pub(crate) fn record(&mut self, file: &Path, line: u32, delta: i64) {
        if delta == 0 {
            return;
        }
        self.shifts
            .entry(file.to_path_buf())
            .or_default()
            .push(LineShift { line, delta });
    }
}
