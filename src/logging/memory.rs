//! In-memory [`Log`] implementation.
use std::sync::Mutex;

use super::types::Log;

/// A [`Log`] that records every message as `"<level>: <message>"`.
///
/// Used when the dispatcher is embedded in another program that wants to
/// inspect what happened, and by the test suites.
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded lines in order.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map_or_else(|_| Vec::new(), |guard| guard.clone())
    }

    /// Whether any recorded line at `level` contains `needle`.
    #[must_use]
    pub fn contains(&self, level: &str, needle: &str) -> bool {
        let prefix = format!("{level}: ");
        self.lines()
            .iter()
            .any(|l| l.starts_with(&prefix) && l.contains(needle))
    }

    fn push(&self, level: &str, msg: &str) {
        if let Ok(mut guard) = self.lines.lock() {
            guard.push(format!("{level}: {msg}"));
        }
    }
}

impl Log for MemoryLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }

    fn info(&self, msg: &str) {
        self.push("info", msg);
    }

    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }

    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }

    fn error(&self, msg: &str) {
        self.push("error", msg);
    }

    fn dry_run(&self, msg: &str) {
        self.push("dry_run", msg);
    }
}
