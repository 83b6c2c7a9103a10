//! Warn-once diagnostic sink
//!
//! The resolver emits a handful of advisory warnings (stale submodules, the
//! opt-in unencrypted-HTTP fallback). Instead of process-wide "warned once"
//! flags, an explicit sink object is threaded through the resolver and
//! tracks what it has already emitted, which keeps the behavior testable.

use std::collections::HashSet;

use console::style;

/// Deduplicating warning sink for one resolver invocation
#[derive(Debug, Default)]
pub struct Diagnostics {
    emitted: HashSet<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a warning unconditionally
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", style("warning:").yellow().bold(), message);
    }

    /// Emit a warning at most once per key. Returns whether it was emitted.
    pub fn warn_once(&mut self, key: &str, message: &str) -> bool {
        if self.emitted.insert(key.to_string()) {
            self.warn(message);
            true
        } else {
            false
        }
    }
}
