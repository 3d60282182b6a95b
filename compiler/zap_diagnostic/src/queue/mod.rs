//! Diagnostic queue for collecting lowering diagnostics.
//!
//! Diagnostics are kept in emission order, which is source order because
//! code generation walks each function front to back.

use crate::{Diagnostic, ErrorGuaranteed, Severity};

/// Collects diagnostics and keeps a running error count.
///
/// # Example
///
/// ```text
/// let mut queue = DiagnosticQueue::new();
/// let guar = queue.emit_error(missing_symbol(node, "variable", "x"));
/// assert!(queue.has_errors().is_some());
/// let all = queue.flush();
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    /// Count of errors (not warnings/notes).
    error_count: usize,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic of any severity.
    pub fn push(&mut self, diag: Diagnostic) {
        if diag.is_error() {
            self.error_count += 1;
        }
        self.diagnostics.push(diag);
    }

    /// Emit an error diagnostic and return proof that it was emitted.
    ///
    /// A diagnostic built as a warning is promoted, since the caller is
    /// about to treat it as a failure.
    pub fn emit_error(&mut self, mut diag: Diagnostic) -> ErrorGuaranteed {
        diag.severity = Severity::Error;
        self.push(diag);
        ErrorGuaranteed::new()
    }

    /// Emit a warning. Warnings never affect [`has_errors`](Self::has_errors).
    pub fn emit_warning(&mut self, mut diag: Diagnostic) {
        diag.severity = Severity::Warning;
        self.push(diag);
    }

    /// Get the number of errors emitted.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Check if any errors were emitted and get proof if so.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Iterate without draining.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Return all diagnostics in emission order and reset the queue.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        self.error_count = 0;
        std::mem::take(&mut self.diagnostics)
    }
}
