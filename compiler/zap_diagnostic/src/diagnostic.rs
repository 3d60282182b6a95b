use std::fmt;

use zap_ir::{ArenaError, NodeId};

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A categorized code generation failure.
///
/// Code generation has no source spans, so a diagnostic points at the
/// offending arena node and the function being lowered instead.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    /// Error code for searchability.
    pub code: ErrorCode,
    /// Severity level.
    pub severity: Severity,
    /// Main error message.
    pub message: String,
    /// Node that triggered the diagnostic, when there is one.
    pub node: Option<NodeId>,
    /// Function being lowered when the diagnostic was raised.
    pub function: Option<String>,
    /// Additional notes providing context.
    pub notes: Vec<String>,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            node: None,
            function: None,
            notes: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    /// Create a new warning diagnostic.
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    /// Set the main message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach the offending node.
    pub fn with_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    /// Attach the enclosing function.
    pub fn in_function(mut self, name: impl Into<String>) -> Self {
        self.function = Some(name.into());
        self
    }

    /// Add a note providing additional context.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Check if this is an error (vs warning/note).
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)?;

        match (&self.function, self.node) {
            (Some(function), Some(node)) => write!(f, "\n  --> in `{function}` at node {node}")?,
            (Some(function), None) => write!(f, "\n  --> in `{function}`")?,
            (None, Some(node)) => write!(f, "\n  --> at node {node}")?,
            (None, None) => {}
        }

        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }

        Ok(())
    }
}

// Common diagnostic constructors

/// An identifier or callee that is not in scope.
#[cold]
pub fn missing_symbol(node: NodeId, what: &str, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4001)
        .with_message(format!("cannot find {what} `{name}`"))
        .with_node(node)
}

/// An operand lacking a type property its operation needs.
#[cold]
pub fn type_mismatch(node: NodeId, message: impl Into<String>) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4002)
        .with_message(message)
        .with_node(node)
}

/// A construct this backend cannot lower.
#[cold]
pub fn unsupported_construct(node: NodeId, message: impl Into<String>) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4003)
        .with_message(message)
        .with_node(node)
}

/// A structural defect in the input tree.
#[cold]
pub fn malformed_tree(error: &ArenaError) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4004)
        .with_message(error.to_string())
        .with_node(error.parent())
}

/// A non-void function whose body does not end in `return`.
#[cold]
pub fn missing_return(function: &str, return_type: impl fmt::Display) -> Diagnostic {
    Diagnostic::warning(ErrorCode::W4001)
        .with_message(format!(
            "function `{function}` returns `{return_type}` but its body does not end with a return"
        ))
        .in_function(function)
        .with_note("no return is synthesized; control falling off the end is undefined")
}

#[cfg(test)]
mod tests;
