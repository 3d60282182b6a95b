//! Backend-independent traversal.
//!
//! Expression, statement and function lowering are written once here against
//! the [`Backend`](crate::traits::Backend) traits. Failures are reported to the
//! [`DiagnosticQueue`] at the point they happen and propagated as
//! [`ErrorGuaranteed`], so each failure is reported exactly once and the
//! enclosing statement is abandoned.

mod expr;
mod function;
mod stmt;

pub use function::{lower_function, FunctionState, LoweredFunction};

use tracing::warn;
use zap_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode, ErrorGuaranteed};
use zap_ir::{Node, NodeArena, NodeId};
use zap_sema::{Scope, SymbolTable};

use crate::traits::LowerError;

/// Emission state for one function body.
///
/// Passed by argument through every lowering call; nothing about the
/// function being lowered lives in the backend or in globals.
pub struct FunctionCtx<'a> {
    pub arena: &'a NodeArena,
    pub symbols: &'a SymbolTable,
    pub diagnostics: &'a mut DiagnosticQueue,
    /// Variables declared so far.
    pub scope: Scope,
    pub function: &'a str,
}

impl<'a> FunctionCtx<'a> {
    pub fn new(
        arena: &'a NodeArena,
        symbols: &'a SymbolTable,
        diagnostics: &'a mut DiagnosticQueue,
        function: &'a str,
    ) -> Self {
        FunctionCtx {
            arena,
            symbols,
            diagnostics,
            scope: Scope::new(),
            function,
        }
    }

    /// Fetch a node, reporting a dangling id.
    pub fn node(&mut self, id: NodeId) -> Result<&'a Node, ErrorGuaranteed> {
        let arena = self.arena;
        match arena.get(id) {
            Some(node) => Ok(node),
            None => {
                let diag = Diagnostic::error(ErrorCode::E4004)
                    .with_message(format!("{id:?} is outside the arena ({} nodes)", arena.len()))
                    .with_node(id);
                Err(self.emit(diag))
            }
        }
    }

    /// Report a failed leaf operation against `node`.
    pub fn report(&mut self, node: NodeId, err: LowerError) -> ErrorGuaranteed {
        self.emit(err.into_diagnostic(node))
    }

    pub fn emit(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        let diag = diag.in_function(self.function);
        warn!(code = %diag.code, function = self.function, "{}", diag.message);
        self.diagnostics.emit_error(diag)
    }

    pub fn warn(&mut self, diag: Diagnostic) {
        let diag = diag.in_function(self.function);
        warn!(code = %diag.code, function = self.function, "{}", diag.message);
        self.diagnostics.emit_warning(diag);
    }
}

#[cfg(test)]
mod tests;
