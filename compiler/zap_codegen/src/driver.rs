//! Module driver shared by both backends.
//!
//! Two phases, the way `declare_all` then `define_all` works in LLVM
//! frontends:
//!
//! 1. Register built-ins and every top-level function in the symbol table,
//!    and let the backend predeclare their signatures.
//! 2. Lower each function in arena order and hand its scope back to the
//!    symbol table.

use tracing::debug;
use zap_diagnostic::{malformed_tree, Diagnostic, DiagnosticQueue};
use zap_ir::NodeArena;
use zap_sema::{FunctionSymbol, SymbolTable};

use crate::lower::{lower_function, FunctionState};
use crate::traits::Backend;

/// What happened to one function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionSummary {
    pub name: String,
    pub state: FunctionState,
    pub error_count: usize,
}

/// Outcome of lowering a whole tree.
///
/// Lowering errors do not abort generation; the output is still produced
/// but must be discarded when [`has_errors`](Self::has_errors) is true.
#[derive(Clone, Debug, Default)]
pub struct CodegenReport {
    /// Errors and warnings, in emission order.
    pub diagnostics: Vec<Diagnostic>,
    /// Functions in arena order.
    pub functions: Vec<FunctionSummary>,
    /// Whether a `main` function was registered.
    pub entry_point: bool,
}

impl CodegenReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }
}

/// Lower every function of `arena` through `backend`.
///
/// A tree that fails [`NodeArena::validate`] is reported and not lowered.
pub fn lower_module<B: Backend>(
    backend: &mut B,
    arena: &NodeArena,
    symbols: &mut SymbolTable,
) -> CodegenReport {
    let mut diagnostics = DiagnosticQueue::new();

    if let Err(errors) = arena.validate() {
        for error in &errors {
            diagnostics.emit_error(malformed_tree(error));
        }
        return CodegenReport {
            diagnostics: diagnostics.flush(),
            functions: Vec::new(),
            entry_point: false,
        };
    }

    for builtin in backend.builtins() {
        debug!(name = %builtin.name, "registering built-in");
        symbols.register_function(builtin);
    }
    for (_, decl, ret) in arena.functions() {
        symbols.register_function(FunctionSymbol::from_decl(decl));
        backend.predeclare_function(decl, ret);
    }

    let mut functions = Vec::new();
    for (node, decl, ret) in arena.functions() {
        let lowered = lower_function(backend, arena, symbols, &mut diagnostics, node, decl, ret);
        functions.push(FunctionSummary {
            name: lowered.name.clone(),
            state: lowered.state,
            error_count: lowered.error_count,
        });
        symbols.attach_scope(&lowered.name, lowered.scope);
    }

    debug!(
        functions = functions.len(),
        errors = diagnostics.error_count(),
        "module lowered"
    );
    CodegenReport {
        diagnostics: diagnostics.flush(),
        functions,
        entry_point: symbols.found_main(),
    }
}
