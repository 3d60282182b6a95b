//! Function lowering.

use tracing::{debug, trace};
use zap_diagnostic::{missing_return, DiagnosticQueue};
use zap_ir::{FunctionDecl, NodeArena, NodeId, NodeKind, TypeDesc};
use zap_sema::{Scope, SymbolTable};

use super::stmt::lower_stmt;
use super::FunctionCtx;
use crate::traits::{Backend, LowerError};

/// Progress of one function through the emitter.
///
/// `Declared → SignatureEmitted → [BodyEmitted] → Finalized`; declarations
/// skip `BodyEmitted`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FunctionState {
    Declared,
    SignatureEmitted,
    BodyEmitted,
    Finalized,
}

/// Result of lowering one function node.
#[derive(Clone, Debug)]
pub struct LoweredFunction {
    pub name: String,
    pub node: NodeId,
    pub state: FunctionState,
    /// Every variable the body declared, with its storage.
    pub scope: Scope,
    /// Errors reported while lowering this function.
    pub error_count: usize,
}

/// Lower one function node: signature, parameters, body in source order.
///
/// Never fails as a whole. Statements that fail are reported and skipped,
/// and the rest of the body is still emitted.
pub fn lower_function<B: Backend>(
    backend: &mut B,
    arena: &NodeArena,
    symbols: &SymbolTable,
    diagnostics: &mut DiagnosticQueue,
    node: NodeId,
    decl: &FunctionDecl,
    ret: &TypeDesc,
) -> LoweredFunction {
    let errors_before = diagnostics.error_count();
    let mut state = FunctionState::Declared;
    debug!(
        function = %decl.name,
        declaration = decl.is_declaration,
        statements = decl.body.len(),
        "lowering function"
    );

    if decl.is_declaration {
        backend.emit_declaration(decl, ret);
        advance(&decl.name, &mut state, FunctionState::SignatureEmitted);
        advance(&decl.name, &mut state, FunctionState::Finalized);
        return LoweredFunction {
            name: decl.name.clone(),
            node,
            state,
            scope: Scope::new(),
            error_count: 0,
        };
    }

    backend.begin_function(decl, ret);
    advance(&decl.name, &mut state, FunctionState::SignatureEmitted);

    let mut cx = FunctionCtx::new(arena, symbols, diagnostics, &decl.name);

    for (index, param) in decl.params.iter().enumerate() {
        if param.is_variadic {
            continue;
        }
        cx.scope.declare_variable(param.name.as_str(), param.ty);
        match backend.bind_param(param, index) {
            Ok(handle) => {
                if let Err(e) = cx.scope.bind_storage(&param.name, handle) {
                    cx.report(node, LowerError::Unsupported(e.to_string()));
                }
            }
            Err(e) => {
                cx.report(node, e);
            }
        }
    }

    let mut terminated = false;
    for &stmt in &decl.body {
        if lower_stmt(backend, &mut cx, stmt).is_err() {
            trace!(function = %decl.name, node = %stmt, "statement abandoned");
        }
        terminated = matches!(arena.get(stmt).map(|n| &n.kind), Some(NodeKind::Return(_)));
    }
    advance(&decl.name, &mut state, FunctionState::BodyEmitted);

    if !terminated && !ret.is_void() {
        cx.warn(missing_return(&decl.name, ret).with_node(node));
    }
    let scope = std::mem::take(&mut cx.scope);

    backend.end_function(decl, ret, terminated);
    advance(&decl.name, &mut state, FunctionState::Finalized);

    LoweredFunction {
        name: decl.name.clone(),
        node,
        state,
        scope,
        error_count: diagnostics.error_count() - errors_before,
    }
}

fn advance(function: &str, state: &mut FunctionState, next: FunctionState) {
    trace!(function, from = ?*state, to = ?next, "function state");
    *state = next;
}
