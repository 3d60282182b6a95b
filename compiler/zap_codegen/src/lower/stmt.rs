//! Statement lowering.

use tracing::trace;
use zap_diagnostic::ErrorGuaranteed;
use zap_ir::{ExprKind, NodeId, NodeKind, TypeDesc, UnaryOp};

use super::expr::{lower_expr, lower_operand, resolve_variable};
use super::FunctionCtx;
use crate::traits::{Backend, LowerError, Place};

pub(crate) fn lower_stmt<B: Backend>(
    backend: &mut B,
    cx: &mut FunctionCtx<'_>,
    id: NodeId,
) -> Result<(), ErrorGuaranteed> {
    let node = cx.node(id)?;
    trace!(node = %id, kind = node.describe(), "lowering statement");

    match &node.kind {
        NodeKind::Let { name, init } => lower_let(backend, cx, id, name, &node.ty, *init),
        NodeKind::Assign { target, value } => lower_assign(backend, cx, id, *target, *value),
        NodeKind::Return(value) => lower_return(backend, cx, id, *value),
        NodeKind::ExprStmt(expr) => {
            let value = lower_expr(backend, cx, *expr)?;
            backend.discard(value);
            Ok(())
        }
        NodeKind::Function(_) | NodeKind::Expr(_) => {
            let err = LowerError::Unsupported(format!("{} used as a statement", node.describe()));
            Err(cx.report(id, err))
        }
    }
}

fn lower_let<B: Backend>(
    backend: &mut B,
    cx: &mut FunctionCtx<'_>,
    id: NodeId,
    name: &str,
    ty: &TypeDesc,
    init: Option<NodeId>,
) -> Result<(), ErrorGuaranteed> {
    if ty.is_void() {
        let err = LowerError::TypeMismatch(format!("variable `{name}` cannot have type `void`"));
        return Err(cx.report(id, err));
    }

    let init = match init {
        Some(expr) => lower_operand(backend, cx, expr)?,
        None => backend.zero_value(ty).map_err(|e| cx.report(id, e))?,
    };

    cx.scope.declare_variable(name, *ty);
    let handle = backend
        .declare_local(name, ty, init)
        .map_err(|e| cx.report(id, e))?;
    cx.scope
        .bind_storage(name, handle)
        .map_err(|e| cx.report(id, LowerError::Unsupported(e.to_string())))
}

fn lower_assign<B: Backend>(
    backend: &mut B,
    cx: &mut FunctionCtx<'_>,
    id: NodeId,
    target: NodeId,
    value: NodeId,
) -> Result<(), ErrorGuaranteed> {
    let target_node = cx.node(target)?;
    let place = match &target_node.kind {
        NodeKind::Expr(ExprKind::Ident(name)) => {
            let (var, handle) = resolve_variable(cx, target, name)?;
            Place::Local { handle, ty: var.ty }
        }
        NodeKind::Expr(ExprKind::Unary {
            op: UnaryOp::Deref,
            operand,
        }) => Place::Deref {
            pointer: lower_operand(backend, cx, *operand)?,
            pointee: target_node.ty,
        },
        _ => Place::Expr {
            target: lower_operand(backend, cx, target)?,
            ty: target_node.ty,
        },
    };

    let value = lower_operand(backend, cx, value)?;
    backend.store(place, value).map_err(|e| cx.report(id, e))
}

/// `return` and `return value` are passed to the backend as written; only
/// the backend knows whether the shape fits the function.
fn lower_return<B: Backend>(
    backend: &mut B,
    cx: &mut FunctionCtx<'_>,
    id: NodeId,
    value: Option<NodeId>,
) -> Result<(), ErrorGuaranteed> {
    let Some(expr) = value else {
        return backend.ret(None).map_err(|e| cx.report(id, e));
    };

    if cx.node(expr)?.ty.is_void() {
        // `return f();` with `f` returning void: evaluate, then return.
        let value = lower_expr(backend, cx, expr)?;
        backend.discard(value);
        return backend.ret(None).map_err(|e| cx.report(id, e));
    }

    let value = lower_operand(backend, cx, expr)?;
    backend.ret(Some(value)).map_err(|e| cx.report(id, e))
}
