//! Expression lowering.

use tracing::trace;
use zap_diagnostic::ErrorGuaranteed;
use zap_ir::{BinaryOp, ExprKind, NodeId, NodeKind, TypeDesc, UnaryOp};
use zap_sema::{StorageHandle, VariableSymbol};

use super::FunctionCtx;
use crate::traits::{Backend, LowerError};

/// Lower an expression. `Ok(None)` means it legitimately produced no value
/// (a `void` literal or a call to a `void` function).
pub(crate) fn lower_expr<B: Backend>(
    backend: &mut B,
    cx: &mut FunctionCtx<'_>,
    id: NodeId,
) -> Result<Option<B::Value>, ErrorGuaranteed> {
    let node = cx.node(id)?;
    let NodeKind::Expr(kind) = &node.kind else {
        let err = LowerError::Unsupported(format!("{} used as an expression", node.describe()));
        return Err(cx.report(id, err));
    };
    trace!(node = %id, kind = kind.describe(), "lowering expression");

    match kind {
        ExprKind::Literal(literal) => backend
            .literal(literal, &node.ty)
            .map_err(|e| cx.report(id, e)),
        ExprKind::Ident(name) => {
            let (var, handle) = resolve_variable(cx, id, name)?;
            backend
                .load(&var, handle)
                .map(Some)
                .map_err(|e| cx.report(id, e))
        }
        ExprKind::Unary { op, operand } => {
            lower_unary(backend, cx, id, *op, *operand, &node.ty).map(Some)
        }
        ExprKind::Binary { op, left, right } => {
            lower_binary(backend, cx, id, *op, *left, *right, &node.ty).map(Some)
        }
        ExprKind::Call { callee, args } => lower_call(backend, cx, id, callee, args, &node.ty),
    }
}

/// Lower an expression whose value is required.
pub(crate) fn lower_operand<B: Backend>(
    backend: &mut B,
    cx: &mut FunctionCtx<'_>,
    id: NodeId,
) -> Result<B::Value, ErrorGuaranteed> {
    match lower_expr(backend, cx, id)? {
        Some(value) => Ok(value),
        None => {
            let err = LowerError::TypeMismatch("expression of type `void` used as a value".into());
            Err(cx.report(id, err))
        }
    }
}

/// Look `name` up in the active scope; it must have bound storage.
pub(crate) fn resolve_variable(
    cx: &mut FunctionCtx<'_>,
    id: NodeId,
    name: &str,
) -> Result<(VariableSymbol, StorageHandle), ErrorGuaranteed> {
    let err = match cx.scope.lookup_variable(name) {
        Some(var) => match var.storage {
            Some(handle) => return Ok((var.clone(), handle)),
            None => LowerError::Unbound(name.to_owned()),
        },
        None => LowerError::missing_variable(name),
    };
    Err(cx.report(id, err))
}

fn lower_unary<B: Backend>(
    backend: &mut B,
    cx: &mut FunctionCtx<'_>,
    id: NodeId,
    op: UnaryOp,
    operand: NodeId,
    ty: &TypeDesc,
) -> Result<B::Value, ErrorGuaranteed> {
    let operand_node = cx.node(operand)?;

    if op == UnaryOp::AddrOf {
        let NodeKind::Expr(ExprKind::Ident(name)) = &operand_node.kind else {
            let err = LowerError::Unsupported("`&` can only take the address of a variable".into());
            return Err(cx.report(id, err));
        };
        let (var, handle) = resolve_variable(cx, operand, name)?;
        return backend
            .address_of(&var, handle)
            .map_err(|e| cx.report(id, e));
    }

    let value = lower_operand(backend, cx, operand)?;
    backend
        .unary(op, value, &operand_node.ty, ty)
        .map_err(|e| cx.report(id, e))
}

fn lower_binary<B: Backend>(
    backend: &mut B,
    cx: &mut FunctionCtx<'_>,
    id: NodeId,
    op: BinaryOp,
    left: NodeId,
    right: NodeId,
    ty: &TypeDesc,
) -> Result<B::Value, ErrorGuaranteed> {
    // Both sides are lowered even if the left fails, so each side's
    // failures are reported.
    let lhs = lower_operand(backend, cx, left);
    let rhs = lower_operand(backend, cx, right);
    let (lhs, rhs) = (lhs?, rhs?);
    backend
        .binary(op, lhs, rhs, ty)
        .map_err(|e| cx.report(id, e))
}

fn lower_call<B: Backend>(
    backend: &mut B,
    cx: &mut FunctionCtx<'_>,
    id: NodeId,
    callee: &str,
    args: &[NodeId],
    ty: &TypeDesc,
) -> Result<Option<B::Value>, ErrorGuaranteed> {
    if cx.symbols.lookup_function(callee).is_none() && !backend.has_symbol(callee) {
        return Err(cx.report(id, LowerError::missing_function(callee)));
    }

    let mut values = Vec::with_capacity(args.len());
    let mut failed = None;
    for &arg in args {
        match lower_operand(backend, cx, arg) {
            Ok(value) => values.push(value),
            Err(guar) => failed = Some(guar),
        }
    }
    if let Some(guar) = failed {
        return Err(guar);
    }

    backend
        .call(callee, values, ty)
        .map_err(|e| cx.report(id, e))
}
