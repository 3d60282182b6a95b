//! Closed AST node variants.
//!
//! A program is a flat list of [`Node`]s in a [`NodeArena`](crate::NodeArena).
//! Statements and expressions point at their children by [`NodeId`], in
//! evaluation order.

use std::fmt;

use crate::{NodeId, TypeDesc};

/// One node of the arena: its variant and its resolved type.
///
/// For functions `ty` is the return type, for `let` the declared type of the
/// variable, for expressions the type of the produced value. Other statements
/// carry `void`.
#[derive(Clone, PartialEq, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub ty: TypeDesc,
}

impl Node {
    pub fn new(kind: NodeKind, ty: TypeDesc) -> Self {
        Node { kind, ty }
    }

    /// Short, human-readable name of the variant.
    pub fn describe(&self) -> &'static str {
        match &self.kind {
            NodeKind::Function(_) => "function",
            NodeKind::Let { .. } => "let statement",
            NodeKind::Assign { .. } => "assignment",
            NodeKind::Return(_) => "return statement",
            NodeKind::ExprStmt(_) => "expression statement",
            NodeKind::Expr(expr) => expr.describe(),
        }
    }

    pub fn is_expr(&self) -> bool {
        matches!(self.kind, NodeKind::Expr(_))
    }

    pub fn is_stmt(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Let { .. } | NodeKind::Assign { .. } | NodeKind::Return(_) | NodeKind::ExprStmt(_)
        )
    }

    pub fn as_function(&self) -> Option<&FunctionDecl> {
        match &self.kind {
            NodeKind::Function(decl) => Some(decl),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum NodeKind {
    Function(FunctionDecl),
    Let {
        name: String,
        init: Option<NodeId>,
    },
    /// `target = value`. The target is an identifier, a dereference, or any
    /// other expression the backend can store through.
    Assign {
        target: NodeId,
        value: NodeId,
    },
    Return(Option<NodeId>),
    /// An expression evaluated for its side effects.
    ExprStmt(NodeId),
    Expr(ExprKind),
}

/// A function signature with an optional body.
#[derive(Clone, PartialEq, Debug)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    /// Statement ids, in source order. Empty for declarations.
    pub body: Vec<NodeId>,
    /// No body: the function is defined elsewhere.
    pub is_declaration: bool,
    /// File-local linkage.
    pub is_static: bool,
}

impl FunctionDecl {
    pub fn is_variadic(&self) -> bool {
        self.params.iter().any(|p| p.is_variadic)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Param {
    pub name: String,
    pub ty: TypeDesc,
    /// Trailing `...`. Variadic parameters are never bound to storage.
    pub is_variadic: bool,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeDesc) -> Self {
        Param {
            name: name.into(),
            ty,
            is_variadic: false,
        }
    }

    pub fn variadic() -> Self {
        Param {
            name: String::new(),
            ty: TypeDesc::VOID,
            is_variadic: true,
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum ExprKind {
    Literal(Literal),
    Ident(String),
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
    Binary {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    Call {
        callee: String,
        args: Vec<NodeId>,
    },
}

impl ExprKind {
    pub fn describe(&self) -> &'static str {
        match self {
            ExprKind::Literal(_) => "literal",
            ExprKind::Ident(_) => "identifier",
            ExprKind::Unary { .. } => "unary expression",
            ExprKind::Binary { .. } => "binary expression",
            ExprKind::Call { .. } => "call",
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    Str(String),
    /// Produces no value.
    Void,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Neg,
    Not,
    Deref,
    AddrOf,
}

impl UnaryOp {
    pub fn token(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::Deref => "*",
            UnaryOp::AddrOf => "&",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "-" => UnaryOp::Neg,
            "!" => UnaryOp::Not,
            "*" => UnaryOp::Deref,
            "&" => UnaryOp::AddrOf,
            _ => return None,
        })
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    /// String concatenation, `~`. Lowered to a runtime call.
    Concat,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 14] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Mod,
        BinaryOp::Eq,
        BinaryOp::Ne,
        BinaryOp::Lt,
        BinaryOp::Le,
        BinaryOp::Gt,
        BinaryOp::Ge,
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Concat,
    ];

    pub fn token(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Concat => "~",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        BinaryOp::ALL.into_iter().find(|op| op.token() == token)
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_tokens_round_trip() {
        for op in BinaryOp::ALL {
            assert_eq!(BinaryOp::from_token(op.token()), Some(op));
        }
        assert_eq!(BinaryOp::from_token("**"), None);
    }

    #[test]
    fn unary_from_token() {
        assert_eq!(UnaryOp::from_token("!"), Some(UnaryOp::Not));
        assert_eq!(UnaryOp::from_token("~"), None);
    }

    #[test]
    fn operator_classes_are_disjoint() {
        for op in BinaryOp::ALL {
            let classes = [op.is_arithmetic(), op.is_comparison(), op.is_logical()];
            assert!(classes.iter().filter(|c| **c).count() <= 1, "{op:?}");
        }
        assert!(!BinaryOp::Concat.is_arithmetic());
    }
}
