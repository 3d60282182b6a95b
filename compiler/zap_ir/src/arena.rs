//! Flat node storage plus typed constructors.
//!
//! Children must be allocated before their parents, so a builder reads
//! bottom-up:
//!
//! ```text
//! let one = arena.int(1);
//! let two = arena.int(2);
//! let sum = arena.binary(BinaryOp::Add, one, two, TypeDesc::INT32);
//! let ret = arena.ret(Some(sum));
//! arena.function("main", vec![], TypeDesc::INT32, vec![ret]);
//! ```

use thiserror::Error;

use crate::{BinaryOp, ExprKind, FunctionDecl, Literal, Node, NodeId, NodeKind, Param, TypeDesc, UnaryOp};

/// A structural defect found by [`NodeArena::validate`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ArenaError {
    #[error("node {parent} refers to {child:?}, but the arena holds {len} nodes")]
    OutOfBounds {
        parent: NodeId,
        child: NodeId,
        len: usize,
    },
    #[error("node {parent} expects {expected} at {child}, found {found}")]
    WrongKind {
        parent: NodeId,
        child: NodeId,
        expected: &'static str,
        found: &'static str,
    },
}

impl ArenaError {
    /// The node whose child reference is broken.
    pub fn parent(&self) -> NodeId {
        match self {
            ArenaError::OutOfBounds { parent, .. } | ArenaError::WrongKind { parent, .. } => *parent,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Expect {
    Expr,
    Stmt,
}

impl Expect {
    fn as_str(self) -> &'static str {
        match self {
            Expect::Expr => "an expression",
            Expect::Stmt => "a statement",
        }
    }

    fn accepts(self, node: &Node) -> bool {
        match self {
            Expect::Expr => node.is_expr(),
            Expect::Stmt => node.is_stmt(),
        }
    }
}

/// Arena of AST nodes shared by every backend.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its id.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let index = u32::try_from(self.nodes.len()).unwrap_or(u32::MAX - 1);
        self.nodes.push(node);
        NodeId::new(index)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes with their ids, in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        (0u32..).zip(&self.nodes).map(|(i, n)| (NodeId::new(i), n))
    }

    /// Top-level functions in arena order.
    pub fn functions(&self) -> impl Iterator<Item = (NodeId, &FunctionDecl, &TypeDesc)> {
        self.iter()
            .filter_map(|(id, node)| node.as_function().map(|decl| (id, decl, &node.ty)))
    }

    /// Check every child reference: in range and of the right category.
    pub fn validate(&self) -> Result<(), Vec<ArenaError>> {
        let mut errors = Vec::new();
        for (id, node) in self.iter() {
            Self::children(node, |child, expect| {
                match self.get(child) {
                    None => errors.push(ArenaError::OutOfBounds {
                        parent: id,
                        child,
                        len: self.len(),
                    }),
                    Some(found) if !expect.accepts(found) => errors.push(ArenaError::WrongKind {
                        parent: id,
                        child,
                        expected: expect.as_str(),
                        found: found.describe(),
                    }),
                    Some(_) => {}
                }
            });
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn children(node: &Node, mut visit: impl FnMut(NodeId, Expect)) {
        match &node.kind {
            NodeKind::Function(decl) => {
                for &stmt in &decl.body {
                    visit(stmt, Expect::Stmt);
                }
            }
            NodeKind::Let { init, .. } => {
                if let Some(init) = init {
                    visit(*init, Expect::Expr);
                }
            }
            NodeKind::Assign { target, value } => {
                visit(*target, Expect::Expr);
                visit(*value, Expect::Expr);
            }
            NodeKind::Return(value) => {
                if let Some(value) = value {
                    visit(*value, Expect::Expr);
                }
            }
            NodeKind::ExprStmt(expr) => visit(*expr, Expect::Expr),
            NodeKind::Expr(ExprKind::Unary { operand, .. }) => visit(*operand, Expect::Expr),
            NodeKind::Expr(ExprKind::Binary { left, right, .. }) => {
                visit(*left, Expect::Expr);
                visit(*right, Expect::Expr);
            }
            NodeKind::Expr(ExprKind::Call { args, .. }) => {
                for &arg in args {
                    visit(arg, Expect::Expr);
                }
            }
            NodeKind::Expr(ExprKind::Literal(_) | ExprKind::Ident(_)) => {}
        }
    }

    // Expressions

    fn expr(&mut self, kind: ExprKind, ty: TypeDesc) -> NodeId {
        self.alloc(Node::new(NodeKind::Expr(kind), ty))
    }

    pub fn literal(&mut self, literal: Literal, ty: TypeDesc) -> NodeId {
        self.expr(ExprKind::Literal(literal), ty)
    }

    pub fn int(&mut self, value: i64) -> NodeId {
        self.literal(Literal::Int(value), TypeDesc::INT32)
    }

    pub fn float(&mut self, value: f64) -> NodeId {
        self.literal(Literal::Float(value), TypeDesc::FLOAT32)
    }

    pub fn bool(&mut self, value: bool) -> NodeId {
        self.literal(Literal::Bool(value), TypeDesc::BOOL)
    }

    pub fn char(&mut self, value: char) -> NodeId {
        self.literal(Literal::Char(value), TypeDesc::CHAR)
    }

    pub fn string(&mut self, value: impl Into<String>) -> NodeId {
        self.literal(Literal::Str(value.into()), TypeDesc::STRING)
    }

    pub fn ident(&mut self, name: impl Into<String>, ty: TypeDesc) -> NodeId {
        self.expr(ExprKind::Ident(name.into()), ty)
    }

    pub fn unary(&mut self, op: UnaryOp, operand: NodeId, ty: TypeDesc) -> NodeId {
        self.expr(ExprKind::Unary { op, operand }, ty)
    }

    pub fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId, ty: TypeDesc) -> NodeId {
        self.expr(ExprKind::Binary { op, left, right }, ty)
    }

    pub fn call(&mut self, callee: impl Into<String>, args: Vec<NodeId>, ty: TypeDesc) -> NodeId {
        let callee = callee.into();
        self.expr(ExprKind::Call { callee, args }, ty)
    }

    // Statements

    pub fn let_(&mut self, name: impl Into<String>, ty: TypeDesc, init: Option<NodeId>) -> NodeId {
        let name = name.into();
        self.alloc(Node::new(NodeKind::Let { name, init }, ty))
    }

    pub fn assign(&mut self, target: NodeId, value: NodeId) -> NodeId {
        self.alloc(Node::new(NodeKind::Assign { target, value }, TypeDesc::VOID))
    }

    /// `name = value`, allocating the identifier target.
    pub fn assign_to(&mut self, name: impl Into<String>, ty: TypeDesc, value: NodeId) -> NodeId {
        let target = self.ident(name, ty);
        self.assign(target, value)
    }

    pub fn ret(&mut self, value: Option<NodeId>) -> NodeId {
        self.alloc(Node::new(NodeKind::Return(value), TypeDesc::VOID))
    }

    pub fn expr_stmt(&mut self, expr: NodeId) -> NodeId {
        self.alloc(Node::new(NodeKind::ExprStmt(expr), TypeDesc::VOID))
    }

    // Functions

    pub fn function(
        &mut self,
        name: impl Into<String>,
        params: Vec<Param>,
        ret: TypeDesc,
        body: Vec<NodeId>,
    ) -> NodeId {
        self.alloc_function(FunctionDecl {
            name: name.into(),
            params,
            body,
            is_declaration: false,
            is_static: false,
        }, ret)
    }

    /// A signature with no body.
    pub fn declaration(&mut self, name: impl Into<String>, params: Vec<Param>, ret: TypeDesc) -> NodeId {
        self.alloc_function(FunctionDecl {
            name: name.into(),
            params,
            body: Vec::new(),
            is_declaration: true,
            is_static: false,
        }, ret)
    }

    pub fn alloc_function(&mut self, decl: FunctionDecl, ret: TypeDesc) -> NodeId {
        self.alloc(Node::new(NodeKind::Function(decl), ret))
    }
}
