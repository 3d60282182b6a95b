//! Typed AST for the Zap code generators.
//!
//! The tree handed to code generation is already resolved: every node has a
//! final [`TypeDesc`] and every name refers to something semantic analysis
//! has seen. This crate only stores it.
//!
//! # Key Types
//!
//! - [`NodeArena`]: flat storage, typed constructors, structural validation
//! - [`Node`] / [`NodeKind`]: closed statement and expression variants
//! - [`TypeDesc`]: primitive kind plus pointer/array/reference flags

mod arena;
mod ast;
mod node_id;
mod types;

pub use arena::{ArenaError, NodeArena};
pub use ast::{BinaryOp, ExprKind, FunctionDecl, Literal, Node, NodeKind, Param, UnaryOp};
pub use node_id::NodeId;
pub use types::{PrimKind, TypeDesc};
