//! Backend Traits for Codegen Abstraction
//!
//! Follows the `rustc_codegen_ssa/src/traits/` split: the traversal in
//! [`lower`](crate::lower) is written once against these traits, and each
//! backend only implements the leaf operations.
//!
//! Trait hierarchy:
//! - `BackendTypes`: Associated types for backend output (Value, Type)
//! - `TypeMethods`: Type mapping and zero values
//! - `BuilderMethods`: Expression and statement leaves
//! - `CodegenMethods`: Function and module level operations

use std::fmt;

use zap_diagnostic::{missing_symbol, type_mismatch, unsupported_construct, Diagnostic};
use zap_ir::{BinaryOp, FunctionDecl, Literal, NodeId, Param, TypeDesc, UnaryOp};
use zap_sema::{FunctionSymbol, StorageHandle, VariableSymbol};

/// A failed leaf operation. The traversal turns it into a diagnostic
/// attached to the node being lowered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LowerError {
    MissingSymbol { what: &'static str, name: String },
    /// Declared, but storage was never bound.
    Unbound(String),
    TypeMismatch(String),
    Unsupported(String),
}

impl LowerError {
    pub fn missing_function(name: &str) -> Self {
        LowerError::MissingSymbol {
            what: "function",
            name: name.to_owned(),
        }
    }

    pub fn missing_variable(name: &str) -> Self {
        LowerError::MissingSymbol {
            what: "variable",
            name: name.to_owned(),
        }
    }

    pub fn into_diagnostic(self, node: NodeId) -> Diagnostic {
        match self {
            LowerError::MissingSymbol { what, name } => missing_symbol(node, what, &name),
            LowerError::Unbound(name) => missing_symbol(node, "variable", &name)
                .with_note(format!("`{name}` is used before its storage was allocated")),
            LowerError::TypeMismatch(message) => type_mismatch(node, message),
            LowerError::Unsupported(message) => unsupported_construct(node, message),
        }
    }
}

impl fmt::Display for LowerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LowerError::MissingSymbol { what, name } => write!(f, "cannot find {what} `{name}`"),
            LowerError::Unbound(name) => write!(f, "variable `{name}` has no storage"),
            LowerError::TypeMismatch(message) | LowerError::Unsupported(message) => {
                f.write_str(message)
            }
        }
    }
}

/// Where an assignment stores its value.
#[derive(Clone, Debug, PartialEq)]
pub enum Place<V> {
    /// A variable with bound storage.
    Local { handle: StorageHandle, ty: TypeDesc },
    /// `*pointer = value`.
    Deref { pointer: V, pointee: TypeDesc },
    /// Any other left-hand expression.
    Expr { target: V, ty: TypeDesc },
}

/// Associated types for a codegen backend.
///
/// - Value: the result of lowering an expression
/// - Type: a backend type
pub trait BackendTypes {
    type Value: Clone + fmt::Debug;
    type Type: Clone + fmt::Debug;
}

/// Type mapping.
pub trait TypeMethods: BackendTypes {
    /// Total over every [`TypeDesc`].
    fn map_type(&self, ty: &TypeDesc) -> Self::Type;

    /// The value a `let` without an initializer starts with.
    fn zero_value(&self, ty: &TypeDesc) -> Result<Self::Value, LowerError>;
}

/// Expression and statement leaves.
///
/// Every method that can fail returns [`LowerError`]; the traversal reports
/// it exactly once and abandons the node.
pub trait BuilderMethods: TypeMethods {
    /// `None` for `void` literals.
    fn literal(&mut self, literal: &Literal, ty: &TypeDesc) -> Result<Option<Self::Value>, LowerError>;

    fn load(&mut self, var: &VariableSymbol, handle: StorageHandle) -> Result<Self::Value, LowerError>;

    fn address_of(
        &mut self,
        var: &VariableSymbol,
        handle: StorageHandle,
    ) -> Result<Self::Value, LowerError>;

    fn unary(
        &mut self,
        op: UnaryOp,
        operand: Self::Value,
        operand_ty: &TypeDesc,
        ty: &TypeDesc,
    ) -> Result<Self::Value, LowerError>;

    fn binary(
        &mut self,
        op: BinaryOp,
        lhs: Self::Value,
        rhs: Self::Value,
        ty: &TypeDesc,
    ) -> Result<Self::Value, LowerError>;

    /// Arguments arrive already lowered, left to right. `None` when the
    /// call produces no value.
    fn call(
        &mut self,
        callee: &str,
        args: Vec<Self::Value>,
        ty: &TypeDesc,
    ) -> Result<Option<Self::Value>, LowerError>;

    /// Allocate storage for a parameter and copy the incoming value into it.
    fn bind_param(&mut self, param: &Param, index: usize) -> Result<StorageHandle, LowerError>;

    /// Allocate storage for a local and store `init` into it.
    fn declare_local(
        &mut self,
        name: &str,
        ty: &TypeDesc,
        init: Self::Value,
    ) -> Result<StorageHandle, LowerError>;

    fn store(&mut self, place: Place<Self::Value>, value: Self::Value) -> Result<(), LowerError>;

    fn ret(&mut self, value: Option<Self::Value>) -> Result<(), LowerError>;

    /// Evaluate for side effects only.
    fn discard(&mut self, value: Option<Self::Value>);
}

/// Function and module level operations.
pub trait CodegenMethods: BackendTypes {
    /// Runtime functions this backend provides before any user code.
    fn builtins(&mut self) -> Vec<FunctionSymbol> {
        Vec::new()
    }

    /// First phase: make `decl` callable before any body is lowered.
    fn predeclare_function(&mut self, _decl: &FunctionDecl, _ret: &TypeDesc) {}

    /// Second phase, declaration-only functions.
    fn emit_declaration(&mut self, decl: &FunctionDecl, ret: &TypeDesc);

    /// Second phase, defined functions: signature and entry.
    fn begin_function(&mut self, decl: &FunctionDecl, ret: &TypeDesc);

    /// Close the body. `terminated` is true when the last statement was a
    /// `return`.
    fn end_function(&mut self, decl: &FunctionDecl, ret: &TypeDesc, terminated: bool);

    /// Whether `name` resolves in the output emitted so far.
    fn has_symbol(&self, name: &str) -> bool;
}

/// A complete backend.
pub trait Backend: CodegenMethods + BuilderMethods {}

impl<T: CodegenMethods + BuilderMethods> Backend for T {}
