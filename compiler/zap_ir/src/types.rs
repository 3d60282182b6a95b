//! Resolved type descriptors.
//!
//! Every node carries a `TypeDesc` filled in by semantic analysis. The code
//! generators only map these descriptors, they never infer them.

use std::fmt;

/// Closed set of primitive kinds a descriptor can name.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PrimKind {
    Int32,
    Float32,
    Bool,
    Char,
    Void,
    String,
    /// A user-defined aggregate. Backends lower it to their generic form.
    UserType,
}

impl PrimKind {
    /// Every kind, in declaration order.
    pub const ALL: [PrimKind; 7] = [
        PrimKind::Int32,
        PrimKind::Float32,
        PrimKind::Bool,
        PrimKind::Char,
        PrimKind::Void,
        PrimKind::String,
        PrimKind::UserType,
    ];

    /// Source-level spelling of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            PrimKind::Int32 => "i32",
            PrimKind::Float32 => "f32",
            PrimKind::Bool => "bool",
            PrimKind::Char => "char",
            PrimKind::Void => "void",
            PrimKind::String => "string",
            PrimKind::UserType => "<user type>",
        }
    }
}

/// A fully resolved type: primitive kind plus indirection flags.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeDesc {
    pub kind: PrimKind,
    pub is_pointer: bool,
    pub is_array: bool,
    pub is_reference: bool,
}

impl TypeDesc {
    pub const INT32: TypeDesc = TypeDesc::new(PrimKind::Int32);
    pub const FLOAT32: TypeDesc = TypeDesc::new(PrimKind::Float32);
    pub const BOOL: TypeDesc = TypeDesc::new(PrimKind::Bool);
    pub const CHAR: TypeDesc = TypeDesc::new(PrimKind::Char);
    pub const VOID: TypeDesc = TypeDesc::new(PrimKind::Void);
    pub const STRING: TypeDesc = TypeDesc::new(PrimKind::String);

    /// A plain (non-indirect) descriptor of `kind`.
    pub const fn new(kind: PrimKind) -> Self {
        TypeDesc {
            kind,
            is_pointer: false,
            is_array: false,
            is_reference: false,
        }
    }

    #[must_use]
    pub const fn pointer(mut self) -> Self {
        self.is_pointer = true;
        self
    }

    #[must_use]
    pub const fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    #[must_use]
    pub const fn reference(mut self) -> Self {
        self.is_reference = true;
        self
    }

    /// True for a bare `void` with no indirection.
    pub const fn is_void(&self) -> bool {
        matches!(self.kind, PrimKind::Void) && !self.is_indirect() && !self.is_array
    }

    /// Pointers and references are lowered identically.
    pub const fn is_indirect(&self) -> bool {
        self.is_pointer || self.is_reference
    }
}

impl Default for TypeDesc {
    fn default() -> Self {
        TypeDesc::VOID
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_reference {
            write!(f, "&")?;
        }
        write!(f, "{}", self.kind.as_str())?;
        if self.is_pointer {
            write!(f, "*")?;
        }
        if self.is_array {
            write!(f, "[]")?;
        }
        Ok(())
    }
}
