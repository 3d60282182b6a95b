//! C Type Mapping
//!
//! Maps resolved type descriptors to C type text. Pointer and reference
//! flags add one `*` after the base; the array flag adds `[]`, which C
//! writes after the declared name.

use std::fmt;

use zap_ir::{PrimKind, TypeDesc};

/// A C type, split so it can be written both bare (`int32_t[]`) and as a
/// declarator (`int32_t x[]`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CType {
    pub base: &'static str,
    pub pointer: bool,
    pub array: bool,
}

impl CType {
    /// Declare `name` with this type.
    pub fn declarator(&self, name: &str) -> String {
        let stars = if self.pointer { "*" } else { "" };
        let brackets = if self.array { "[]" } else { "" };
        format!("{}{stars} {name}{brackets}", self.base)
    }
}

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base)?;
        if self.pointer {
            f.write_str("*")?;
        }
        if self.array {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

/// Base C spelling of a primitive kind.
pub fn base_type(kind: PrimKind) -> &'static str {
    match kind {
        PrimKind::Int32 => "int32_t",
        PrimKind::Float32 => "float",
        PrimKind::Bool => "bool",
        PrimKind::Char => "char",
        PrimKind::Void => "void",
        PrimKind::String => "const char*",
        PrimKind::UserType => "struct",
    }
}

pub fn c_type(ty: &TypeDesc) -> CType {
    CType {
        base: base_type(ty.kind),
        pointer: ty.is_indirect(),
        array: ty.is_array,
    }
}

/// Initializer for a `let` without one.
pub fn zero_value(ty: &TypeDesc) -> Option<&'static str> {
    if ty.is_array {
        return Some("{0}");
    }
    if ty.is_indirect() {
        return Some("NULL");
    }
    Some(match ty.kind {
        PrimKind::Int32 => "0",
        PrimKind::Float32 => "0.0f",
        PrimKind::Bool => "false",
        PrimKind::Char => "'\\0'",
        PrimKind::String => "NULL",
        PrimKind::UserType => "{0}",
        PrimKind::Void => return None,
    })
}
