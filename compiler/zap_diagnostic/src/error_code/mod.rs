//! Error codes for code generation diagnostics.
//!
//! Each error code is a unique identifier (e.g., `E4001`) with the first digit
//! indicating the stage that raised it.

use std::fmt;

/// Error codes for all code generation diagnostics.
///
/// Format: E#### where first digit indicates the stage:
/// - E4xxx: Lowering errors (non-fatal, collected per function)
/// - E5xxx: Artifact errors (fatal for the current operation)
/// - W4xxx: Lowering warnings
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lowering Errors (E4xxx)
    /// Identifier or callee not found
    E4001,
    /// Operand lacks a required type property
    E4002,
    /// Operator or node kind not supported by the backend
    E4003,
    /// Malformed tree: dangling or misplaced child reference
    E4004,

    // Artifact Errors (E5xxx)
    /// Output file could not be written
    E5001,
    /// External assembler or linker failed
    E5002,

    // Warnings (W4xxx)
    /// Non-void function without a trailing return
    W4001,
}

impl ErrorCode {
    /// All error codes, for iteration and exhaustive lookups.
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E4001,
        ErrorCode::E4002,
        ErrorCode::E4003,
        ErrorCode::E4004,
        ErrorCode::E5001,
        ErrorCode::E5002,
        ErrorCode::W4001,
    ];

    /// Get the string representation of this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::E4004 => "E4004",
            ErrorCode::E5001 => "E5001",
            ErrorCode::E5002 => "E5002",
            ErrorCode::W4001 => "W4001",
        }
    }

    /// One-line description, used by `Display` and `--explain`-style lookups.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E4001 => "missing symbol",
            ErrorCode::E4002 => "type mismatch",
            ErrorCode::E4003 => "unsupported construct",
            ErrorCode::E4004 => "malformed tree",
            ErrorCode::E5001 => "I/O failure",
            ErrorCode::E5002 => "external tool failure",
            ErrorCode::W4001 => "missing return",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E4001"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}
