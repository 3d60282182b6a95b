//! Diagnostics for code generation.
//!
//! Lowering failures (missing symbols, type mismatches, unsupported
//! constructs) are not fatal: they are recorded here and the generator keeps
//! going, so one run reports every problem it can find.
//!
//! # Error Guarantees
//!
//! The `ErrorGuaranteed` type provides type-level proof that at least one
//! error was emitted.
//!
//! ```text
//! // Can only get ErrorGuaranteed by emitting an error
//! let guarantee = queue.emit_error(diagnostic);
//!
//! // Lowering returns ErrorGuaranteed to prove it reported the failure
//! fn lower_expr(...) -> Result<Value, ErrorGuaranteed> { ... }
//! ```

mod diagnostic;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{
    malformed_tree, missing_return, missing_symbol, type_mismatch, unsupported_construct,
    Diagnostic, Severity,
};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::DiagnosticQueue;
