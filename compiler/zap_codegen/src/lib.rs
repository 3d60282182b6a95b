//! Code Generation for Zap
//!
//! Turns a fully typed [`NodeArena`](zap_ir::NodeArena) into output through
//! one of two backends sharing a single traversal:
//!
//! - **C** ([`CCodegen`]): one portable C translation unit written to disk.
//! - **LLVM** ([`LlvmCompiler`]): an LLVM module built through `inkwell`,
//!   written as textual IR, assembled with `llc` and linked into a native
//!   executable.
//!
//! # Architecture
//!
//! - **Traits** (`traits.rs`): `BackendTypes`, `TypeMethods`,
//!   `BuilderMethods`, `CodegenMethods`, the leaf operations each backend
//!   implements
//! - **Lowering** (`lower/`): expression, statement and function emission,
//!   written once against the traits
//! - **Driver** (`driver.rs`): two-phase module lowering (declare all, then
//!   define all) producing a [`CodegenReport`]
//! - **AOT** (`aot/`): assemble and link through external tools
//!
//! Lowering failures are collected as diagnostics and never stop
//! generation; check [`CodegenReport::has_errors`] before using the output.
//! Writing files and running tools fail fast with [`CodegenError`].
//!
//! # Debugging
//!
//! - `RUST_LOG=zap_codegen=debug`: one event per function and module
//! - `RUST_LOG=zap_codegen=trace`: every statement and expression
//! - `ZAP_LLC` / `ZAP_CC`: override the assembler and linker
//!
//! # Example
//!
//! ```
//! use zap_codegen::CCodegen;
//! use zap_ir::{BinaryOp, NodeArena, TypeDesc};
//!
//! let mut arena = NodeArena::new();
//! let one = arena.int(1);
//! let two = arena.int(2);
//! let sum = arena.binary(BinaryOp::Add, one, two, TypeDesc::INT32);
//! let ret = arena.ret(Some(sum));
//! arena.function("main", vec![], TypeDesc::INT32, vec![ret]);
//!
//! let source = CCodegen::default().generate_source(&arena);
//! assert!(source.code.ends_with("int32_t main()\n{\n    return (1 + 2);\n}\n\n"));
//! ```

#![allow(
    // Float literals are stored as f64 and emitted as f32
    clippy::cast_possible_truncation,
    // `i32` literals are handed to LLVM as sign-extended `u64` bits
    clippy::cast_sign_loss,
    // Lowering threads backend, arena, symbols and diagnostics through
    clippy::too_many_arguments,
    clippy::missing_errors_doc,
)]

pub mod aot;
pub mod c;
pub mod driver;
pub mod error;
pub mod llvm;
pub mod lower;
pub mod options;
pub mod traits;

pub use aot::{Stage, Toolchain};
pub use c::{CCodegen, CSource};
pub use driver::{lower_module, CodegenReport, FunctionSummary};
pub use error::CodegenError;
pub use llvm::LlvmCompiler;
pub use options::CodegenOptions;
pub use traits::{Backend, BackendTypes, BuilderMethods, CodegenMethods, LowerError, Place, TypeMethods};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup; later calls do nothing. Does nothing unless
/// `RUST_LOG` is set. Installing the subscriber panics if the process
/// already has a global one.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_installs_at_most_once() {
        init_tracing();
        init_tracing();
        assert!(TRACING_INIT.is_completed());
    }
}
