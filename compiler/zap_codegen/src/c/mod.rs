//! C Code Generation
//!
//! Emits one C translation unit: the runtime include, a blank line, then
//! every top-level function in arena order. Statements are indented four
//! spaces, every binary expression is parenthesized, each function is
//! followed by a blank line.
//!
//! ```text
//! #include "zap_std.h"
//!
//! void log(const char* msg);
//!
//! int32_t main()
//! {
//!     return (1 + 2);
//! }
//!
//! ```

mod runtime;
mod types;
mod writer;

pub use runtime::{is_runtime_symbol, preamble, RUNTIME_SYMBOLS};
pub use types::{c_type, CType};

use std::path::Path;

use rustc_hash::FxHashSet;
use tracing::info;
use zap_ir::{BinaryOp, FunctionDecl, Literal, NodeArena, Param, TypeDesc, UnaryOp};
use zap_sema::{StorageHandle, SymbolTable, VariableSymbol};

use crate::driver::{lower_module, CodegenReport};
use crate::error::CodegenError;
use crate::options::CodegenOptions;
use crate::traits::{BackendTypes, BuilderMethods, CodegenMethods, LowerError, Place, TypeMethods};

use self::writer::SourceWriter;

/// Generated C source together with what happened while producing it.
#[derive(Clone, Debug)]
pub struct CSource {
    pub code: String,
    pub report: CodegenReport,
    /// Every function descriptor, with the scopes lowering filled in.
    pub symbols: SymbolTable,
}

/// C code generator.
pub struct CCodegen {
    options: CodegenOptions,
}

impl CCodegen {
    pub fn new(options: CodegenOptions) -> Self {
        CCodegen { options }
    }

    /// Generate source in memory.
    pub fn generate_source(&self, arena: &NodeArena) -> CSource {
        let mut backend = CBackend::new();
        backend.out.write(&preamble(&self.options.runtime_header));

        let mut symbols = SymbolTable::new();
        let report = lower_module(&mut backend, arena, &mut symbols);

        CSource {
            code: backend.out.take_output(),
            report,
            symbols,
        }
    }

    /// Generate source and write it to `path`.
    ///
    /// The file is written even when the report has lowering errors; check
    /// [`CodegenReport::has_errors`] before using it.
    pub fn generate(&self, arena: &NodeArena, path: &Path) -> Result<CodegenReport, CodegenError> {
        let source = self.generate_source(arena);
        std::fs::write(path, &source.code).map_err(|source| CodegenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), bytes = source.code.len(), "wrote C source");
        Ok(source.report)
    }
}

impl Default for CCodegen {
    fn default() -> Self {
        Self::new(CodegenOptions::default())
    }
}

/// Leaf operations producing C text.
///
/// Values are C expression strings; a storage handle is an index into
/// `locals`, the C name it was declared with.
struct CBackend {
    out: SourceWriter,
    locals: Vec<String>,
    emitted: FxHashSet<String>,
}

impl CBackend {
    fn new() -> Self {
        CBackend {
            out: SourceWriter::new(),
            locals: Vec::new(),
            emitted: FxHashSet::default(),
        }
    }

    fn signature(decl: &FunctionDecl, ret: &TypeDesc) -> String {
        let params: Vec<String> = decl.params.iter().map(Self::param).collect();
        let linkage = if decl.is_static { "static " } else { "" };
        format!("{linkage}{} {}({})", c_type(ret), decl.name, params.join(", "))
    }

    fn param(param: &Param) -> String {
        if param.is_variadic {
            "...".to_owned()
        } else {
            c_type(&param.ty).declarator(&param.name)
        }
    }

    fn new_local(&mut self, name: &str) -> StorageHandle {
        let handle = StorageHandle::new(u32::try_from(self.locals.len()).unwrap_or(u32::MAX));
        self.locals.push(name.to_owned());
        handle
    }

    fn local(&self, handle: StorageHandle) -> Result<&str, LowerError> {
        self.locals
            .get(handle.index())
            .map(String::as_str)
            .ok_or_else(|| LowerError::Unsupported(format!("unknown storage handle {handle}")))
    }
}

impl BackendTypes for CBackend {
    type Value = String;
    type Type = CType;
}

impl TypeMethods for CBackend {
    fn map_type(&self, ty: &TypeDesc) -> CType {
        c_type(ty)
    }

    fn zero_value(&self, ty: &TypeDesc) -> Result<String, LowerError> {
        types::zero_value(ty)
            .map(str::to_owned)
            .ok_or_else(|| LowerError::TypeMismatch(format!("`{ty}` has no zero value")))
    }
}

impl BuilderMethods for CBackend {
    fn literal(&mut self, literal: &Literal, _ty: &TypeDesc) -> Result<Option<String>, LowerError> {
        Ok(match literal {
            Literal::Int(value) => Some(value.to_string()),
            Literal::Float(value) => Some(runtime::float_literal(*value)),
            Literal::Bool(value) => Some(value.to_string()),
            Literal::Char(c) => Some(runtime::char_literal(*c)),
            Literal::Str(s) => Some(runtime::string_literal(s)),
            Literal::Void => None,
        })
    }

    fn load(&mut self, _var: &VariableSymbol, handle: StorageHandle) -> Result<String, LowerError> {
        self.local(handle).map(str::to_owned)
    }

    fn address_of(&mut self, _var: &VariableSymbol, handle: StorageHandle) -> Result<String, LowerError> {
        Ok(format!("&{}", self.local(handle)?))
    }

    fn unary(
        &mut self,
        op: UnaryOp,
        operand: String,
        operand_ty: &TypeDesc,
        _ty: &TypeDesc,
    ) -> Result<String, LowerError> {
        if op == UnaryOp::Deref && !(operand_ty.is_indirect() || operand_ty.is_array) {
            return Err(LowerError::TypeMismatch(format!(
                "cannot dereference a value of type `{operand_ty}`"
            )));
        }
        // `- -1`, not the decrement operator.
        let sep = if op == UnaryOp::Neg && operand.starts_with('-') { " " } else { "" };
        Ok(format!("{}{sep}{operand}", op.token()))
    }

    fn binary(
        &mut self,
        op: BinaryOp,
        lhs: String,
        rhs: String,
        _ty: &TypeDesc,
    ) -> Result<String, LowerError> {
        Ok(match op {
            BinaryOp::Concat => format!("({}({lhs}, {rhs}))", runtime::STR_CONCAT),
            _ => format!("({lhs} {} {rhs})", op.token()),
        })
    }

    fn call(
        &mut self,
        callee: &str,
        args: Vec<String>,
        _ty: &TypeDesc,
    ) -> Result<Option<String>, LowerError> {
        Ok(Some(format!("{callee}({})", args.join(", "))))
    }

    fn bind_param(&mut self, param: &Param, _index: usize) -> Result<StorageHandle, LowerError> {
        Ok(self.new_local(&param.name))
    }

    fn declare_local(
        &mut self,
        name: &str,
        ty: &TypeDesc,
        init: String,
    ) -> Result<StorageHandle, LowerError> {
        self.out
            .writeln(&format!("{} = {init};", c_type(ty).declarator(name)));
        Ok(self.new_local(name))
    }

    fn store(&mut self, place: Place<String>, value: String) -> Result<(), LowerError> {
        let target = match place {
            Place::Local { handle, .. } => self.local(handle)?.to_owned(),
            Place::Deref { pointer, .. } => format!("*{pointer}"),
            Place::Expr { target, .. } => target,
        };
        self.out.writeln(&format!("{target} = {value};"));
        Ok(())
    }

    fn ret(&mut self, value: Option<String>) -> Result<(), LowerError> {
        match value {
            Some(value) => self.out.writeln(&format!("return {value};")),
            None => self.out.writeln("return;"),
        }
        Ok(())
    }

    fn discard(&mut self, value: Option<String>) {
        if let Some(value) = value {
            self.out.writeln(&format!("{value};"));
        }
    }
}

impl CodegenMethods for CBackend {
    fn emit_declaration(&mut self, decl: &FunctionDecl, ret: &TypeDesc) {
        self.emitted.insert(decl.name.clone());
        self.out.write(&Self::signature(decl, ret));
        self.out.write(";\n\n");
    }

    fn begin_function(&mut self, decl: &FunctionDecl, ret: &TypeDesc) {
        self.emitted.insert(decl.name.clone());
        self.locals.clear();
        self.out.write(&Self::signature(decl, ret));
        self.out.write("\n{\n");
        self.out.indent();
    }

    fn end_function(&mut self, _decl: &FunctionDecl, _ret: &TypeDesc, _terminated: bool) {
        self.out.dedent();
        self.out.write("}\n\n");
    }

    fn has_symbol(&self, name: &str) -> bool {
        is_runtime_symbol(name) || self.emitted.contains(name)
    }
}

#[cfg(test)]
mod tests;
