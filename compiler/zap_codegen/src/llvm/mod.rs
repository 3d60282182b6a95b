//! LLVM IR Code Generation
//!
//! Builds an LLVM module through `inkwell`, writes it out as textual IR,
//! and hands it to the AOT toolchain (`llc`, then the system linker) for a
//! native executable.
//!
//! Every variable lives in an `alloca` in the entry block, so reads are
//! `load`s and assignments are `store`s through the same pointer:
//!
//! ```text
//! define i32 @main() {
//! entry:
//!   %x.addr = alloca i32, align 4
//!   store i32 5, i32* %x.addr, align 4
//!   %x = load i32, i32* %x.addr, align 4
//!   %add = add i32 %x, 1
//!   store i32 %add, i32* %x.addr, align 4
//!   %x1 = load i32, i32* %x.addr, align 4
//!   ret i32 %x1
//! }
//! ```

mod builder;
mod runtime_decl;
mod types;

use std::io;
use std::path::{Path, PathBuf};

use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::{Linkage, Module};
use inkwell::types::BasicTypeEnum;
use inkwell::values::{
    BasicMetadataValueEnum, BasicValueEnum, FloatValue, FunctionValue, IntValue, PointerValue,
};
use inkwell::{FloatPredicate, IntPredicate};
use rustc_hash::FxHashMap;
use tracing::{debug, error, info, warn};
use zap_ir::{BinaryOp, FunctionDecl, Literal, NodeArena, Param, TypeDesc, UnaryOp};
use zap_sema::{FunctionSymbol, StorageHandle, SymbolTable, VariableSymbol};

use crate::driver::{lower_module, CodegenReport};
use crate::error::CodegenError;
use crate::options::CodegenOptions;
use crate::traits::{BackendTypes, BuilderMethods, CodegenMethods, LowerError, Place, TypeMethods};

use self::builder::{built, FnState, Signature};
use self::types::{describe, describe_ret, TypeLowering};

/// Native compiler: lowers a tree to an LLVM module, writes it out, and
/// drives the toolchain.
///
/// The module lives in the caller's [`Context`]:
///
/// ```
/// use inkwell::context::Context;
/// use zap_codegen::{CodegenOptions, LlvmCompiler};
/// use zap_ir::{NodeArena, TypeDesc};
///
/// let mut arena = NodeArena::new();
/// let zero = arena.int(0);
/// let ret = arena.ret(Some(zero));
/// arena.function("main", vec![], TypeDesc::INT32, vec![ret]);
///
/// let context = Context::create();
/// let mut compiler = LlvmCompiler::new(&context, CodegenOptions::default());
/// assert!(!compiler.compile(&arena).has_errors());
/// assert!(compiler.verify().is_ok());
/// assert!(compiler.ir_text().contains("ret i32 0"));
/// ```
pub struct LlvmCompiler<'ctx> {
    context: &'ctx Context,
    options: CodegenOptions,
    backend: LlvmBackend<'ctx>,
    symbols: SymbolTable,
}

impl<'ctx> LlvmCompiler<'ctx> {
    pub fn new(context: &'ctx Context, options: CodegenOptions) -> Self {
        let backend = LlvmBackend::new(context, &options);
        LlvmCompiler {
            context,
            options,
            backend,
            symbols: SymbolTable::new(),
        }
    }

    /// Lower `arena` into a fresh module, replacing any earlier result.
    pub fn compile(&mut self, arena: &NodeArena) -> CodegenReport {
        self.backend = LlvmBackend::new(self.context, &self.options);
        self.symbols = SymbolTable::new();
        let report = lower_module(&mut self.backend, arena, &mut self.symbols);
        debug!(
            module = %self.options.module_name,
            errors = report.errors().count(),
            "compiled module"
        );
        report
    }

    pub fn module(&self) -> &Module<'ctx> {
        &self.backend.module
    }

    /// The module in textual form.
    pub fn ir_text(&self) -> String {
        self.backend.module.print_to_string().to_string()
    }

    /// Run the LLVM verifier over the module.
    pub fn verify(&self) -> Result<(), String> {
        self.backend.module.verify().map_err(|e| e.to_string())
    }

    /// Function descriptors from the last [`compile`](Self::compile).
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Write the module as textual IR. A module that fails verification is
    /// still written; the failure is logged.
    pub fn emit_ir_to_file(&self, path: &Path) -> Result<(), CodegenError> {
        if let Err(message) = self.verify() {
            warn!(path = %path.display(), %message, "writing a module that fails verification");
        }
        self.backend
            .module
            .print_to_file(path)
            .map_err(|message| CodegenError::Io {
                path: path.to_path_buf(),
                source: io::Error::other(message.to_string()),
            })?;
        info!(path = %path.display(), "wrote LLVM IR");
        Ok(())
    }

    /// Assemble an IR file and link it into `output`; returns the object
    /// file path.
    pub fn assemble_and_link(&self, ir_path: &Path, output: &Path) -> Result<PathBuf, CodegenError> {
        self.options.toolchain.assemble_and_link(ir_path, output)
    }
}

/// Leaf operations building LLVM instructions.
struct LlvmBackend<'ctx> {
    context: &'ctx Context,
    module: Module<'ctx>,
    builder: Builder<'ctx>,
    types: TypeLowering<'ctx>,
    signatures: FxHashMap<String, Signature<'ctx>>,
    /// Equal string literals share one global.
    strings: FxHashMap<String, PointerValue<'ctx>>,
    func: Option<FnState<'ctx>>,
}

impl<'ctx> LlvmBackend<'ctx> {
    fn new(context: &'ctx Context, options: &CodegenOptions) -> Self {
        let module = context.create_module(&options.module_name);
        module.set_source_file_name(&options.source_filename);
        let mut backend = LlvmBackend {
            context,
            module,
            builder: context.create_builder(),
            types: TypeLowering::new(context),
            signatures: FxHashMap::default(),
            strings: FxHashMap::default(),
            func: None,
        };
        if let Err(err) = backend.install_runtime() {
            error!(%err, "could not define the runtime functions");
        }
        backend
    }

    fn active(&self) -> Result<&FnState<'ctx>, LowerError> {
        self.func
            .as_ref()
            .ok_or_else(|| LowerError::Unsupported("instruction outside of a function body".into()))
    }

    /// Make sure the builder points at an open block. Instructions after a
    /// terminator go to a fresh unreachable `dead` block.
    fn open_block(&mut self) -> Result<(), LowerError> {
        let function = self.active()?.function;
        let terminated = self
            .builder
            .get_insert_block()
            .map_or(true, |block| block.get_terminator().is_some());
        if terminated {
            let dead = self.context.append_basic_block(function, "dead");
            self.builder.position_at_end(dead);
        }
        Ok(())
    }

    fn slot(&self, handle: StorageHandle) -> Result<(PointerValue<'ctx>, BasicTypeEnum<'ctx>), LowerError> {
        self.active()?.slot(handle)
    }

    /// Allocate a slot for `name` and store `value` into it.
    fn spill(
        &mut self,
        name: &str,
        ty: BasicTypeEnum<'ctx>,
        value: BasicValueEnum<'ctx>,
    ) -> Result<StorageHandle, LowerError> {
        self.open_block()?;
        let state = self
            .func
            .as_mut()
            .ok_or_else(|| LowerError::Unsupported(format!("`{name}` declared outside of a function")))?;
        let handle = state.alloca(&self.builder, name, ty)?;
        let (ptr, _) = state.slot(handle)?;
        self.builder.build_store(ptr, value).map_err(built)?;
        Ok(handle)
    }

    fn intern_string(&mut self, s: &str) -> Result<BasicValueEnum<'ctx>, LowerError> {
        if let Some(&ptr) = self.strings.get(s) {
            return Ok(ptr.into());
        }
        if s.contains('\0') {
            return Err(LowerError::Unsupported(
                "string literals cannot contain NUL bytes".into(),
            ));
        }
        self.open_block()?;
        let global = self
            .builder
            .build_global_string_ptr(s, ".str")
            .map_err(built)?;
        let ptr = global.as_pointer_value();
        self.strings.insert(s.to_owned(), ptr);
        Ok(ptr.into())
    }

    /// Declare `decl`, reusing an earlier declaration with the same type.
    /// A function that already has a body gets a fresh LLVM function, and
    /// later calls resolve to the newest one.
    fn declare_function(&mut self, decl: &FunctionDecl, ret: &TypeDesc) -> FunctionValue<'ctx> {
        let params: Vec<BasicTypeEnum<'ctx>> = decl
            .params
            .iter()
            .filter(|p| !p.is_variadic)
            .map(|p| self.types.lower_param(&p.ty))
            .collect();
        let ret = self.types.lower(ret);
        let variadic = decl.is_variadic();
        let fn_type = self.types.fn_type(ret, &params, variadic);

        let function = match self.module.get_function(&decl.name) {
            Some(existing) if existing.get_type() == fn_type && existing.count_basic_blocks() == 0 => {
                existing
            }
            _ => self.module.add_function(&decl.name, fn_type, None),
        };
        self.signatures.insert(
            decl.name.clone(),
            Signature {
                function,
                params,
                ret,
                variadic,
            },
        );
        function
    }

    /// Default argument promotion for the variadic part of a call.
    fn promote_vararg(&self, arg: BasicValueEnum<'ctx>) -> Result<BasicValueEnum<'ctx>, LowerError> {
        let promoted: BasicValueEnum<'ctx> = match arg {
            BasicValueEnum::FloatValue(v) if v.get_type() == self.context.f32_type() => self
                .builder
                .build_float_ext(v, self.context.f64_type(), "promote")
                .map_err(built)?
                .into(),
            BasicValueEnum::IntValue(v) if v.get_type().get_bit_width() == 1 => self
                .builder
                .build_int_z_extend(v, self.context.i32_type(), "promote")
                .map_err(built)?
                .into(),
            BasicValueEnum::IntValue(v) if v.get_type().get_bit_width() == 8 => self
                .builder
                .build_int_s_extend(v, self.context.i32_type(), "promote")
                .map_err(built)?
                .into(),
            other => other,
        };
        Ok(promoted)
    }
}

fn expect_type(value: BasicValueEnum<'_>, expected: BasicTypeEnum<'_>, what: &str) -> Result<(), LowerError> {
    let found = value.get_type();
    if found == expected {
        Ok(())
    } else {
        Err(LowerError::TypeMismatch(format!(
            "{what} expects `{}` but the value is `{}`",
            describe(expected),
            describe(found)
        )))
    }
}

fn int_predicate(op: BinaryOp) -> Option<IntPredicate> {
    Some(match op {
        BinaryOp::Eq => IntPredicate::EQ,
        BinaryOp::Ne => IntPredicate::NE,
        BinaryOp::Lt => IntPredicate::SLT,
        BinaryOp::Le => IntPredicate::SLE,
        BinaryOp::Gt => IntPredicate::SGT,
        BinaryOp::Ge => IntPredicate::SGE,
        _ => return None,
    })
}

fn float_predicate(op: BinaryOp) -> Option<FloatPredicate> {
    Some(match op {
        BinaryOp::Eq => FloatPredicate::OEQ,
        BinaryOp::Ne => FloatPredicate::ONE,
        BinaryOp::Lt => FloatPredicate::OLT,
        BinaryOp::Le => FloatPredicate::OLE,
        BinaryOp::Gt => FloatPredicate::OGT,
        BinaryOp::Ge => FloatPredicate::OGE,
        _ => return None,
    })
}

/// `None` when `op` does not apply to integers.
fn int_binary<'ctx>(
    builder: &Builder<'ctx>,
    op: BinaryOp,
    lhs: IntValue<'ctx>,
    rhs: IntValue<'ctx>,
) -> Result<Option<IntValue<'ctx>>, LowerError> {
    if let Some(predicate) = int_predicate(op) {
        return builder
            .build_int_compare(predicate, lhs, rhs, "cmp")
            .map(Some)
            .map_err(built);
    }
    // `&&` and `||` are boolean operators; on wider integers they would
    // silently become bitwise.
    if op.is_logical() && lhs.get_type().get_bit_width() != 1 {
        return Err(LowerError::TypeMismatch(format!(
            "`{op}` needs `i1` operands, found `{}`",
            describe(lhs.get_type().into())
        )));
    }
    let value = match op {
        BinaryOp::Add => builder.build_int_add(lhs, rhs, "add"),
        BinaryOp::Sub => builder.build_int_sub(lhs, rhs, "sub"),
        BinaryOp::Mul => builder.build_int_mul(lhs, rhs, "mul"),
        BinaryOp::Div => builder.build_int_signed_div(lhs, rhs, "div"),
        BinaryOp::Mod => builder.build_int_signed_rem(lhs, rhs, "rem"),
        BinaryOp::And => builder.build_and(lhs, rhs, "and"),
        BinaryOp::Or => builder.build_or(lhs, rhs, "or"),
        _ => return Ok(None),
    };
    value.map(Some).map_err(built)
}

/// `None` when `op` does not apply to floats.
fn float_binary<'ctx>(
    builder: &Builder<'ctx>,
    op: BinaryOp,
    lhs: FloatValue<'ctx>,
    rhs: FloatValue<'ctx>,
) -> Result<Option<BasicValueEnum<'ctx>>, LowerError> {
    if let Some(predicate) = float_predicate(op) {
        let cmp = builder
            .build_float_compare(predicate, lhs, rhs, "fcmp")
            .map_err(built)?;
        return Ok(Some(cmp.into()));
    }
    if !op.is_arithmetic() {
        return Ok(None);
    }
    let value = match op {
        BinaryOp::Add => builder.build_float_add(lhs, rhs, "fadd"),
        BinaryOp::Sub => builder.build_float_sub(lhs, rhs, "fsub"),
        BinaryOp::Mul => builder.build_float_mul(lhs, rhs, "fmul"),
        BinaryOp::Div => builder.build_float_div(lhs, rhs, "fdiv"),
        _ => builder.build_float_rem(lhs, rhs, "frem"),
    };
    value.map(|v| Some(v.into())).map_err(built)
}

impl<'ctx> BackendTypes for LlvmBackend<'ctx> {
    type Value = BasicValueEnum<'ctx>;
    /// `None` for `void`.
    type Type = Option<BasicTypeEnum<'ctx>>;
}

impl<'ctx> TypeMethods for LlvmBackend<'ctx> {
    fn map_type(&self, ty: &TypeDesc) -> Option<BasicTypeEnum<'ctx>> {
        self.types.lower(ty)
    }

    fn zero_value(&self, ty: &TypeDesc) -> Result<BasicValueEnum<'ctx>, LowerError> {
        let zero: BasicValueEnum<'ctx> = match self.types.lower(ty) {
            Some(BasicTypeEnum::IntType(t)) => t.const_zero().into(),
            Some(BasicTypeEnum::FloatType(t)) => t.const_zero().into(),
            Some(BasicTypeEnum::PointerType(t)) => t.const_null().into(),
            Some(BasicTypeEnum::ArrayType(t)) => t.const_zero().into(),
            _ => return Err(LowerError::TypeMismatch(format!("`{ty}` has no zero value"))),
        };
        Ok(zero)
    }
}

impl<'ctx> BuilderMethods for LlvmBackend<'ctx> {
    fn literal(&mut self, literal: &Literal, _ty: &TypeDesc) -> Result<Option<BasicValueEnum<'ctx>>, LowerError> {
        let value: BasicValueEnum<'ctx> = match literal {
            Literal::Int(value) => {
                let value = i32::try_from(*value).map_err(|_| {
                    LowerError::TypeMismatch(format!("integer literal {value} does not fit in `i32`"))
                })?;
                self.context.i32_type().const_int(value as u64, true).into()
            }
            // Rounded to single precision first, so the constant is exact.
            Literal::Float(value) => self
                .context
                .f32_type()
                .const_float(f64::from(*value as f32))
                .into(),
            Literal::Bool(value) => self.context.bool_type().const_int(u64::from(*value), false).into(),
            Literal::Char(c) => {
                let byte = u8::try_from(u32::from(*c)).map_err(|_| {
                    LowerError::TypeMismatch(format!("character {c:?} does not fit in `i8`"))
                })?;
                self.context.i8_type().const_int(u64::from(byte), false).into()
            }
            Literal::Str(s) => self.intern_string(s)?,
            Literal::Void => return Ok(None),
        };
        Ok(Some(value))
    }

    fn load(&mut self, var: &VariableSymbol, handle: StorageHandle) -> Result<BasicValueEnum<'ctx>, LowerError> {
        let (ptr, _) = self.slot(handle)?;
        self.open_block()?;
        self.builder.build_load(ptr, &var.name).map_err(built)
    }

    fn address_of(&mut self, _var: &VariableSymbol, handle: StorageHandle) -> Result<BasicValueEnum<'ctx>, LowerError> {
        let (ptr, _) = self.slot(handle)?;
        Ok(ptr.into())
    }

    fn unary(
        &mut self,
        op: UnaryOp,
        operand: BasicValueEnum<'ctx>,
        operand_ty: &TypeDesc,
        ty: &TypeDesc,
    ) -> Result<BasicValueEnum<'ctx>, LowerError> {
        self.open_block()?;
        let value: BasicValueEnum<'ctx> = match (op, operand) {
            (UnaryOp::Neg, BasicValueEnum::FloatValue(v)) => {
                self.builder.build_float_neg(v, "neg").map_err(built)?.into()
            }
            (UnaryOp::Neg, BasicValueEnum::IntValue(v)) => {
                self.builder.build_int_neg(v, "neg").map_err(built)?.into()
            }
            (UnaryOp::Not, BasicValueEnum::IntValue(v)) => {
                self.builder.build_not(v, "not").map_err(built)?.into()
            }
            (UnaryOp::Deref, BasicValueEnum::PointerValue(ptr)) => {
                if self.types.lower(ty).is_none() {
                    return Err(LowerError::TypeMismatch(format!(
                        "cannot load a `void` value through `{operand_ty}`"
                    )));
                }
                self.builder.build_load(ptr, "deref").map_err(built)?
            }
            (UnaryOp::Deref, _) => {
                return Err(LowerError::TypeMismatch(format!(
                    "cannot dereference a value of type `{operand_ty}`"
                )));
            }
            (UnaryOp::AddrOf, _) => {
                return Err(LowerError::Unsupported(
                    "`&` can only take the address of a variable".into(),
                ));
            }
            (op, value) => {
                return Err(LowerError::TypeMismatch(format!(
                    "`{}` cannot be applied to `{}`",
                    op.token(),
                    describe(value.get_type())
                )));
            }
        };
        Ok(value)
    }

    fn binary(
        &mut self,
        op: BinaryOp,
        lhs: BasicValueEnum<'ctx>,
        rhs: BasicValueEnum<'ctx>,
        _ty: &TypeDesc,
    ) -> Result<BasicValueEnum<'ctx>, LowerError> {
        if op == BinaryOp::Concat {
            let str_ty = self.types.type_str();
            expect_type(lhs, str_ty, "`~`")?;
            expect_type(rhs, str_ty, "`~`")?;
            let concat = self.ensure_str_concat();
            self.open_block()?;
            let call = self
                .builder
                .build_call(concat, &[lhs.into(), rhs.into()], "concat")
                .map_err(built)?;
            return call.try_as_basic_value().basic().ok_or_else(|| {
                LowerError::Unsupported(format!("`{}` returned no value", runtime_decl::STR_CONCAT))
            });
        }

        if lhs.get_type() != rhs.get_type() {
            return Err(LowerError::TypeMismatch(format!(
                "operands of `{op}` have different types `{}` and `{}`",
                describe(lhs.get_type()),
                describe(rhs.get_type())
            )));
        }

        self.open_block()?;
        let value: Option<BasicValueEnum<'ctx>> = match (lhs, rhs) {
            (BasicValueEnum::IntValue(l), BasicValueEnum::IntValue(r)) => {
                int_binary(&self.builder, op, l, r)?.map(Into::into)
            }
            (BasicValueEnum::FloatValue(l), BasicValueEnum::FloatValue(r)) => {
                float_binary(&self.builder, op, l, r)?
            }
            (BasicValueEnum::PointerValue(l), BasicValueEnum::PointerValue(r))
                if matches!(op, BinaryOp::Eq | BinaryOp::Ne) =>
            {
                let i64_ty = self.context.i64_type();
                let l = self.builder.build_ptr_to_int(l, i64_ty, "addr").map_err(built)?;
                let r = self.builder.build_ptr_to_int(r, i64_ty, "addr").map_err(built)?;
                int_binary(&self.builder, op, l, r)?.map(Into::into)
            }
            _ => None,
        };
        value.ok_or_else(|| {
            LowerError::TypeMismatch(format!(
                "`{op}` cannot be applied to `{}`",
                describe(lhs.get_type())
            ))
        })
    }

    fn call(
        &mut self,
        callee: &str,
        args: Vec<BasicValueEnum<'ctx>>,
        _ty: &TypeDesc,
    ) -> Result<Option<BasicValueEnum<'ctx>>, LowerError> {
        let sig = self
            .signatures
            .get(callee)
            .cloned()
            .ok_or_else(|| LowerError::missing_function(callee))?;

        let fixed = sig.params.len();
        if args.len() < fixed || (!sig.variadic && args.len() != fixed) {
            return Err(LowerError::TypeMismatch(format!(
                "`{callee}` takes {fixed} argument(s) but {} were supplied",
                args.len()
            )));
        }
        for (&arg, &param) in args.iter().zip(&sig.params) {
            expect_type(arg, param, &format!("argument of `{callee}`"))?;
        }

        self.open_block()?;
        let mut lowered: Vec<BasicMetadataValueEnum<'ctx>> = Vec::with_capacity(args.len());
        for (i, arg) in args.into_iter().enumerate() {
            let arg = if i >= fixed { self.promote_vararg(arg)? } else { arg };
            lowered.push(arg.into());
        }
        // Void calls cannot carry a name.
        let name = if sig.ret.is_some() { "call" } else { "" };
        let call = self
            .builder
            .build_call(sig.function, &lowered, name)
            .map_err(built)?;
        Ok(call.try_as_basic_value().basic())
    }

    fn bind_param(&mut self, param: &Param, index: usize) -> Result<StorageHandle, LowerError> {
        let Some(ty) = self.types.lower(&param.ty) else {
            return Err(LowerError::TypeMismatch(format!(
                "parameter `{}` cannot have type `void`",
                param.name
            )));
        };
        let function = self.active()?.function;
        let incoming = u32::try_from(index)
            .ok()
            .and_then(|i| function.get_nth_param(i))
            .ok_or_else(|| LowerError::Unsupported(format!("no incoming value for parameter {index}")))?;
        let name = if param.name.is_empty() {
            format!("arg.{index}")
        } else {
            param.name.clone()
        };
        self.spill(&name, ty, incoming)
    }

    fn declare_local(
        &mut self,
        name: &str,
        ty: &TypeDesc,
        init: BasicValueEnum<'ctx>,
    ) -> Result<StorageHandle, LowerError> {
        let Some(lowered) = self.types.lower(ty) else {
            return Err(LowerError::TypeMismatch(format!(
                "variable `{name}` cannot have type `void`"
            )));
        };
        expect_type(init, lowered, &format!("`let {name}`"))?;
        self.spill(name, lowered, init)
    }

    fn store(&mut self, place: Place<BasicValueEnum<'ctx>>, value: BasicValueEnum<'ctx>) -> Result<(), LowerError> {
        let ptr = match place {
            Place::Local { handle, .. } => {
                let (ptr, ty) = self.slot(handle)?;
                expect_type(value, ty, "assignment")?;
                ptr
            }
            Place::Deref { pointer, pointee } => {
                let BasicValueEnum::PointerValue(ptr) = pointer else {
                    return Err(LowerError::TypeMismatch(format!(
                        "store through `*` expects a pointer but the value is `{}`",
                        describe(pointer.get_type())
                    )));
                };
                let Some(pointee) = self.types.lower(&pointee) else {
                    return Err(LowerError::TypeMismatch(
                        "cannot store a value through a `void` pointer".into(),
                    ));
                };
                expect_type(value, pointee, "assignment")?;
                ptr
            }
            Place::Expr { .. } => {
                return Err(LowerError::Unsupported(
                    "assignment target has no storage".into(),
                ));
            }
        };
        self.open_block()?;
        self.builder.build_store(ptr, value).map_err(built)?;
        Ok(())
    }

    fn ret(&mut self, value: Option<BasicValueEnum<'ctx>>) -> Result<(), LowerError> {
        let ret_ty = self.active()?.ret;
        match (value, ret_ty) {
            (None, None) => {
                self.open_block()?;
                self.builder.build_return(None).map_err(built)?;
            }
            (None, Some(ty)) => {
                return Err(LowerError::TypeMismatch(format!(
                    "`return` without a value in a function returning `{}`",
                    describe(ty)
                )));
            }
            (Some(value), None) => {
                return Err(LowerError::TypeMismatch(format!(
                    "`return` of a `{}` value in a function returning `void`",
                    describe(value.get_type())
                )));
            }
            (Some(value), Some(ty)) => {
                expect_type(value, ty, "`return`")?;
                self.open_block()?;
                self.builder.build_return(Some(&value)).map_err(built)?;
            }
        }
        Ok(())
    }

    fn discard(&mut self, _value: Option<BasicValueEnum<'ctx>>) {}
}

impl<'ctx> CodegenMethods for LlvmBackend<'ctx> {
    fn builtins(&mut self) -> Vec<FunctionSymbol> {
        runtime_decl::builtins()
    }

    fn predeclare_function(&mut self, decl: &FunctionDecl, ret: &TypeDesc) {
        self.declare_function(decl, ret);
    }

    fn emit_declaration(&mut self, decl: &FunctionDecl, ret: &TypeDesc) {
        self.declare_function(decl, ret);
    }

    fn begin_function(&mut self, decl: &FunctionDecl, ret: &TypeDesc) {
        let function = self.declare_function(decl, ret);
        if decl.is_static {
            function.set_linkage(Linkage::Internal);
        }
        let fixed = decl.params.iter().filter(|p| !p.is_variadic);
        for (param, value) in fixed.zip(function.get_param_iter()) {
            if !param.name.is_empty() {
                value.set_name(&param.name);
            }
        }
        let entry = self.context.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);
        self.func = Some(FnState::new(function, self.types.lower(ret)));
    }

    fn end_function(&mut self, decl: &FunctionDecl, _ret: &TypeDesc, _terminated: bool) {
        let Some(state) = self.func.take() else {
            return;
        };
        // Falling off the end: `ret void` is the natural epilogue; any other
        // type has no value to return.
        let open = self
            .builder
            .get_insert_block()
            .is_some_and(|block| block.get_terminator().is_none());
        if open {
            let closed = match state.ret {
                None => self.builder.build_return(None),
                Some(_) => self.builder.build_unreachable(),
            };
            if let Err(err) = closed {
                warn!(function = %decl.name, %err, "could not close function body");
            }
        }
        self.builder.clear_insertion_position();
        debug!(
            function = %decl.name,
            returns = %describe_ret(state.ret),
            blocks = state.function.count_basic_blocks(),
            "defined function"
        );
    }

    fn has_symbol(&self, name: &str) -> bool {
        self.signatures.contains_key(name)
    }
}
