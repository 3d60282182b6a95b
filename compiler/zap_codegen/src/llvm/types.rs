//! LLVM type mapping.
//!
//! LLVM 14 still has typed pointers: a `string` is `i8*` and a pointer or
//! reference to `T` is `T*`. `void` and user types have no layout here, so
//! pointers to them are `i8*` and a user value is an `i8*` handle. Arrays
//! become `[0 x T]`, the unsized-array idiom.

use inkwell::context::Context;
use inkwell::types::{BasicMetadataTypeEnum, BasicType, BasicTypeEnum, FunctionType};
use inkwell::AddressSpace;
use zap_ir::{PrimKind, TypeDesc};

/// Maps Zap types onto one LLVM context.
#[derive(Clone, Copy)]
pub struct TypeLowering<'ctx> {
    context: &'ctx Context,
}

impl<'ctx> TypeLowering<'ctx> {
    pub fn new(context: &'ctx Context) -> Self {
        TypeLowering { context }
    }

    /// `i8*`, the type of string constants.
    #[inline]
    pub fn type_str(&self) -> BasicTypeEnum<'ctx> {
        self.type_i8().ptr_type(AddressSpace::default()).into()
    }

    #[inline]
    fn type_i8(&self) -> BasicTypeEnum<'ctx> {
        self.context.i8_type().into()
    }

    fn scalar(&self, kind: PrimKind) -> Option<BasicTypeEnum<'ctx>> {
        Some(match kind {
            PrimKind::Int32 => self.context.i32_type().into(),
            PrimKind::Float32 => self.context.f32_type().into(),
            PrimKind::Bool => self.context.bool_type().into(),
            PrimKind::Char => self.type_i8(),
            PrimKind::String | PrimKind::UserType => self.type_str(),
            PrimKind::Void => return None,
        })
    }

    /// The LLVM type of a value of `ty`; `None` for bare `void`.
    pub fn lower(&self, ty: &TypeDesc) -> Option<BasicTypeEnum<'ctx>> {
        let mut lowered = self.scalar(ty.kind);
        if ty.is_indirect() {
            let pointee = lowered.unwrap_or_else(|| self.type_i8());
            lowered = Some(pointee.ptr_type(AddressSpace::default()).into());
        }
        if ty.is_array {
            // No array of void; the elements are bytes.
            let elem = lowered.unwrap_or_else(|| self.type_i8());
            lowered = Some(elem.array_type(0).into());
        }
        lowered
    }

    /// Parameter slot type. A `void` parameter is rejected when bound, but
    /// the signature still needs a slot; it gets `i8`.
    pub fn lower_param(&self, ty: &TypeDesc) -> BasicTypeEnum<'ctx> {
        self.lower(ty).unwrap_or_else(|| self.type_i8())
    }

    pub fn fn_type(
        &self,
        ret: Option<BasicTypeEnum<'ctx>>,
        params: &[BasicTypeEnum<'ctx>],
        variadic: bool,
    ) -> FunctionType<'ctx> {
        let params: Vec<BasicMetadataTypeEnum<'ctx>> = params.iter().map(|&p| p.into()).collect();
        match ret {
            Some(ret) => ret.fn_type(&params, variadic),
            None => self.context.void_type().fn_type(&params, variadic),
        }
    }
}

/// A type as LLVM prints it, for diagnostics.
pub fn describe(ty: BasicTypeEnum<'_>) -> String {
    ty.print_to_string().to_string()
}

/// Like [`describe`], with `void` for `None`.
pub fn describe_ret(ty: Option<BasicTypeEnum<'_>>) -> String {
    ty.map_or_else(|| "void".to_owned(), describe)
}
