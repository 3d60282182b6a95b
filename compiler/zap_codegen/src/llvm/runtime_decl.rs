//! Runtime functions every native module starts with.
//!
//! `puts` is the byte-output primitive from the C library; `println` is
//! defined in the module on top of it. `str_concat` comes from the Zap
//! runtime and is declared only once `~` is used.

use inkwell::builder::BuilderError;
use inkwell::module::Linkage;
use inkwell::types::BasicTypeEnum;
use inkwell::values::FunctionValue;
use zap_sema::{FunctionFlags, FunctionSymbol};

use super::builder::Signature;
use super::LlvmBackend;

pub const PUTS: &str = "puts";
pub const PRINTLN: &str = "println";
pub const STR_CONCAT: &str = "str_concat";

impl<'ctx> LlvmBackend<'ctx> {
    /// Declare `puts` and define `println`.
    pub(super) fn install_runtime(&mut self) -> Result<(), BuilderError> {
        let str_ty = self.types.type_str();
        let i32_ty = self.context.i32_type();

        let puts = self
            .module
            .add_function(PUTS, i32_ty.fn_type(&[str_ty.into()], false), None);
        self.record(PUTS, puts, vec![str_ty], Some(i32_ty.into()));

        let println = self.module.add_function(
            PRINTLN,
            self.types.fn_type(None, &[str_ty], false),
            Some(Linkage::Internal),
        );
        let entry = self.context.append_basic_block(println, "entry");
        self.builder.position_at_end(entry);
        if let Some(text) = println.get_first_param() {
            text.set_name("s");
            self.builder.build_call(puts, &[text.into()], "")?;
        }
        self.builder.build_return(None)?;
        self.builder.clear_insertion_position();
        self.record(PRINTLN, println, vec![str_ty], None);
        Ok(())
    }

    /// Declare `str_concat(i8*, i8*) -> i8*` unless already known.
    pub(super) fn ensure_str_concat(&mut self) -> FunctionValue<'ctx> {
        if let Some(sig) = self.signatures.get(STR_CONCAT) {
            return sig.function;
        }
        let str_ty = self.types.type_str();
        let function = self.module.add_function(
            STR_CONCAT,
            self.types.fn_type(Some(str_ty), &[str_ty, str_ty], false),
            None,
        );
        self.record(STR_CONCAT, function, vec![str_ty, str_ty], Some(str_ty));
        function
    }

    fn record(
        &mut self,
        name: &str,
        function: FunctionValue<'ctx>,
        params: Vec<BasicTypeEnum<'ctx>>,
        ret: Option<BasicTypeEnum<'ctx>>,
    ) {
        self.signatures.insert(
            name.to_owned(),
            Signature {
                function,
                params,
                ret,
                variadic: false,
            },
        );
    }
}

/// Descriptors for the symbol table.
pub fn builtins() -> Vec<FunctionSymbol> {
    vec![
        FunctionSymbol::new(PUTS, FunctionFlags::EXTERN),
        FunctionSymbol::new(PRINTLN, FunctionFlags::PUBLIC),
    ]
}
