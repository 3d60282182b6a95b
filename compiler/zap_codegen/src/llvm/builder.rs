//! Per-function state and entry-block allocation.

use inkwell::builder::{Builder, BuilderError};
use inkwell::types::BasicTypeEnum;
use inkwell::values::{FunctionValue, InstructionOpcode, PointerValue};
use zap_sema::StorageHandle;

use crate::traits::LowerError;

/// A callable function as the backend knows it.
#[derive(Clone, Debug)]
pub struct Signature<'ctx> {
    pub function: FunctionValue<'ctx>,
    /// Fixed parameters; variadic ones are not listed.
    pub params: Vec<BasicTypeEnum<'ctx>>,
    /// `None` for `void`.
    pub ret: Option<BasicTypeEnum<'ctx>>,
    pub variadic: bool,
}

pub(crate) fn built(err: BuilderError) -> LowerError {
    LowerError::Unsupported(format!("LLVM builder: {err}"))
}

/// Create an `alloca` in the entry block of `function`, after any allocas
/// already there, and put the builder back where it was.
///
/// Keeping every alloca in the entry block lets `mem2reg` promote them.
pub fn entry_alloca<'ctx>(
    builder: &Builder<'ctx>,
    function: FunctionValue<'ctx>,
    ty: BasicTypeEnum<'ctx>,
    name: &str,
) -> Result<PointerValue<'ctx>, LowerError> {
    let entry = function.get_first_basic_block().ok_or_else(|| {
        LowerError::Unsupported(format!("`{name}` allocated before the entry block exists"))
    })?;
    let current = builder.get_insert_block();

    let mut cursor = entry.get_first_instruction();
    while let Some(instr) = cursor {
        if instr.get_opcode() != InstructionOpcode::Alloca {
            break;
        }
        cursor = instr.get_next_instruction();
    }
    match cursor {
        Some(instr) => builder.position_before(&instr),
        None => builder.position_at_end(entry),
    }

    let ptr = builder.build_alloca(ty, name).map_err(built);

    if let Some(block) = current {
        builder.position_at_end(block);
    }
    ptr
}

#[derive(Clone, Copy, Debug)]
struct Slot<'ctx> {
    ptr: PointerValue<'ctx>,
    ty: BasicTypeEnum<'ctx>,
}

/// The function whose body is being lowered.
#[derive(Debug)]
pub struct FnState<'ctx> {
    pub function: FunctionValue<'ctx>,
    pub ret: Option<BasicTypeEnum<'ctx>>,
    slots: Vec<Slot<'ctx>>,
}

impl<'ctx> FnState<'ctx> {
    pub fn new(function: FunctionValue<'ctx>, ret: Option<BasicTypeEnum<'ctx>>) -> Self {
        FnState {
            function,
            ret,
            slots: Vec::new(),
        }
    }

    /// Reserve an entry-block slot for a variable.
    pub fn alloca(
        &mut self,
        builder: &Builder<'ctx>,
        name: &str,
        ty: BasicTypeEnum<'ctx>,
    ) -> Result<StorageHandle, LowerError> {
        let ptr = entry_alloca(builder, self.function, ty, &format!("{name}.addr"))?;
        let handle = StorageHandle::new(u32::try_from(self.slots.len()).unwrap_or(u32::MAX));
        self.slots.push(Slot { ptr, ty });
        Ok(handle)
    }

    /// Pointer and stored type behind a handle.
    pub fn slot(
        &self,
        handle: StorageHandle,
    ) -> Result<(PointerValue<'ctx>, BasicTypeEnum<'ctx>), LowerError> {
        self.slots
            .get(handle.index())
            .map(|s| (s.ptr, s.ty))
            .ok_or_else(|| LowerError::Unsupported(format!("unknown storage handle {handle}")))
    }
}
