//! Symbols seen by code generation.
//!
//! The [`SymbolTable`] owns one [`FunctionSymbol`] per function, and each
//! function owns the [`Scope`] its body was lowered with. Backends never hold
//! on to their own name maps: they hand out [`StorageHandle`]s and the scope
//! remembers which variable got which.

mod scope;
mod symbol_table;

pub use scope::{BindError, Scope, StorageHandle, VariableSymbol};
pub use symbol_table::{FunctionFlags, FunctionSymbol, SymbolTable, ENTRY_POINT};
