//! Compilation-wide function table.

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use zap_ir::FunctionDecl;

use crate::Scope;

/// Name of the program entry point.
pub const ENTRY_POINT: &str = "main";

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct FunctionFlags: u8 {
        /// Defined outside this translation unit.
        const EXTERN = 1 << 0;
        /// File-local linkage.
        const STATIC = 1 << 1;
        /// Visible to other translation units.
        const PUBLIC = 1 << 2;
    }
}

impl FunctionFlags {
    /// Flags implied by a function node.
    pub fn for_decl(decl: &FunctionDecl) -> Self {
        let mut flags = FunctionFlags::empty();
        flags.set(FunctionFlags::EXTERN, decl.is_declaration);
        if decl.is_static {
            flags |= FunctionFlags::STATIC;
        } else {
            flags |= FunctionFlags::PUBLIC;
        }
        flags
    }
}

/// A function known to the compilation, with its scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionSymbol {
    pub name: String,
    pub flags: FunctionFlags,
    /// Empty until the function body has been lowered.
    pub scope: Scope,
}

impl FunctionSymbol {
    pub fn new(name: impl Into<String>, flags: FunctionFlags) -> Self {
        FunctionSymbol {
            name: name.into(),
            flags,
            scope: Scope::new(),
        }
    }

    pub fn from_decl(decl: &FunctionDecl) -> Self {
        Self::new(decl.name.clone(), FunctionFlags::for_decl(decl))
    }

    pub fn is_extern(&self) -> bool {
        self.flags.contains(FunctionFlags::EXTERN)
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(FunctionFlags::STATIC)
    }

    pub fn is_public(&self) -> bool {
        self.flags.contains(FunctionFlags::PUBLIC)
    }
}

/// Owns every [`FunctionSymbol`], and through them every scope.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolTable {
    functions: FxHashMap<String, FunctionSymbol>,
    /// Registration order, for deterministic iteration.
    order: Vec<String>,
    found_main: bool,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert by name. Last write wins; the previous entry is returned.
    pub fn register_function(&mut self, symbol: FunctionSymbol) -> Option<FunctionSymbol> {
        if symbol.name == ENTRY_POINT {
            self.found_main = true;
        }
        let name = symbol.name.clone();
        let previous = self.functions.insert(name.clone(), symbol);
        if previous.is_none() {
            self.order.push(name);
        }
        previous
    }

    pub fn lookup_function(&self, name: &str) -> Option<&FunctionSymbol> {
        self.functions.get(name)
    }

    /// Hand a lowered function's scope back to its descriptor.
    ///
    /// Returns `false` when no function of that name is registered.
    pub fn attach_scope(&mut self, name: &str, scope: Scope) -> bool {
        match self.functions.get_mut(name) {
            Some(symbol) => {
                symbol.scope = scope;
                true
            }
            None => false,
        }
    }

    /// Whether an entry-point function has been registered.
    pub fn found_main(&self) -> bool {
        self.found_main
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Functions in first-registration order.
    pub fn iter(&self) -> impl Iterator<Item = &FunctionSymbol> {
        self.order.iter().filter_map(|name| self.functions.get(name))
    }
}
