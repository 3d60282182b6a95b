//! Per-function variable scopes.
//!
//! A `Scope` maps variable names to their declared type and the opaque
//! storage handle a backend allocated for them. Declaring and binding are two
//! steps: the traversal declares the name, asks the backend to allocate, then
//! binds the returned handle.

use std::collections::hash_map::Entry;
use std::fmt;

use rustc_hash::FxHashMap;
use thiserror::Error;
use zap_ir::TypeDesc;

/// Opaque reference to a variable's storage.
///
/// Each backend decides what a handle stands for (a C local, an `alloca`
/// slot). The scope only stores it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct StorageHandle(u32);

impl StorageHandle {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        StorageHandle(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StorageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot{}", self.0)
    }
}

/// A variable known to a scope.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct VariableSymbol {
    pub name: String,
    pub ty: TypeDesc,
    /// Set once the backend has allocated storage.
    pub storage: Option<StorageHandle>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BindError {
    #[error("variable `{0}` is not declared in this scope")]
    Undeclared(String),
    #[error("variable `{name}` is already bound to {existing}")]
    AlreadyBound {
        name: String,
        existing: StorageHandle,
    },
}

/// Variables of one function.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scope {
    variables: FxHashMap<String, VariableSymbol>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name` with no storage yet.
    ///
    /// Redeclaring a name replaces the old entry with a fresh, unbound one;
    /// later reads see the new variable.
    pub fn declare_variable(&mut self, name: impl Into<String>, ty: TypeDesc) -> &VariableSymbol {
        let name = name.into();
        let symbol = VariableSymbol {
            name: name.clone(),
            ty,
            storage: None,
        };
        match self.variables.entry(name) {
            Entry::Occupied(mut slot) => {
                slot.insert(symbol);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(symbol),
        }
    }

    /// Attach the storage handle to a declared variable. A handle is set
    /// exactly once per declaration.
    pub fn bind_storage(&mut self, name: &str, handle: StorageHandle) -> Result<(), BindError> {
        let symbol = self
            .variables
            .get_mut(name)
            .ok_or_else(|| BindError::Undeclared(name.to_owned()))?;
        if let Some(existing) = symbol.storage {
            return Err(BindError::AlreadyBound {
                name: name.to_owned(),
                existing,
            });
        }
        symbol.storage = Some(handle);
        Ok(())
    }

    pub fn lookup_variable(&self, name: &str) -> Option<&VariableSymbol> {
        self.variables.get(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Variables in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &VariableSymbol> {
        self.variables.values()
    }
}
