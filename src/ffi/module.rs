//! Native modules
//!
//! A native module is anything that can turn a symbol name into a function
//! address: a dynamically loaded library, or a table of functions linked into
//! the current binary.

use std::collections::HashMap;
use std::sync::Arc;

use super::FfiError;

/// Source of native function addresses
pub trait NativeModule: Send + Sync {
    /// Name used in diagnostics
    fn name(&self) -> &str;

    /// Address of `symbol`, or [`FfiError::SymbolNotFound`]
    fn symbol_address(&self, symbol: &str) -> Result<usize, FfiError>;
}

/// Shared handle on a loaded module. Function tables bound from a module keep
/// a handle so the module outlives every pointer taken from it.
pub type ModuleHandle = Arc<dyn NativeModule>;

/// The `loadOnce(moduleName)` capability
pub trait ModuleLoader: Send + Sync {
    /// Load (or return the already-loaded) module called `name`
    fn load(&self, name: &str) -> Result<ModuleHandle, FfiError>;
}

impl<F> ModuleLoader for F
where
    F: Fn(&str) -> Result<ModuleHandle, FfiError> + Send + Sync,
{
    fn load(&self, name: &str) -> Result<ModuleHandle, FfiError> {
        self(name)
    }
}

/// In-process symbol table, for natives linked statically into the host
#[derive(Debug, Clone, Default)]
pub struct StaticModule {
    name: String,
    symbols: HashMap<String, usize>,
}

impl StaticModule {
    /// Create an empty table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbols: HashMap::new(),
        }
    }

    /// Build a table from `(symbol, address)` pairs
    pub fn from_symbols<S: Into<String>>(
        name: impl Into<String>,
        symbols: impl IntoIterator<Item = (S, usize)>,
    ) -> Self {
        Self {
            name: name.into(),
            symbols: symbols
                .into_iter()
                .map(|(symbol, addr)| (symbol.into(), addr))
                .collect(),
        }
    }

    /// Register a function address
    pub fn insert(&mut self, symbol: impl Into<String>, addr: usize) {
        self.symbols.insert(symbol.into(), addr);
    }

    /// Wrap in a shareable handle
    pub fn into_handle(self) -> ModuleHandle {
        Arc::new(self)
    }
}

impl NativeModule for StaticModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn symbol_address(&self, symbol: &str) -> Result<usize, FfiError> {
        self.symbols
            .get(symbol)
            .copied()
            .ok_or_else(|| FfiError::SymbolNotFound {
                symbol: symbol.to_string(),
                library: self.name.clone(),
            })
    }
}
