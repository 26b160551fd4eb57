//! Error types for native loading and binding

use thiserror::Error;

/// Error type for FFI operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FfiError {
    /// Library not found on any search path
    #[error("library '{name}' not found (searched {searched} paths)")]
    LibraryNotFound { name: String, searched: usize },

    /// Failed to load a library
    #[error("failed to load library: {0}")]
    LoadError(String),

    /// Symbol not found in library
    #[error("symbol '{symbol}' not found in '{library}'")]
    SymbolNotFound { symbol: String, library: String },

    /// Invalid symbol name
    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Malformed method descriptor
    #[error("invalid method descriptor: {0}")]
    InvalidDescriptor(String),
}

/// Raised when native methods cannot be dispatched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// A native method was called on an instance whose class never bound
    #[error("native method {class}.{method} is unbound: library '{library}' failed to bind: {cause}")]
    Unbound {
        class: String,
        method: String,
        library: String,
        #[source]
        cause: FfiError,
    },

    /// Binding the class's native methods failed
    #[error("failed to bind native methods of {class} from '{library}': {cause}")]
    Load {
        class: String,
        library: String,
        #[source]
        cause: FfiError,
    },
}
