//! terrajava - Compiler bridge support library
//!
//! Supplies the runtime pieces the Terra-Java compiler needs from its host:
//!
//! - **Class bytes**: resolve a fully-qualified class name (`a.b.C`) to the
//!   bytes of `a/b/C.class` on an ordered classpath of directories and
//!   archives. Absence is a normal `None`; I/O failures are errors.
//! - **Native methods**: load a shared library once per process and bind a
//!   managed type's native methods to its exports by JNI-style symbol names,
//!   as typed `extern "C"` function pointers.
//!
//! # Example
//!
//! ```no_run
//! // Resolve against $CLASSPATH (or "." when unset)
//! if let Some(bytes) = terrajava::class_bytes("terrajava.examples.extension.Accumulator")? {
//!     assert_eq!(&bytes[..4], &[0xCA, 0xFE, 0xBA, 0xBE]);
//! }
//! # Ok::<(), terrajava::Error>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐      ┌────────────────────────────┐
//! │ classpath          │      │ ffi                        │
//! │  ClassName         │      │  NativeClass (once)        │
//! │  SearchPath        │      │  LibraryLoader (libloading)│
//! │  ResourceResolver  │      │  Binder (Java_* symbols)   │
//! │  drain             │      └─────────────┬──────────────┘
//! └────────────────────┘                    │
//!                                           ▼
//!                             ┌────────────────────────────┐
//!                             │ accumulator (example)      │
//!                             │  Accumulator               │
//!                             └────────────────────────────┘
//! ```

#![warn(clippy::all)]

pub mod accumulator;
pub mod classpath;
pub mod config;
pub mod ffi;

use thiserror::Error;

// Re-export commonly used types
pub use accumulator::{Accumulator, AccumulatorNatives};
pub use classpath::{
    drain, ClassName, ClasspathEntry, ResolveError, ResourceResolver, ResourceStream, SearchPath,
};
pub use config::{ConfigError, TerraConfig};
pub use ffi::{
    BindingError, DynamicLibrary, FfiError, LibraryLoader, ModuleLoader, NativeClass,
    NativeModule, StaticModule,
};

/// Error type covering every failure the library surfaces
#[derive(Debug, Error)]
pub enum Error {
    /// Class resolution failed (absence is not an error)
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Native methods could not be bound or dispatched
    #[error(transparent)]
    Binding(#[from] BindingError),

    /// terrajava.toml could not be read
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Bytes of the class file for `name` from the system search path, or `None`
/// if no entry has it.
pub fn class_bytes(name: &str) -> Result<Option<Vec<u8>>, Error> {
    Ok(ResourceResolver::system().class_bytes(name)?)
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_name_surfaces_as_resolve_error() {
        assert!(matches!(
            class_bytes("not a class"),
            Err(Error::Resolve(ResolveError::InvalidName { .. }))
        ));
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
