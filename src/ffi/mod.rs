//! FFI Module for terrajava
//!
//! Binds managed methods to bodies supplied by native libraries.
//!
//! # Architecture
//!
//! ```text
//! first instance of a managed type
//!       │
//!       ▼
//! NativeClass::binding   (once per process; outcome cached)
//!       │
//!       ▼
//! ModuleLoader::load     (LibraryLoader → libloading, or StaticModule)
//!       │
//!       ▼
//! NativeBindings::bind   (Java_<class>_<method>[__<params>] → fn pointers)
//!       │
//!       ▼
//! typed extern "C" call through the bound table
//! ```
//!
//! # Example
//!
//! ```ignore
//! let class: NativeClass<AccumulatorNatives> = NativeClass::new(LibraryLoader::new());
//! let natives = class.bind()?;
//! ```

mod class;
mod error;
mod loader;
mod mangle;
mod module;
mod types;

pub use class::{Binder, Binding, NativeBindings, NativeClass};
pub use error::{BindingError, FfiError};
pub use loader::{library_filename, DynamicLibrary, LibraryLoader};
pub use mangle::{long_name, mangle, short_name, NativeMethod, SYMBOL_PREFIX};
pub use module::{ModuleHandle, ModuleLoader, NativeModule, StaticModule};
pub use types::{FfiType, MethodDescriptor};

#[cfg(test)]
mod tests;
