//! Native classes
//!
//! A [`NativeClass`] owns the Unbound → Bound transition for one managed type.
//! The first call to [`NativeClass::binding`] loads the type's library and
//! binds its function table; every later call returns the cached outcome,
//! including a cached failure.

use std::mem;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::classpath::ClassName;

use super::mangle::NativeMethod;
use super::module::{ModuleHandle, ModuleLoader};
use super::{BindingError, FfiError};

/// A typed table of native function pointers for one managed type
pub trait NativeBindings: Sized + Send + Sync + 'static {
    /// Fully-qualified managed class name
    const CLASS: &'static str;

    /// Library holding the native bodies (`System.loadLibrary` name)
    const LIBRARY: &'static str;

    /// Resolve every native method against the loaded module
    fn bind(binder: &Binder) -> Result<Self, FfiError>;
}

/// Resolves native methods of one class against one module
pub struct Binder {
    class: ClassName,
    module: ModuleHandle,
}

impl Binder {
    /// Bind `class`'s natives against `module`
    pub fn new(class: &str, module: ModuleHandle) -> Result<Self, FfiError> {
        let class =
            ClassName::parse(class).map_err(|e| FfiError::InvalidSymbol(e.to_string()))?;
        Ok(Self { class, module })
    }

    /// The class being bound
    pub fn class(&self) -> &ClassName {
        &self.class
    }

    /// The module being bound against; keep it alive alongside any pointer
    /// obtained from [`function`](Self::function)
    pub fn module(&self) -> ModuleHandle {
        Arc::clone(&self.module)
    }

    /// Address of `method`'s body, trying each candidate symbol in order
    pub fn address(&self, method: &NativeMethod) -> Result<usize, FfiError> {
        let mut last_err = None;
        for symbol in method.symbol_candidates(&self.class)? {
            match self.module.symbol_address(&symbol) {
                Ok(addr) => {
                    debug!(
                        class = %self.class,
                        method = method.name,
                        symbol = %symbol,
                        "bound native method"
                    );
                    return Ok(addr);
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| FfiError::InvalidSymbol(method.name.to_string())))
    }

    /// Typed function pointer for `method`.
    ///
    /// # Safety
    ///
    /// `F` must be an `extern "C"` function pointer type whose signature
    /// matches the native body exported for `method`.
    pub unsafe fn function<F: Copy>(&self, method: &NativeMethod) -> Result<F, FfiError> {
        if mem::size_of::<F>() != mem::size_of::<usize>() {
            return Err(FfiError::InvalidSymbol(format!(
                "{}.{} must bind to a function pointer, not a {}-byte value",
                self.class,
                method.name,
                mem::size_of::<F>()
            )));
        }
        let addr = self.address(method)?;
        if addr == 0 {
            return Err(FfiError::InvalidSymbol(format!(
                "{}.{} resolved to a null address",
                self.class, method.name
            )));
        }
        Ok(mem::transmute_copy::<usize, F>(&addr))
    }
}

/// Outcome of the one-time bind, as seen by an instance
#[derive(Debug)]
pub enum Binding<T> {
    /// Natives resolved; the table keeps its module alive
    Bound(Arc<T>),
    /// The load or bind failed; every native call reports `cause`
    Unbound { library: String, cause: FfiError },
}

impl<T: NativeBindings> Binding<T> {
    /// The bound table, or [`BindingError::Unbound`] naming `method`
    pub fn natives(&self, method: &str) -> Result<&T, BindingError> {
        match self {
            Binding::Bound(table) => Ok(table.as_ref()),
            Binding::Unbound { library, cause } => Err(BindingError::Unbound {
                class: T::CLASS.to_string(),
                method: method.to_string(),
                library: library.clone(),
                cause: cause.clone(),
            }),
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, Binding::Bound(_))
    }
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        match self {
            Binding::Bound(table) => Binding::Bound(Arc::clone(table)),
            Binding::Unbound { library, cause } => Binding::Unbound {
                library: library.clone(),
                cause: cause.clone(),
            },
        }
    }
}

/// Process-scoped native state for the managed type `T`
pub struct NativeClass<T> {
    library: String,
    loader: Box<dyn ModuleLoader>,
    state: OnceCell<Result<Arc<T>, FfiError>>,
    load_attempts: AtomicUsize,
}

impl<T: NativeBindings> NativeClass<T> {
    /// Bind `T` from its own [`NativeBindings::LIBRARY`]
    pub fn new(loader: impl ModuleLoader + 'static) -> Self {
        Self::with_library(T::LIBRARY, loader)
    }

    /// Bind `T` from a different library name
    pub fn with_library(library: impl Into<String>, loader: impl ModuleLoader + 'static) -> Self {
        Self {
            library: library.into(),
            loader: Box::new(loader),
            state: OnceCell::new(),
            load_attempts: AtomicUsize::new(0),
        }
    }

    /// Library name this class binds from
    pub fn library(&self) -> &str {
        &self.library
    }

    /// Perform the one-time load (if nobody has yet) and return its outcome.
    ///
    /// Concurrent first callers block until the single attempt finishes.
    pub fn binding(&self) -> Binding<T> {
        match self.state.get_or_init(|| self.load_and_bind()) {
            Ok(table) => Binding::Bound(Arc::clone(table)),
            Err(cause) => Binding::Unbound {
                library: self.library.clone(),
                cause: cause.clone(),
            },
        }
    }

    /// [`binding`](Self::binding) as a `Result`
    pub fn bind(&self) -> Result<Arc<T>, BindingError> {
        match self.binding() {
            Binding::Bound(table) => Ok(table),
            Binding::Unbound { library, cause } => Err(BindingError::Load {
                class: T::CLASS.to_string(),
                library,
                cause,
            }),
        }
    }

    /// Whether the one-time bind has run and succeeded
    pub fn is_bound(&self) -> bool {
        matches!(self.state.get(), Some(Ok(_)))
    }

    /// How many times the loader has been invoked (0 or 1)
    pub fn load_attempts(&self) -> usize {
        self.load_attempts.load(Ordering::SeqCst)
    }

    fn load_and_bind(&self) -> Result<Arc<T>, FfiError> {
        self.load_attempts.fetch_add(1, Ordering::SeqCst);

        let result = self
            .loader
            .load(&self.library)
            .and_then(|module| Binder::new(T::CLASS, module))
            .and_then(|binder| T::bind(&binder));

        match result {
            Ok(table) => {
                info!(class = T::CLASS, library = %self.library, "native methods bound");
                Ok(Arc::new(table))
            }
            Err(e) => {
                warn!(
                    class = T::CLASS,
                    library = %self.library,
                    error = %e,
                    "native binding failed"
                );
                Err(e)
            }
        }
    }
}
