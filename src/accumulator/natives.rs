//! Native function table for `Accumulator`

use once_cell::sync::Lazy;

use crate::ffi::{
    Binder, FfiError, LibraryLoader, ModuleHandle, NativeBindings, NativeClass, NativeMethod,
};

use super::AccumulatorFields;

/// `jboolean`
pub type Jboolean = u8;

pub(crate) const ADD_INT: NativeMethod = NativeMethod::overload("add", "(I)V");
pub(crate) const ADD_DOUBLE: NativeMethod = NativeMethod::overload("add", "(D)V");
pub(crate) const SQRT: NativeMethod = NativeMethod::new("sqrt", "()V");
pub(crate) const IS_POS: NativeMethod = NativeMethod::new("isPos", "()Z");

/// Every native method `Accumulator` declares
pub const NATIVE_METHODS: [NativeMethod; 4] = [ADD_INT, ADD_DOUBLE, SQRT, IS_POS];

static PROCESS_CLASS: Lazy<NativeClass<AccumulatorNatives>> =
    Lazy::new(|| NativeClass::new(LibraryLoader::system()));

/// The process-wide native class, loading `extension` through
/// [`LibraryLoader::system`]
pub fn process_class() -> &'static NativeClass<AccumulatorNatives> {
    &PROCESS_CLASS
}

/// Bound native bodies. Holds the module handle, so the library cannot be
/// unloaded while any instance can still call into it.
pub struct AccumulatorNatives {
    pub(crate) add_int: unsafe extern "C" fn(*mut AccumulatorFields, i32),
    pub(crate) add_double: unsafe extern "C" fn(*mut AccumulatorFields, f64),
    pub(crate) sqrt: unsafe extern "C" fn(*mut AccumulatorFields),
    pub(crate) is_pos: unsafe extern "C" fn(*const AccumulatorFields) -> Jboolean,
    module: ModuleHandle,
}

impl AccumulatorNatives {
    /// Name of the module the table was bound from
    pub fn module_name(&self) -> &str {
        self.module.name()
    }
}

impl NativeBindings for AccumulatorNatives {
    const CLASS: &'static str = "terrajava.examples.extension.Accumulator";
    const LIBRARY: &'static str = "extension";

    fn bind(binder: &Binder) -> Result<Self, FfiError> {
        // Safety: each pointer type mirrors the descriptor of its method, and
        // the `extension` library exports exactly these signatures.
        unsafe {
            Ok(Self {
                add_int: binder.function(&ADD_INT)?,
                add_double: binder.function(&ADD_DOUBLE)?,
                sqrt: binder.function(&SQRT)?,
                is_pos: binder.function(&IS_POS)?,
                module: binder.module(),
            })
        }
    }
}

impl std::fmt::Debug for AccumulatorNatives {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccumulatorNatives")
            .field("module", &self.module.name())
            .finish_non_exhaustive()
    }
}
