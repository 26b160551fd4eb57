//! `terrajava.examples.extension.Accumulator`
//!
//! A managed value whose arithmetic lives in the `extension` native library.
//! `value` and `sign` run in-process; `add`, `sqrt` and `is_pos` dispatch
//! through the function table bound when the first instance is built.
//!
//! ```no_run
//! use terrajava::accumulator::Accumulator;
//!
//! let mut acc = Accumulator::new();
//! acc.add(25)?;
//! acc.sqrt()?;
//! assert_eq!(acc.value(), 5.0);
//! # Ok::<(), terrajava::ffi::BindingError>(())
//! ```

mod natives;

use crate::ffi::{Binding, BindingError, NativeClass};

pub use natives::{process_class, AccumulatorNatives, Jboolean, NATIVE_METHODS};

/// Field block handed to native bodies
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AccumulatorFields {
    pub value: f64,
}

/// Operand types accepted by [`Accumulator::add`]. Each implementation is
/// bound to its own native overload.
pub trait AddOperand: Copy {
    #[doc(hidden)]
    fn add_to(self, natives: &AccumulatorNatives, fields: &mut AccumulatorFields);
}

impl AddOperand for i32 {
    fn add_to(self, natives: &AccumulatorNatives, fields: &mut AccumulatorFields) {
        // Safety: `add_int` was bound to `add(I)V`; `fields` is a live,
        // exclusively borrowed field block.
        unsafe { (natives.add_int)(fields, self) }
    }
}

impl AddOperand for f64 {
    fn add_to(self, natives: &AccumulatorNatives, fields: &mut AccumulatorFields) {
        // Safety: `add_double` was bound to `add(D)V`.
        unsafe { (natives.add_double)(fields, self) }
    }
}

/// The example foreign-bound value
#[derive(Debug, Clone)]
pub struct Accumulator {
    fields: AccumulatorFields,
    binding: Binding<AccumulatorNatives>,
}

impl Accumulator {
    /// Construct against the process-wide native class, loading the
    /// `extension` library on first use.
    pub fn new() -> Self {
        Self::with_class(process_class())
    }

    /// Construct against an explicit native class
    pub fn with_class(class: &NativeClass<AccumulatorNatives>) -> Self {
        Self {
            fields: AccumulatorFields::default(),
            binding: class.binding(),
        }
    }

    /// Whether native methods can be dispatched
    pub fn is_bound(&self) -> bool {
        self.binding.is_bound()
    }

    /// Current state
    pub fn value(&self) -> f64 {
        self.fields.value
    }

    /// `-1`, `0` or `+1` by the sign of the state. Zero (either sign) and NaN
    /// report `0`.
    pub fn sign(&self) -> i32 {
        let value = self.fields.value;
        if value > 0.0 {
            1
        } else if value < 0.0 {
            -1
        } else {
            0
        }
    }

    /// Add `x` via the native overload for its type
    pub fn add<T: AddOperand>(&mut self, x: T) -> Result<(), BindingError> {
        let natives = self.binding.natives("add")?;
        x.add_to(natives, &mut self.fields);
        Ok(())
    }

    /// Replace the state with its square root (NaN for negative state)
    pub fn sqrt(&mut self) -> Result<(), BindingError> {
        let natives = self.binding.natives("sqrt")?;
        // Safety: `sqrt` was bound to `sqrt()V`.
        unsafe { (natives.sqrt)(&mut self.fields) };
        Ok(())
    }

    /// Whether the state is strictly positive
    pub fn is_pos(&self) -> Result<bool, BindingError> {
        let natives = self.binding.natives("isPos")?;
        // Safety: `is_pos` was bound to `isPos()Z` and only reads the block.
        let result = unsafe { (natives.is_pos)(&self.fields) };
        Ok(result != 0)
    }
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::{FfiError, ModuleHandle, StaticModule};

    fn static_class() -> NativeClass<AccumulatorNatives> {
        NativeClass::new(|_: &str| -> Result<ModuleHandle, FfiError> {
            let module = StaticModule::from_symbols("extension", extension::exported_symbols());
            Ok(module.into_handle())
        })
    }

    fn broken_class() -> NativeClass<AccumulatorNatives> {
        NativeClass::new(|name: &str| -> Result<ModuleHandle, FfiError> {
            Err(FfiError::LoadError(format!("{name}: cannot open shared object")))
        })
    }

    #[test]
    fn test_sign() {
        let class = broken_class();
        let mut acc = Accumulator::with_class(&class);
        assert_eq!(acc.sign(), 0);

        acc.fields.value = 2.5;
        assert_eq!(acc.sign(), 1);

        acc.fields.value = -0.1;
        assert_eq!(acc.sign(), -1);

        acc.fields.value = -0.0;
        assert_eq!(acc.sign(), 0);

        acc.fields.value = f64::NAN;
        assert_eq!(acc.sign(), 0);
    }

    #[test]
    fn test_native_methods_declared() {
        assert_eq!(NATIVE_METHODS.len(), 4);
        assert!(NATIVE_METHODS.iter().filter(|m| m.name == "add").all(|m| m.overloaded));
    }

    #[test]
    fn test_add_and_sqrt() {
        let class = static_class();
        let mut acc = Accumulator::with_class(&class);
        assert!(acc.is_bound());

        acc.add(25).unwrap();
        assert_eq!(acc.value(), 25.0);
        acc.sqrt().unwrap();
        assert_eq!(acc.value(), 5.0);
        assert!(acc.is_pos().unwrap());
    }

    #[test]
    fn test_unbound_local_methods_still_work() {
        let class = broken_class();
        let mut acc = Accumulator::with_class(&class);
        assert!(!acc.is_bound());
        assert_eq!(acc.value(), 0.0);
        assert_eq!(acc.sign(), 0);

        let err = acc.add(1).unwrap_err();
        assert!(matches!(err, BindingError::Unbound { ref method, .. } if method == "add"));
        assert_eq!(acc.value(), 0.0);
    }
}
