//! Native bodies for `terrajava.examples.extension.Accumulator`
//!
//! Built as `libextension.so` (`extension.dll` on Windows) and loaded once per
//! process by the first `Accumulator` constructed. Every export follows the
//! JNI naming scheme; the overloaded `add` is only exported under its long
//! names so the `int` and `double` variants are distinct symbols.
//!
//! # ABI
//!
//! Each function receives a pointer to the instance's field block, laid out
//! as [`AccumulatorFields`]. A null pointer is ignored (mutators) or reads as
//! `false` (predicates).

#![allow(non_snake_case)]

use std::os::raw::{c_double, c_int};

/// JNI `jboolean`
pub type Jboolean = u8;

/// Field block shared with the managed side. Must match
/// `terrajava::accumulator::AccumulatorFields` exactly.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AccumulatorFields {
    pub value: c_double,
}

/// `void add(int)`
#[no_mangle]
pub unsafe extern "C" fn Java_terrajava_examples_extension_Accumulator_add__I(
    fields: *mut AccumulatorFields,
    x: c_int,
) {
    if let Some(fields) = fields.as_mut() {
        fields.value += x as c_double;
    }
}

/// `void add(double)`
#[no_mangle]
pub unsafe extern "C" fn Java_terrajava_examples_extension_Accumulator_add__D(
    fields: *mut AccumulatorFields,
    x: c_double,
) {
    if let Some(fields) = fields.as_mut() {
        fields.value += x;
    }
}

/// `void sqrt()`
#[no_mangle]
pub unsafe extern "C" fn Java_terrajava_examples_extension_Accumulator_sqrt(
    fields: *mut AccumulatorFields,
) {
    if let Some(fields) = fields.as_mut() {
        fields.value = fields.value.sqrt();
    }
}

/// `boolean isPos()`
#[no_mangle]
pub unsafe extern "C" fn Java_terrajava_examples_extension_Accumulator_isPos(
    fields: *const AccumulatorFields,
) -> Jboolean {
    match fields.as_ref() {
        Some(fields) if fields.value > 0.0 => 1,
        _ => 0,
    }
}

/// Symbol table of every export, for hosts that link this crate statically
/// instead of loading the shared library.
pub fn exported_symbols() -> Vec<(&'static str, usize)> {
    vec![
        (
            "Java_terrajava_examples_extension_Accumulator_add__I",
            Java_terrajava_examples_extension_Accumulator_add__I as usize,
        ),
        (
            "Java_terrajava_examples_extension_Accumulator_add__D",
            Java_terrajava_examples_extension_Accumulator_add__D as usize,
        ),
        (
            "Java_terrajava_examples_extension_Accumulator_sqrt",
            Java_terrajava_examples_extension_Accumulator_sqrt as usize,
        ),
        (
            "Java_terrajava_examples_extension_Accumulator_isPos",
            Java_terrajava_examples_extension_Accumulator_isPos as usize,
        ),
    ]
}
