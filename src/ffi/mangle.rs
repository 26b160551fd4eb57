//! Native symbol naming
//!
//! Native method bodies are looked up under JNI-style names:
//!
//! ```text
//! short: Java_<class>_<method>
//! long:  Java_<class>_<method>__<params>
//! ```
//!
//! where each component is escaped with [`mangle`].

use std::fmt::Write;

use crate::classpath::ClassName;

use super::{FfiError, MethodDescriptor};

/// Prefix shared by all native method symbols
pub const SYMBOL_PREFIX: &str = "Java_";

/// Escape a name component for use in a C symbol.
///
/// ASCII alphanumerics pass through, `/` becomes `_`, and `_`, `;`, `[`
/// become `_1`, `_2`, `_3`. Everything else is written as `_0xxxx` per UTF-16
/// code unit.
pub fn mangle(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    for c in component.chars() {
        match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' => out.push(c),
            '/' => out.push('_'),
            '_' => out.push_str("_1"),
            ';' => out.push_str("_2"),
            '[' => out.push_str("_3"),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    // Writing to a String cannot fail
                    let _ = write!(out, "_0{:04x}", unit);
                }
            }
        }
    }
    out
}

/// Symbol name without the parameter signature
pub fn short_name(class: &ClassName, method: &str) -> String {
    format!(
        "{}{}_{}",
        SYMBOL_PREFIX,
        mangle(&class.internal_name()),
        mangle(method)
    )
}

/// Symbol name including the mangled parameter signature
pub fn long_name(class: &ClassName, method: &str, descriptor: &MethodDescriptor) -> String {
    format!(
        "{}__{}",
        short_name(class, method),
        mangle(&descriptor.params_descriptor())
    )
}

/// A method whose body is supplied by a native module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeMethod {
    /// Managed method name
    pub name: &'static str,
    /// JVM method descriptor, e.g. `(I)V`
    pub descriptor: &'static str,
    /// Whether the class declares other native methods with this name
    pub overloaded: bool,
}

impl NativeMethod {
    /// Declare a method with a unique name
    pub const fn new(name: &'static str, descriptor: &'static str) -> Self {
        Self {
            name,
            descriptor,
            overloaded: false,
        }
    }

    /// Declare one of several overloads; overloads bind by long name only
    pub const fn overload(name: &'static str, descriptor: &'static str) -> Self {
        Self {
            name,
            descriptor,
            overloaded: true,
        }
    }

    /// Symbol names to try, in order
    pub fn symbol_candidates(&self, class: &ClassName) -> Result<Vec<String>, FfiError> {
        let descriptor = MethodDescriptor::parse(self.descriptor)?;
        let long = long_name(class, self.name, &descriptor);
        if self.overloaded {
            Ok(vec![long])
        } else {
            Ok(vec![short_name(class, self.name), long])
        }
    }
}
