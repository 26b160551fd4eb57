//! FFI Type System
//!
//! Field types and method descriptors in JVM descriptor syntax, which is what
//! native symbol names are derived from.

use std::fmt;

use super::FfiError;

/// Types that can appear in a method descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FfiType {
    /// `V` (return position only)
    Void,
    /// `Z`, passed as `jboolean` (u8)
    Boolean,
    /// `B`
    Byte,
    /// `C`, a UTF-16 code unit
    Char,
    /// `S`
    Short,
    /// `I`, passed as `jint` (i32)
    Int,
    /// `J`
    Long,
    /// `F`
    Float,
    /// `D`, passed as `jdouble` (f64)
    Double,
    /// `Lpkg/Name;` with the internal class name
    Object(String),
    /// `[T`
    Array(Box<FfiType>),
}

impl FfiType {
    /// Check if this type is a primitive (including void)
    pub fn is_primitive(&self) -> bool {
        !matches!(self, FfiType::Object(_) | FfiType::Array(_))
    }

    /// Parse one field type from the front of `s`, returning the rest
    fn parse_prefix(s: &str) -> Option<(Self, &str)> {
        let mut chars = s.chars();
        let tag = chars.next()?;
        let rest = chars.as_str();
        let ty = match tag {
            'V' => FfiType::Void,
            'Z' => FfiType::Boolean,
            'B' => FfiType::Byte,
            'C' => FfiType::Char,
            'S' => FfiType::Short,
            'I' => FfiType::Int,
            'J' => FfiType::Long,
            'F' => FfiType::Float,
            'D' => FfiType::Double,
            'L' => {
                let end = rest.find(';')?;
                let class = &rest[..end];
                if class.is_empty() {
                    return None;
                }
                return Some((FfiType::Object(class.to_string()), &rest[end + 1..]));
            }
            '[' => {
                let (element, rest) = Self::parse_prefix(rest)?;
                if element == FfiType::Void {
                    return None;
                }
                return Some((FfiType::Array(Box::new(element)), rest));
            }
            _ => return None,
        };
        Some((ty, rest))
    }
}

impl fmt::Display for FfiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FfiType::Void => write!(f, "V"),
            FfiType::Boolean => write!(f, "Z"),
            FfiType::Byte => write!(f, "B"),
            FfiType::Char => write!(f, "C"),
            FfiType::Short => write!(f, "S"),
            FfiType::Int => write!(f, "I"),
            FfiType::Long => write!(f, "J"),
            FfiType::Float => write!(f, "F"),
            FfiType::Double => write!(f, "D"),
            FfiType::Object(class) => write!(f, "L{};", class),
            FfiType::Array(element) => write!(f, "[{}", element),
        }
    }
}

/// A method descriptor such as `(ID)V`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    /// Parameter types
    pub params: Vec<FfiType>,
    /// Return type
    pub return_type: FfiType,
}

impl MethodDescriptor {
    /// Create a new descriptor
    pub fn new(params: Vec<FfiType>, return_type: FfiType) -> Self {
        Self {
            params,
            return_type,
        }
    }

    /// Parse a descriptor string: `(` field types `)` return type
    pub fn parse(descriptor: &str) -> Result<Self, FfiError> {
        let invalid = || FfiError::InvalidDescriptor(descriptor.to_string());

        let mut rest = descriptor.strip_prefix('(').ok_or_else(invalid)?;
        let mut params = Vec::new();
        while !rest.starts_with(')') {
            let (ty, tail) = FfiType::parse_prefix(rest).ok_or_else(invalid)?;
            if ty == FfiType::Void {
                return Err(invalid());
            }
            params.push(ty);
            rest = tail;
        }

        let (return_type, tail) = FfiType::parse_prefix(&rest[1..]).ok_or_else(invalid)?;
        if !tail.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            params,
            return_type,
        })
    }

    /// The parameter list without parentheses (`ID` for `(ID)V`), which is
    /// what long native symbol names encode.
    pub fn params_descriptor(&self) -> String {
        self.params.iter().map(|p| p.to_string()).collect()
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}){}", self.params_descriptor(), self.return_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_descriptors() {
        let desc = MethodDescriptor::parse("(I)V").unwrap();
        assert_eq!(desc.params, vec![FfiType::Int]);
        assert_eq!(desc.return_type, FfiType::Void);

        let desc = MethodDescriptor::parse("()Z").unwrap();
        assert!(desc.params.is_empty());
        assert_eq!(desc.return_type, FfiType::Boolean);
    }

    #[test]
    fn test_constructed_descriptor_matches_parsed() {
        let built = MethodDescriptor::new(vec![FfiType::Int, FfiType::Double], FfiType::Void);
        assert_eq!(built.to_string(), "(ID)V");
        assert_eq!(MethodDescriptor::parse("(ID)V"), Ok(built));
    }
}
