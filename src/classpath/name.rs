//! Symbolic class names
//!
//! A class name is a dotted identifier (`a.b.C`). Its resource path swaps every
//! separator for `/` and appends [`CLASS_SUFFIX`].

use std::fmt;
use std::str::FromStr;

use super::ResolveError;

/// Suffix of a compiled unit on the search path
pub const CLASS_SUFFIX: &str = ".class";

/// Separator between segments of a symbolic name
pub const NAME_SEPARATOR: char = '.';

/// Separator between segments of a resource path
pub const RESOURCE_SEPARATOR: char = '/';

/// Convert a dotted name to its resource path.
///
/// Pure and total: no validation happens here, `"a.b.C"` becomes
/// `"a/b/C.class"`.
pub fn resource_path(name: &str) -> String {
    let mut path = name.replace(NAME_SEPARATOR, &RESOURCE_SEPARATOR.to_string());
    path.push_str(CLASS_SUFFIX);
    path
}

/// A validated, fully-qualified class name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassName(String);

impl ClassName {
    /// Parse and validate a dotted class name
    pub fn parse(name: &str) -> Result<Self, ResolveError> {
        if name.is_empty() {
            return Err(ResolveError::InvalidName {
                name: name.to_string(),
                reason: "name is empty",
            });
        }

        for segment in name.split(NAME_SEPARATOR) {
            validate_segment(segment).map_err(|reason| ResolveError::InvalidName {
                name: name.to_string(),
                reason,
            })?;
        }

        Ok(Self(name.to_string()))
    }

    /// The dotted form (`a.b.C`)
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last segment (`C`)
    pub fn simple_name(&self) -> &str {
        self.0
            .rsplit(NAME_SEPARATOR)
            .next()
            .unwrap_or(self.0.as_str())
    }

    /// The package prefix (`a.b`), empty for the default package
    pub fn package(&self) -> &str {
        match self.0.rfind(NAME_SEPARATOR) {
            Some(pos) => &self.0[..pos],
            None => "",
        }
    }

    /// Slash-separated form without suffix (`a/b/C`)
    pub fn internal_name(&self) -> String {
        self.0.replace(NAME_SEPARATOR, &RESOURCE_SEPARATOR.to_string())
    }

    /// Resource path on the search path (`a/b/C.class`)
    pub fn resource_path(&self) -> String {
        resource_path(&self.0)
    }
}

fn validate_segment(segment: &str) -> Result<(), &'static str> {
    let mut chars = segment.chars();
    let first = chars.next().ok_or("empty segment")?;
    if !(first.is_alphabetic() || first == '_' || first == '$') {
        return Err("segment must start with a letter, '_' or '$'");
    }
    if chars.any(|c| !(c.is_alphanumeric() || c == '_' || c == '$')) {
        return Err("segment contains a character that is not a letter, digit, '_' or '$'");
    }
    Ok(())
}

impl FromStr for ClassName {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ClassName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
