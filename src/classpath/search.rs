//! Ordered search path

use std::ffi::OsStr;
use std::path::Path;

use once_cell::sync::Lazy;
use tracing::debug;

use super::entry::{ClasspathEntry, ResourceStream};
use super::ResolveError;

/// Environment variable holding the system classpath
pub const CLASSPATH_ENV: &str = "CLASSPATH";

static SYSTEM_SEARCH_PATH: Lazy<SearchPath> = Lazy::new(SearchPath::from_env);

/// Directories and archives consulted in order; the first entry holding a
/// resource wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    entries: Vec<ClasspathEntry>,
}

impl SearchPath {
    /// Create an empty search path
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from explicit entries, keeping their order
    pub fn from_entries(entries: impl IntoIterator<Item = ClasspathEntry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Build from filesystem paths, classifying each by suffix
    pub fn from_paths<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>) -> Self {
        Self::from_entries(paths.into_iter().map(ClasspathEntry::from_path))
    }

    /// Parse a platform path list (`a:b.tar` on Unix, `a;b.tar` on Windows).
    /// Empty elements are skipped.
    pub fn parse(list: impl AsRef<OsStr>) -> Self {
        Self::from_paths(
            std::env::split_paths(list.as_ref()).filter(|p| !p.as_os_str().is_empty()),
        )
    }

    /// The search path named by `$CLASSPATH`, or the current directory when
    /// it is unset, as a JVM system class loader would use.
    pub fn from_env() -> Self {
        match std::env::var_os(CLASSPATH_ENV) {
            Some(list) if !list.is_empty() => Self::parse(list),
            _ => Self::from_paths(["."]),
        }
    }

    /// Process-wide search path, built from the environment on first use
    pub fn system() -> &'static SearchPath {
        &SYSTEM_SEARCH_PATH
    }

    /// Append an entry at the lowest priority
    pub fn push(&mut self, entry: ClasspathEntry) {
        self.entries.push(entry);
    }

    /// Append every entry of `other` after the current ones
    pub fn extend(&mut self, other: SearchPath) {
        self.entries.extend(other.entries);
    }

    /// Entries in lookup order
    pub fn entries(&self) -> &[ClasspathEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Open `resource` from the first entry that holds it.
    ///
    /// An I/O failure in an entry consulted before a hit aborts the search;
    /// it is never reported as absence.
    pub fn open_if_present(&self, resource: &str) -> Result<Option<ResourceStream>, ResolveError> {
        for entry in &self.entries {
            let opened = entry
                .open_if_present(resource)
                .map_err(|source| ResolveError::Io {
                    entry: entry.path().to_path_buf(),
                    resource: resource.to_string(),
                    source,
                })?;
            if let Some(stream) = opened {
                return Ok(Some(stream));
            }
        }

        debug!(resource, entries = self.entries.len(), "resource not on search path");
        Ok(None)
    }
}
