//! Resource Resolver
//!
//! Maps class names onto the search path and materialises class bytes.

use tracing::debug;

use super::accumulate::drain;
use super::entry::ResourceStream;
use super::name::ClassName;
use super::search::SearchPath;
use super::ResolveError;

/// Looks up compiled units on a [`SearchPath`]
#[derive(Debug, Clone, Copy)]
pub struct ResourceResolver<'a> {
    search_path: &'a SearchPath,
}

impl<'a> ResourceResolver<'a> {
    /// Resolve against an explicit search path
    pub fn new(search_path: &'a SearchPath) -> Self {
        Self { search_path }
    }

    /// The search path consulted by this resolver
    pub fn search_path(&self) -> &'a SearchPath {
        self.search_path
    }

    /// Open the compiled unit for `name`, or `None` if no entry has it.
    pub fn lookup(&self, name: &ClassName) -> Result<Option<ResourceStream>, ResolveError> {
        let resource = name.resource_path();
        debug!(class = %name, resource = %resource, "looking up class");
        self.search_path.open_if_present(&resource)
    }

    /// [`lookup`](Self::lookup) for an unvalidated dotted name
    pub fn lookup_str(&self, name: &str) -> Result<Option<ResourceStream>, ResolveError> {
        self.lookup(&ClassName::parse(name)?)
    }

    /// Full contents of the compiled unit for `name`.
    ///
    /// Absence is `Ok(None)`. Read failures surface as errors and never yield
    /// a truncated buffer.
    pub fn class_bytes_for(&self, name: &ClassName) -> Result<Option<Vec<u8>>, ResolveError> {
        let Some(stream) = self.lookup(name)? else {
            return Ok(None);
        };

        let bytes = drain(stream).map_err(|source| ResolveError::Read {
            resource: name.resource_path(),
            source,
        })?;
        debug!(class = %name, size = bytes.len(), "class bytes loaded");
        Ok(Some(bytes))
    }

    /// [`class_bytes_for`](Self::class_bytes_for) for an unvalidated dotted name
    pub fn class_bytes(&self, name: &str) -> Result<Option<Vec<u8>>, ResolveError> {
        self.class_bytes_for(&ClassName::parse(name)?)
    }
}

impl ResourceResolver<'static> {
    /// Resolve against the process-wide [`SearchPath::system`]
    pub fn system() -> Self {
        Self::new(SearchPath::system())
    }
}
