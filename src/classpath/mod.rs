//! Class byte resolution
//!
//! Resolves fully-qualified class names to the bytes of their compiled units
//! by searching an ordered classpath of directories and archives (jar, zip, tar).
//!
//! # Architecture
//!
//! ```text
//! "a.b.C"
//!    │  ClassName::parse
//!    ▼
//! "a/b/C.class"
//!    │  SearchPath::open_if_present  (first entry wins)
//!    ▼
//! ┌──────────────┬──────────────┬──────────────┐
//! │  Directory   │  .jar/.zip   │  .tar(.gz)   │
//! └──────────────┴──────────────┴──────────────┘
//!    │  ResourceStream
//!    ▼
//! drain ──► Vec<u8>
//! ```
//!
//! Absence is `Ok(None)` at every layer. I/O failures are errors and are
//! never folded into absence.
//!
//! # Example
//!
//! ```no_run
//! use terrajava::classpath::{ResourceResolver, SearchPath};
//!
//! let search = SearchPath::from_paths(["build/classes", "lib/runtime.tar.gz"]);
//! let resolver = ResourceResolver::new(&search);
//! if let Some(bytes) = resolver.class_bytes("a.b.C")? {
//!     println!("{} bytes", bytes.len());
//! }
//! # Ok::<(), terrajava::classpath::ResolveError>(())
//! ```

mod accumulate;
mod entry;
mod name;
mod resolver;
mod search;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use accumulate::{drain, drain_with_chunk_size, CHUNK_SIZE};
pub use entry::{ClasspathEntry, ResourceStream};
pub use name::{resource_path, ClassName, CLASS_SUFFIX, NAME_SEPARATOR, RESOURCE_SEPARATOR};
pub use resolver::ResourceResolver;
pub use search::{SearchPath, CLASSPATH_ENV};

/// Errors raised while resolving class bytes. Absence is not one of them.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid class name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("failed to search classpath entry '{}' for {resource}: {source}", .entry.display())]
    Io {
        entry: PathBuf,
        resource: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {resource}: {source}")]
    Read {
        resource: String,
        #[source]
        source: io::Error,
    },
}
