//! Dynamic Library Loader
//!
//! Safe wrapper around libloading for loading shared libraries.

use std::collections::HashMap;
use std::ffi::CString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::{Library, Symbol};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::module::{ModuleHandle, ModuleLoader, NativeModule};
use super::FfiError;

/// A dynamically loaded library
pub struct DynamicLibrary {
    /// Path to the library
    path: PathBuf,
    /// The loaded library handle
    library: Library,
    /// Cached function symbols
    symbols: Mutex<HashMap<String, usize>>,
}

impl DynamicLibrary {
    /// Load a library from the given path
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FfiError> {
        let path = path.as_ref().to_path_buf();

        // Safety: loading a library runs its initialisers. We trust the
        // caller-configured search paths to only hold intended libraries.
        let library = unsafe {
            Library::new(&path).map_err(|e| {
                FfiError::LoadError(format!(
                    "Failed to load library '{}': {}",
                    path.display(),
                    e
                ))
            })?
        };

        Ok(Self {
            path,
            library,
            symbols: Mutex::new(HashMap::new()),
        })
    }

    /// Get the path to this library
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get a function symbol by name
    pub fn get_symbol(&self, name: &str) -> Result<usize, FfiError> {
        let mut symbols = self.symbols.lock();
        if let Some(&addr) = symbols.get(name) {
            return Ok(addr);
        }

        let c_name = CString::new(name)
            .map_err(|_| FfiError::InvalidSymbol(format!("Invalid symbol name: {}", name)))?;

        // Safety: the address is only reinterpreted as a function pointer by
        // a binder that knows the symbol's signature.
        let symbol: Symbol<'_, *const ()> = unsafe {
            self.library
                .get(c_name.as_bytes_with_nul())
                .map_err(|_| FfiError::SymbolNotFound {
                    symbol: name.to_string(),
                    library: self.path.display().to_string(),
                })?
        };

        let addr = *symbol as usize;
        symbols.insert(name.to_string(), addr);
        Ok(addr)
    }
}

impl NativeModule for DynamicLibrary {
    fn name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("<library>")
    }

    fn symbol_address(&self, symbol: &str) -> Result<usize, FfiError> {
        self.get_symbol(symbol)
    }
}

impl std::fmt::Debug for DynamicLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicLibrary")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Library loader with search paths
pub struct LibraryLoader {
    /// Search paths for libraries
    search_paths: Vec<PathBuf>,
    /// Loaded libraries
    libraries: Mutex<HashMap<String, Arc<DynamicLibrary>>>,
}

impl LibraryLoader {
    /// Create a new library loader with the platform default search paths
    pub fn new() -> Self {
        Self::with_search_paths(default_search_paths())
    }

    /// Create a loader that only consults `search_paths`, in order
    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            libraries: Mutex::new(HashMap::new()),
        }
    }

    /// Default loader for the process: `[native] search_paths` from
    /// `terrajava.toml` (when one is found) ahead of the platform defaults.
    pub fn system() -> Self {
        let mut search_paths = match crate::config::TerraConfig::load_from_cwd() {
            Ok(config) => config.native_search_paths(),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable terrajava.toml");
                Vec::new()
            }
        };
        search_paths.extend(default_search_paths());
        Self::with_search_paths(search_paths)
    }

    /// Add a search path ahead of all existing ones
    pub fn prepend_search_path(&mut self, path: impl AsRef<Path>) {
        self.search_paths.insert(0, path.as_ref().to_path_buf());
    }

    /// Add a search path
    pub fn add_search_path(&mut self, path: impl AsRef<Path>) {
        self.search_paths.push(path.as_ref().to_path_buf());
    }

    /// Search paths in lookup order
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Find a library by name
    pub fn find_library(&self, name: &str) -> Option<PathBuf> {
        // An explicit path bypasses the search
        let path = Path::new(name);
        if path.components().count() > 1 && path.exists() {
            return Some(path.to_path_buf());
        }

        let lib_name = library_filename(name);
        self.search_paths
            .iter()
            .map(|dir| dir.join(&lib_name))
            .find(|candidate| candidate.is_file())
    }

    /// Load a library by name
    pub fn load_library(&self, name: &str) -> Result<Arc<DynamicLibrary>, FfiError> {
        let mut libraries = self.libraries.lock();
        if let Some(lib) = libraries.get(name) {
            return Ok(Arc::clone(lib));
        }

        let path = self.find_library(name).ok_or_else(|| {
            debug!(library = name, searched = ?self.search_paths, "library not found");
            FfiError::LibraryNotFound {
                name: name.to_string(),
                searched: self.search_paths.len(),
            }
        })?;

        let library = Arc::new(DynamicLibrary::load(&path)?);
        info!(library = name, path = %path.display(), "loaded native library");
        libraries.insert(name.to_string(), Arc::clone(&library));

        Ok(library)
    }

    /// List loaded libraries
    pub fn loaded_libraries(&self) -> Vec<String> {
        self.libraries.lock().keys().cloned().collect()
    }
}

impl Default for LibraryLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleLoader for LibraryLoader {
    fn load(&self, name: &str) -> Result<ModuleHandle, FfiError> {
        let library: ModuleHandle = self.load_library(name)?;
        Ok(library)
    }
}

/// Get the default library search paths for this platform
fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // Next to the running binary (where cargo puts workspace cdylibs)
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        paths.push(dir.clone());
        // Test binaries live one level down, in target/<profile>/deps
        if dir.ends_with("deps") {
            if let Some(parent) = dir.parent() {
                paths.push(parent.to_path_buf());
            }
        }
    }

    // Current directory
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd);
    }

    // Standard system paths
    #[cfg(target_os = "linux")]
    {
        paths.push(PathBuf::from("/usr/lib"));
        paths.push(PathBuf::from("/usr/local/lib"));
        paths.push(PathBuf::from("/lib"));
        paths.push(PathBuf::from("/lib64"));
        paths.push(PathBuf::from("/usr/lib64"));

        // LD_LIBRARY_PATH
        if let Some(ld_path) = std::env::var_os("LD_LIBRARY_PATH") {
            paths.extend(std::env::split_paths(&ld_path));
        }
    }

    #[cfg(target_os = "macos")]
    {
        paths.push(PathBuf::from("/usr/lib"));
        paths.push(PathBuf::from("/usr/local/lib"));
        paths.push(PathBuf::from("/opt/homebrew/lib"));

        // DYLD_LIBRARY_PATH
        if let Some(dyld_path) = std::env::var_os("DYLD_LIBRARY_PATH") {
            paths.extend(std::env::split_paths(&dyld_path));
        }
    }

    #[cfg(target_os = "windows")]
    {
        paths.push(PathBuf::from("C:\\Windows\\System32"));

        // PATH
        if let Some(path) = std::env::var_os("PATH") {
            paths.extend(std::env::split_paths(&path));
        }
    }

    paths
}

/// Construct the platform-specific library filename, as
/// `System.loadLibrary` does
pub fn library_filename(name: &str) -> String {
    #[cfg(target_os = "macos")]
    {
        if name.starts_with("lib") && name.ends_with(".dylib") {
            name.to_string()
        } else {
            format!("lib{}.dylib", name)
        }
    }

    #[cfg(target_os = "windows")]
    {
        if name.ends_with(".dll") {
            name.to_string()
        } else {
            format!("{}.dll", name)
        }
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        if name.starts_with("lib") && name.contains(".so") {
            name.to_string()
        } else {
            format!("lib{}.so", name)
        }
    }
}
