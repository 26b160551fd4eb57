//! terrajava Project Configuration
//!
//! Handles parsing and management of terrajava.toml configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::classpath::SearchPath;

/// File name searched for by [`TerraConfig::find_and_load`]
pub const CONFIG_FILE: &str = "terrajava.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root configuration structure matching terrajava.toml.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TerraConfig {
    /// Class search path
    #[serde(default)]
    pub classpath: ClasspathConfig,

    /// Native library loading
    #[serde(default)]
    pub native: NativeConfig,

    /// Directory relative paths are resolved against (the config file's
    /// directory once loaded)
    #[serde(skip)]
    pub root: Option<PathBuf>,
}

impl TerraConfig {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let mut config: TerraConfig = toml::from_str(&content)?;
        config.root = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Load configuration from the current directory or parents.
    pub fn load_from_cwd() -> ConfigResult<Self> {
        let cwd = std::env::current_dir().map_err(ConfigError::Io)?;
        Self::find_and_load(&cwd)
    }

    /// Find and load configuration by searching up from the given directory.
    pub fn find_and_load(start_dir: &Path) -> ConfigResult<Self> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return Self::load(&config_path);
            }
            if !dir.pop() {
                // Reached root without finding config
                return Ok(Self::default());
            }
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn resolve(&self, path: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(path),
            None => PathBuf::from(path),
        }
    }

    /// Search path from `[classpath]`: configured entries first, then
    /// `$CLASSPATH` when `inherit_env` is set.
    pub fn search_path(&self) -> SearchPath {
        let mut search = SearchPath::from_paths(
            self.classpath.entries.iter().map(|entry| self.resolve(entry)),
        );
        if self.classpath.inherit_env {
            search.extend(SearchPath::from_env());
        }
        search
    }

    /// `[native] search_paths`, resolved against the config directory
    pub fn native_search_paths(&self) -> Vec<PathBuf> {
        self.native
            .search_paths
            .iter()
            .map(|path| self.resolve(path))
            .collect()
    }
}

/// Class search path settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClasspathConfig {
    /// Directories and archives, highest priority first
    #[serde(default)]
    pub entries: Vec<String>,

    /// Append the entries of $CLASSPATH after `entries`
    #[serde(default = "default_true")]
    pub inherit_env: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ClasspathConfig {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            inherit_env: true,
        }
    }
}

/// Native library settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NativeConfig {
    /// Directories searched for shared libraries before the platform defaults
    #[serde(default)]
    pub search_paths: Vec<String>,
}
