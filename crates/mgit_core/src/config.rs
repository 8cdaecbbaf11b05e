//! Repository configuration stored in `.mgit/config.toml`.

use crate::error::{MgitError, Result};
use crate::hash::HashAlgorithm;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File name of the configuration inside the repository directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Comprehensive configuration for an mgit repository.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Core repository settings.
    #[serde(default)]
    pub core: CoreConfig,

    /// Storage-related configuration.
    #[serde(default)]
    pub storage: StorageConfig,

    /// History display configuration.
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from a file.
    ///
    /// A missing file yields the defaults.
    pub fn load(repo_dir: &Path) -> Result<Self> {
        let path = repo_dir.join(CONFIG_FILE);
        if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| MgitError::ConfigError(format!("failed to read config: {}", e)))?;
            toml::from_str(&content)
                .map_err(|e| MgitError::ConfigError(format!("failed to parse config: {}", e)))
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, repo_dir: &Path) -> Result<()> {
        let path = repo_dir.join(CONFIG_FILE);
        let content = toml::to_string_pretty(self)
            .map_err(|e| MgitError::ConfigError(format!("failed to serialize config: {}", e)))?;
        fs::write(&path, content)
            .map_err(|e| MgitError::ConfigError(format!("failed to write config: {}", e)))?;
        Ok(())
    }
}

/// Core repository settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CoreConfig {
    /// Hash used for blob and commit identifiers (default: blake3).
    /// Changing it on a populated repository orphans existing records.
    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// fsync files and directories after every write (default: true).
    pub fsync: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { fsync: true }
    }
}

/// History display configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LogConfig {
    /// Maximum commits shown by `mgit log` when no limit is given.
    pub default_limit: Option<usize>,
}
