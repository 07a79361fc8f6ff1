//! Configuration
//!
//! Layered configuration for the catalog. Sources, lowest precedence first:
//! built-in defaults, the global config file (or an explicit `--config`
//! file), then `MD5DB__*` environment variables. Command-line options are
//! applied on top by the CLI.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default number of rows returned by `query`.
pub const DEFAULT_QUERY_LIMIT: usize = 100;

/// Default number of rows printed by the shell's `show`.
pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store file; None means the platform data directory default.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// File or directory names (or full paths) never cataloged.
    #[serde(default)]
    pub skips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            limit: default_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        ShellConfig {
            page_size: default_page_size(),
        }
    }
}

fn default_limit() -> usize {
    DEFAULT_QUERY_LIMIT
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub shell: ShellConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CatalogConfig {
    /// Configured store file, falling back to the platform default.
    pub fn store_path(&self) -> Result<PathBuf, ApiError> {
        match &self.store.path {
            Some(path) if !path.as_os_str().is_empty() => Ok(path.clone()),
            _ => paths::default_store_path(),
        }
    }
}
