//! Platform directories for the config file, the default store, and the log file.

use crate::error::ApiError;
use directories::ProjectDirs;
use std::path::PathBuf;

/// File name of the default store inside the data directory.
pub const STORE_FILE: &str = "catalog.fmd";

/// File name of the default log inside the state directory.
pub const LOG_FILE: &str = "md5db.log";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "md5db", "md5db")
}

/// `$XDG_CONFIG_HOME/md5db/config.toml` or the platform equivalent.
pub fn config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// `$XDG_DATA_HOME/md5db/catalog.fmd` or the platform equivalent.
pub fn default_store_path() -> Result<PathBuf, ApiError> {
    let dirs = project_dirs().ok_or_else(|| {
        ApiError::ConfigError(
            "Could not determine platform data directory (HOME not set); pass --store".to_string(),
        )
    })?;
    Ok(dirs.data_dir().join(STORE_FILE))
}

/// `$XDG_STATE_HOME/md5db/md5db.log`; platforms without a state directory use
/// the local data directory.
pub fn default_log_file() -> Result<PathBuf, ApiError> {
    let dirs = project_dirs().ok_or_else(|| {
        ApiError::ConfigError(
            "Could not determine platform state directory for log file".to_string(),
        )
    })?;
    let dir = dirs
        .state_dir()
        .unwrap_or_else(|| dirs.data_local_dir())
        .to_path_buf();
    Ok(dir.join(LOG_FILE))
}
