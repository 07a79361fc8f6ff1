//! Error types
//!
//! `StorageError` covers the store file and its codec, `QueryError` covers
//! keyword compilation, and `ApiError` is what command execution returns.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing a store file.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store truncated at offset {offset}: expected {expected} more bytes, found {found}")]
    Truncated {
        offset: u64,
        expected: u64,
        found: u64,
    },

    #[error("corrupt record at offset {offset}: {reason}")]
    CorruptRecord { offset: u64, reason: String },

    #[error("field {field} of {key} is {len} bytes, limit is {max}")]
    FieldTooLong {
        key: String,
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("field {field} of {key} must be empty or exactly {width} bytes of text, got {len}")]
    FieldWidth {
        key: String,
        field: &'static str,
        len: usize,
        width: usize,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised while compiling a query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("size keyword {0:?} is not an unsigned integer")]
    InvalidSize(String),

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Command-level errors.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Query error: {0}")]
    QueryError(#[from] QueryError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
