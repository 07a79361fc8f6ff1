//! md5db: File Digest Catalog
//!
//! Catalogs files into a persistent store keyed by `device:path`, recording an
//! MD5 digest, size, and modification time per file, and queries, sorts, and
//! exports that store in parallel.

pub mod alter;
pub mod catalog;
pub mod config;
pub mod digest;
pub mod error;
pub mod export;
pub mod logging;
pub mod query;
pub mod report;
pub mod shell;
pub mod store;
pub mod tooling;
pub mod types;
