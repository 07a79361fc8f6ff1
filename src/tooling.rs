//! Tooling & Integration Layer
//!
//! Command-line entry points over the catalog, query engine, and shell.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
