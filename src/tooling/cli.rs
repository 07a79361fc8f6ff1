//! CLI Tooling
//!
//! Command-line interface for all catalog operations. Every mutating command
//! loads the whole store, applies its change, and writes the whole store back.

use crate::alter::{alter, concat};
use crate::catalog::CatalogBuilder;
use crate::config::CatalogConfig;
use crate::error::ApiError;
use crate::export::export_to_path;
use crate::logging::LoggingConfig;
use crate::query::{digest_conflicts, Query};
use crate::report::{format_build_summary, format_query_text, format_records_table};
use crate::shell::{LineSource, ReaderLines, Shell, TerminalLines};
use crate::store::{read_catalog, write_store, Arena, Catalog};
use crate::types::{AlterMode, ExportFormat, Field, LogLevel, MatchMethod};
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// md5db CLI - file digest catalog
#[derive(Parser, Debug)]
#[command(name = "md5db", version)]
#[command(about = "Catalog files by device:path with MD5 digest, size, and modification time")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Store file (overrides store.path from config)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Configuration file path (overrides default config loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply `--log-*` options over the configured logging section.
    pub fn apply_logging_overrides(&self, logging: &mut LoggingConfig) {
        if let Some(level) = self.log_level {
            logging.level = level.to_string();
        }
        if let Some(format) = &self.log_format {
            logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            logging.file = Some(file.clone());
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Walk a directory tree and record every file under DEVICE
    Build {
        /// Device label stored in front of every path
        device: String,
        /// Directory (or single file) to catalog
        root: PathBuf,
        /// File or directory name to leave out (repeatable)
        #[arg(long = "skip")]
        skips: Vec<String>,
    },
    /// Record individual files under DEVICE
    Add {
        device: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Filter, sort, and print store records
    Query {
        /// contain, startwith, endwith, regex, eq, lt, gt
        method: MatchMethod,
        /// path, digest, size, time
        field: Field,
        keyword: String,
        /// Sort field applied after filtering
        #[arg(long)]
        sort: Option<Field>,
        /// Maximum rows; 0 for unlimited (default from config)
        #[arg(long)]
        limit: Option<usize>,
        /// Reverse the result order
        #[arg(long)]
        desc: bool,
        /// Keep records that do not match
        #[arg(long = "not")]
        negate: bool,
    },
    /// Merge stores into DEST; the first source wins on duplicate keys
    Concat {
        dest: PathBuf,
        #[arg(required = true)]
        sources: Vec<PathBuf>,
    },
    /// Write every record to a CSV or JSON file
    Export {
        output: PathBuf,
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
    },
    /// Rewrite every key's device name or drive letter
    Alter {
        /// device-name or drive-letter
        mode: AlterMode,
        value: String,
    },
    /// Interactive exploration of the store
    Shell,
    /// Report records whose digest was seen earlier with a different size
    Conflicts,
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Build { .. } => "build",
        Commands::Add { .. } => "add",
        Commands::Query { .. } => "query",
        Commands::Concat { .. } => "concat",
        Commands::Export { .. } => "export",
        Commands::Alter { .. } => "alter",
        Commands::Shell => "shell",
        Commands::Conflicts => "conflicts",
    }
}

/// CLI context owning the resolved configuration and store path.
#[derive(Debug)]
pub struct CliContext {
    config: CatalogConfig,
    store_path: PathBuf,
}

impl CliContext {
    /// Context over an already loaded configuration. `store` wins over the
    /// configured path.
    pub fn from_config(config: CatalogConfig, store: Option<PathBuf>) -> Result<Self, ApiError> {
        let store_path = match store {
            Some(path) => path,
            None => config.store_path()?,
        };
        Ok(CliContext { config, store_path })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = self.execute_inner(command);
        info!(
            command = command_name(command),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Build {
                device,
                root,
                skips,
            } => self.handle_build(device, root, skips),
            Commands::Add { device, files } => self.handle_add(device, files),
            Commands::Query {
                method,
                field,
                keyword,
                sort,
                limit,
                desc,
                negate,
            } => {
                let query = Query {
                    method: *method,
                    field: *field,
                    sort: *sort,
                    keyword: keyword.clone(),
                    limit: limit.unwrap_or(self.config.query.limit),
                    descending: *desc,
                    negate: *negate,
                };
                self.handle_query(&query)
            }
            Commands::Concat { dest, sources } => self.handle_concat(dest, sources),
            Commands::Export { output, format } => self.handle_export(output, *format),
            Commands::Alter { mode, value } => self.handle_alter(*mode, value),
            Commands::Shell => self.handle_shell(),
            Commands::Conflicts => self.handle_conflicts(),
        }
    }

    /// Existing store, or an empty catalog when the file does not exist yet.
    fn load_or_empty(&self) -> Result<Catalog, ApiError> {
        if self.store_path.exists() {
            Ok(read_catalog(&self.store_path)?)
        } else {
            info!(store = %self.store_path.display(), "store does not exist yet, starting empty");
            Ok(Catalog::new())
        }
    }

    fn save(&self, catalog: &Catalog) -> Result<usize, ApiError> {
        Ok(write_store(catalog.iter(), &self.store_path)?)
    }

    fn handle_build(&self, device: &str, root: &Path, skips: &[String]) -> Result<String, ApiError> {
        if !root.exists() {
            return Err(ApiError::InvalidArgument(format!(
                "root {} does not exist",
                root.display()
            )));
        }
        let builder = CatalogBuilder::new(device)
            .with_skips(self.config.build.skips.iter().cloned())
            .with_skips(skips.iter().cloned());
        let mut catalog = self.load_or_empty()?;
        let summary = builder.build(root, &mut catalog);
        let written = self.save(&catalog)?;
        Ok(format_build_summary(device, &summary, written))
    }

    fn handle_add(&self, device: &str, files: &[PathBuf]) -> Result<String, ApiError> {
        if let Some(bad) = files.iter().find(|f| !f.is_file()) {
            return Err(ApiError::InvalidArgument(format!(
                "{} is not a regular file",
                bad.display()
            )));
        }
        let builder = CatalogBuilder::new(device);
        let mut catalog = self.load_or_empty()?;
        let mut errors = 0usize;
        for file in files {
            let (_, problems) = builder.add_file(file, &mut catalog);
            errors += problems;
        }
        let written = self.save(&catalog)?;
        Ok(format!(
            "Added {} files ({} errors). Total: {} records in store.",
            files.len(),
            errors,
            written
        ))
    }

    fn handle_query(&self, query: &Query) -> Result<String, ApiError> {
        let compiled = query.compile()?;
        let arena = Arena::open(&self.store_path)?;
        let records = arena.records()?;
        let matches = compiled.run(&records);
        let title = format!(
            "{}{} {} {:?}",
            if query.negate { "not " } else { "" },
            query.method,
            query.field,
            query.keyword
        );
        Ok(format_query_text(&title, records.len(), &matches))
    }

    fn handle_concat(&self, dest: &Path, sources: &[PathBuf]) -> Result<String, ApiError> {
        let catalogs = sources
            .iter()
            .map(|source| read_catalog(source))
            .collect::<Result<Vec<_>, _>>()?;
        let merged = concat(catalogs);
        let written = write_store(merged.iter(), dest)?;
        Ok(format!(
            "Merged {} stores into {} ({} records).",
            sources.len(),
            dest.display(),
            written
        ))
    }

    fn handle_export(&self, output: &Path, format: ExportFormat) -> Result<String, ApiError> {
        let arena = Arena::open(&self.store_path)?;
        let records = arena.records()?;
        let rows = export_to_path(&records, format, output)?;
        Ok(format!("Exported {} records to {} ({}).", rows, output.display(), format))
    }

    fn handle_alter(&self, mode: AlterMode, value: &str) -> Result<String, ApiError> {
        let catalog = read_catalog(&self.store_path)?;
        let altered = alter(catalog.iter(), mode, value)?;
        let written = self.save(&altered)?;
        Ok(format!("Altered {} ({}): {} records in store.", mode, value, written))
    }

    fn handle_shell(&self) -> Result<String, ApiError> {
        let arena = Arena::open(&self.store_path)?;
        let records = arena.records()?;
        let mut shell = Shell::new(records, self.config.shell.page_size);
        let stdin = std::io::stdin();
        let mut input: Box<dyn LineSource> = if stdin.is_terminal() {
            Box::new(TerminalLines)
        } else {
            Box::new(ReaderLines::new(stdin.lock()))
        };
        let mut stdout = std::io::stdout().lock();
        shell.run(input.as_mut(), &mut stdout)?;
        Ok(String::new())
    }

    fn handle_conflicts(&self) -> Result<String, ApiError> {
        let arena = Arena::open(&self.store_path)?;
        let records = arena.records()?;
        let conflicts = digest_conflicts(&records);
        if conflicts.is_empty() {
            return Ok(format!("No digest conflicts in {} records.", records.len()));
        }
        Ok(format!(
            "{}\n{} conflicting records.",
            format_records_table(&conflicts),
            conflicts.len()
        ))
    }
}
