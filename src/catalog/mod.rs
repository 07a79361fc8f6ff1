//! Catalog Builder
//!
//! Walks a directory tree with an explicit work queue and records every
//! regular file as `device:path -> (digest, size, modified)`. The walk is
//! sequential. Errors on one entry are logged and never stop the walk; a
//! visited file always produces a record, degraded when its metadata could
//! not be read.

pub mod inspect;

pub use inspect::{format_local_time, inspect_file, Inspection};

use crate::store::{make_key, Catalog, Entry};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Counters reported after a walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub files: usize,
    pub directories: usize,
    pub skipped: usize,
    pub symlinks: usize,
    pub errors: usize,
}

/// Builds catalog records for one device label.
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    device: String,
    skips: HashSet<String>,
}

impl CatalogBuilder {
    pub fn new(device: impl Into<String>) -> Self {
        CatalogBuilder {
            device: device.into(),
            skips: HashSet::new(),
        }
    }

    /// Entries whose file name or full path equals one of `skips` are
    /// ignored; skipped directories are not descended.
    pub fn with_skips<I, S>(mut self, skips: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skips.extend(skips.into_iter().map(Into::into));
        self
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    fn is_skipped(&self, path: &Path) -> bool {
        if self.skips.is_empty() {
            return false;
        }
        let by_name = path
            .file_name()
            .map(|name| self.skips.contains(name.to_string_lossy().as_ref()))
            .unwrap_or(false);
        by_name || self.skips.contains(path.to_string_lossy().as_ref())
    }

    /// Record key for a path on this device.
    pub fn key_for(&self, path: &Path) -> String {
        let simplified = dunce::simplified(path);
        let text = simplified.to_string_lossy();
        if simplified.to_str().is_none() {
            warn!(path = %simplified.display(), "path is not valid UTF-8, key uses replacement characters");
        }
        make_key(&self.device, &text)
    }

    /// Inspect one file and upsert its record. Returns the stored entry and
    /// the number of problems encountered.
    pub fn add_file(&self, path: &Path, catalog: &mut Catalog) -> (Entry, usize) {
        let inspection = inspect_file(path);
        let key = self.key_for(path);
        debug!(
            key = %key,
            digest = %inspection.entry.digest,
            size = inspection.entry.size,
            modified = %inspection.entry.modified,
            "recorded file"
        );
        catalog.upsert(key, inspection.entry.clone());
        (inspection.entry, inspection.errors)
    }

    /// Walk `root` and upsert a record for every regular file found.
    pub fn build(&self, root: &Path, catalog: &mut Catalog) -> BuildSummary {
        info!(device = %self.device, root = %root.display(), "building catalog");
        let mut summary = BuildSummary::default();
        let mut queue: VecDeque<PathBuf> = VecDeque::new();

        // The root itself is resolved through links; only children are skipped.
        match std::fs::metadata(root) {
            Ok(meta) if meta.is_file() => {
                let (_, errors) = self.add_file(root, catalog);
                summary.files += 1;
                summary.errors += errors;
            }
            Ok(_) => queue.push_back(root.to_path_buf()),
            Err(e) => {
                warn!(root = %root.display(), error = %e, "cannot read root");
                summary.errors += 1;
            }
        }

        while let Some(dir) = queue.pop_front() {
            summary.directories += 1;
            self.visit_directory(&dir, &mut queue, catalog, &mut summary);
        }

        info!(
            device = %self.device,
            files = summary.files,
            directories = summary.directories,
            skipped = summary.skipped,
            errors = summary.errors,
            "catalog walk finished"
        );
        summary
    }

    fn visit_directory(
        &self,
        dir: &Path,
        queue: &mut VecDeque<PathBuf>,
        catalog: &mut Catalog,
        summary: &mut BuildSummary,
    ) {
        let children = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for child in children {
            let entry = match child {
                Ok(entry) => entry,
                Err(e) => {
                    let at = e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| dir.display().to_string());
                    warn!(path = %at, error = %e, "failed to enumerate entry");
                    summary.errors += 1;
                    continue;
                }
            };

            let path = entry.path();
            let file_type = entry.file_type();
            if file_type.is_symlink() {
                summary.symlinks += 1;
                continue;
            }
            if self.is_skipped(path) {
                debug!(path = %path.display(), "skipped");
                summary.skipped += 1;
                continue;
            }
            if file_type.is_dir() {
                queue.push_back(path.to_path_buf());
            } else if file_type.is_file() {
                let (_, errors) = self.add_file(path, catalog);
                summary.files += 1;
                summary.errors += errors;
            }
        }
    }
}
