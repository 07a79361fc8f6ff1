//! Per-file metadata: digest, size, and local modification time.

use crate::digest::digest_reader;
use crate::store::Entry;
use crate::types::TIME_FORMAT;
use chrono::{DateTime, Local};
use std::fs::File;
use std::path::Path;
use std::time::SystemTime;
use tracing::warn;

/// Entry computed for one file plus the number of problems hit while
/// computing it.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub entry: Entry,
    pub errors: usize,
}

/// Render a timestamp as local `YYYY-MM-DD HH:MM:SS`.
pub fn format_local_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format(TIME_FORMAT).to_string()
}

/// Compute the entry for a regular file. Never fails: whatever cannot be
/// determined is left empty (or zero) and logged.
pub fn inspect_file(path: &Path) -> Inspection {
    let mut errors = 0usize;

    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => Some(metadata),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to stat file");
            errors += 1;
            None
        }
    };

    let size = metadata.as_ref().map(|m| m.len()).unwrap_or(0);

    let modified = match metadata.as_ref().map(|m| m.modified()) {
        Some(Ok(time)) => format_local_time(time),
        Some(Err(e)) => {
            warn!(path = %path.display(), error = %e, "modification time unavailable");
            errors += 1;
            String::new()
        }
        None => String::new(),
    };

    let known_empty = metadata.is_some() && size == 0;
    let digest = if known_empty {
        String::new()
    } else {
        match File::open(path) {
            Ok(file) => {
                let result = digest_reader(file);
                match result.error {
                    Some(e) => {
                        warn!(
                            path = %path.display(),
                            error = %e,
                            bytes_read = result.bytes_read,
                            "failed to read file, digest left empty"
                        );
                        errors += 1;
                        String::new()
                    }
                    None if result.bytes_read == 0 => String::new(),
                    None => result.digest.to_hex(),
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to open file");
                errors += 1;
                String::new()
            }
        }
    };

    Inspection {
        entry: Entry {
            digest,
            size,
            modified,
        },
        errors,
    }
}
