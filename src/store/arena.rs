//! Flat read-only snapshot of a store.
//!
//! The whole store file is loaded into one buffer and every `FlatRecord`
//! borrows its strings from it, so a snapshot of millions of records costs one
//! allocation for the bytes plus one vector of views.

use super::codec::{check_key_len, decode_body, FIXED_TAIL, LEN_PREFIX};
use super::RecordView;
use crate::error::StorageError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Record whose strings point into an `Arena`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FlatRecord<'a> {
    pub key: &'a str,
    pub digest: &'a str,
    pub size: u64,
    pub modified: &'a str,
}

impl RecordView for FlatRecord<'_> {
    fn key(&self) -> &str {
        self.key
    }

    fn digest(&self) -> &str {
        self.digest
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn modified(&self) -> &str {
        self.modified
    }
}

/// Owner of the raw store bytes.
#[derive(Debug)]
pub struct Arena {
    bytes: Vec<u8>,
    source: Option<PathBuf>,
}

impl Arena {
    /// Load a store file in one read.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let bytes = std::fs::read(path).map_err(|e| StorageError::io(path, e))?;
        debug!(path = %path.display(), bytes = bytes.len(), "loaded store arena");
        Ok(Arena {
            bytes,
            source: Some(path.to_path_buf()),
        })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Arena {
            bytes,
            source: None,
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Decode every record, in file order.
    pub fn records(&self) -> Result<Vec<FlatRecord<'_>>, StorageError> {
        let mut records = Vec::new();
        let bytes = self.bytes.as_slice();
        let mut offset = 0usize;
        while offset < bytes.len() {
            let remaining = bytes.len() - offset;
            if remaining < LEN_PREFIX {
                return Err(StorageError::Truncated {
                    offset: offset as u64,
                    expected: LEN_PREFIX as u64,
                    found: remaining as u64,
                });
            }
            let mut prefix = [0u8; LEN_PREFIX];
            prefix.copy_from_slice(&bytes[offset..offset + LEN_PREFIX]);
            let key_len = check_key_len(u64::from_le_bytes(prefix), offset as u64)?;
            let body_start = offset + LEN_PREFIX;
            let body_len = key_len + FIXED_TAIL;
            let available = bytes.len() - body_start;
            if available < body_len {
                return Err(StorageError::Truncated {
                    offset: body_start as u64,
                    expected: body_len as u64,
                    found: available as u64,
                });
            }
            let body = &bytes[body_start..body_start + body_len];
            records.push(decode_body(body, key_len, offset as u64)?);
            offset = body_start + body_len;
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::codec::encode;
    use crate::store::{write_store, Record};
    use tempfile::TempDir;

    fn record(key: &str, size: u64) -> Record {
        Record {
            key: key.to_string(),
            digest: String::new(),
            size,
            modified: String::new(),
        }
    }

    #[test]
    fn test_records_preserve_file_order() {
        let records = vec![record("d:/z", 1), record("d:/a", 2), record("d:/m", 3)];
        let arena = Arena::from_bytes(encode(&records).unwrap());
        let flat = arena.records().unwrap();
        let keys: Vec<&str> = flat.iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["d:/z", "d:/a", "d:/m"]);
        assert_eq!(flat[1].size, 2);
        assert_eq!(flat[1].digest, "");
    }

    #[test]
    fn test_open_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.fmd");
        write_store(&[record("dev:/x", 42)], &path).unwrap();
        let arena = Arena::open(&path).unwrap();
        assert_eq!(arena.source(), Some(path.as_path()));
        let flat = arena.records().unwrap();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].device(), "dev");
        assert_eq!(flat[0].path(), "/x");
    }

    #[test]
    fn test_truncation_after_prefix_is_rejected() {
        let bytes = encode(&[record("d:/a", 1)]).unwrap();
        for cut in [1, LEN_PREFIX, LEN_PREFIX + 2, bytes.len() - 1] {
            let arena = Arena::from_bytes(bytes[..cut].to_vec());
            assert!(
                matches!(arena.records(), Err(StorageError::Truncated { .. })),
                "cut at {} should be truncated",
                cut
            );
        }
    }

    #[test]
    fn test_empty_arena_has_no_records() {
        assert!(Arena::from_bytes(Vec::new()).records().unwrap().is_empty());
    }
}
