//! Record Store
//!
//! A catalog has two in-memory shapes. `Catalog` is the mutable map used while
//! building, adding, altering, or concatenating. `Arena` plus its
//! `FlatRecord` views is the read-only snapshot queries run over. Both expose
//! their fields through `RecordView`.

pub mod arena;
pub mod codec;

pub use arena::{Arena, FlatRecord};
pub use codec::{read_catalog, write_store};

use crate::types::KEY_SEPARATOR;
use serde::Serialize;
use std::collections::BTreeMap;

/// Split a `device:path` key at its first separator.
///
/// A key without a separator has an empty device.
pub fn split_key(key: &str) -> (&str, &str) {
    key.split_once(KEY_SEPARATOR).unwrap_or(("", key))
}

/// Build a `device:path` key.
pub fn make_key(device: &str, path: &str) -> String {
    let mut key = String::with_capacity(device.len() + 1 + path.len());
    key.push_str(device);
    key.push(KEY_SEPARATOR);
    key.push_str(path);
    key
}

/// Read-only field access shared by every record shape.
///
/// Empty `digest` or `modified` means the value is unknown.
pub trait RecordView {
    fn key(&self) -> &str;
    fn digest(&self) -> &str;
    fn size(&self) -> u64;
    fn modified(&self) -> &str;

    fn device(&self) -> &str {
        split_key(self.key()).0
    }

    fn path(&self) -> &str {
        split_key(self.key()).1
    }
}

impl<T: RecordView + ?Sized> RecordView for &T {
    fn key(&self) -> &str {
        (**self).key()
    }

    fn digest(&self) -> &str {
        (**self).digest()
    }

    fn size(&self) -> u64 {
        (**self).size()
    }

    fn modified(&self) -> &str {
        (**self).modified()
    }
}

/// Value stored under a key in a `Catalog`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub digest: String,
    pub size: u64,
    pub modified: String,
}

impl Entry {
    /// Entry for a file whose metadata could not be read.
    pub fn unknown() -> Self {
        Entry::default()
    }
}

/// Owned record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    pub key: String,
    pub digest: String,
    pub size: u64,
    pub modified: String,
}

impl Record {
    pub fn new(key: impl Into<String>, entry: Entry) -> Self {
        Record {
            key: key.into(),
            digest: entry.digest,
            size: entry.size,
            modified: entry.modified,
        }
    }

    pub fn into_parts(self) -> (String, Entry) {
        (
            self.key,
            Entry {
                digest: self.digest,
                size: self.size,
                modified: self.modified,
            },
        )
    }
}

impl RecordView for Record {
    fn key(&self) -> &str {
        &self.key
    }

    fn digest(&self) -> &str {
        &self.digest
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn modified(&self) -> &str {
        &self.modified
    }
}

impl From<FlatRecord<'_>> for Record {
    fn from(flat: FlatRecord<'_>) -> Self {
        Record {
            key: flat.key.to_string(),
            digest: flat.digest.to_string(),
            size: flat.size,
            modified: flat.modified.to_string(),
        }
    }
}

/// Borrowed view of one `Catalog` entry.
#[derive(Debug, Clone, Copy)]
pub struct EntryRef<'a> {
    pub key: &'a str,
    pub entry: &'a Entry,
}

impl RecordView for EntryRef<'_> {
    fn key(&self) -> &str {
        self.key
    }

    fn digest(&self) -> &str {
        &self.entry.digest
    }

    fn size(&self) -> u64 {
        self.entry.size
    }

    fn modified(&self) -> &str {
        &self.entry.modified
    }
}

/// Mutable keyed store. Keys are unique; inserting an existing key replaces
/// its entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    records: BTreeMap<String, Entry>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog {
            records: BTreeMap::new(),
        }
    }

    /// Insert or overwrite. Returns the replaced entry, if any.
    pub fn upsert(&mut self, key: String, entry: Entry) -> Option<Entry> {
        self.records.insert(key, entry)
    }

    /// Insert only when the key is not present yet. Returns whether it was
    /// inserted.
    pub fn insert_if_absent(&mut self, key: String, entry: Entry) -> bool {
        match self.records.entry(key) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.records.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in key order.
    pub fn iter(&self) -> impl Iterator<Item = EntryRef<'_>> + '_ {
        self.records
            .iter()
            .map(|(key, entry)| EntryRef { key, entry })
    }

    pub fn into_records(self) -> impl Iterator<Item = Record> {
        self.records
            .into_iter()
            .map(|(key, entry)| Record::new(key, entry))
    }
}

impl FromIterator<Record> for Catalog {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        catalog.extend(iter);
        catalog
    }
}

impl Extend<Record> for Catalog {
    fn extend<I: IntoIterator<Item = Record>>(&mut self, iter: I) {
        for record in iter {
            let (key, entry) = record.into_parts();
            self.upsert(key, entry);
        }
    }
}
