//! Binary store codec.
//!
//! A store file is a bare sequence of records with no header:
//!
//! ```text
//! u64 key length (little-endian)
//! key bytes (UTF-8 "device:path")
//! 32 bytes digest, all zero when unknown
//! u64 size (little-endian)
//! 19 bytes modified time, all zero when unknown
//! ```
//!
//! A fixed-width field whose first byte is zero decodes to the empty string.
//! End of file is only valid exactly where a length prefix would start.

use super::{Catalog, FlatRecord, RecordView};
use crate::error::StorageError;
use crate::types::{DIGEST_LEN, TIME_LEN};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

/// Stream buffer for reading and writing store files.
pub(crate) const IO_BUFFER: usize = 1024 * 1024;

pub(crate) const LEN_PREFIX: usize = 8;

/// Fixed bytes following the key: digest, size, time.
pub(crate) const FIXED_TAIL: usize = DIGEST_LEN + 8 + TIME_LEN;

/// Upper bound on a key length; anything larger is treated as corruption.
pub(crate) const MAX_KEY_LEN: u64 = 64 * 1024;

const ZEROS: [u8; DIGEST_LEN] = [0; DIGEST_LEN];

fn check_record(record: &impl RecordView) -> Result<(), StorageError> {
    let key = record.key();
    if key.is_empty() {
        return Err(StorageError::InvalidPath("record key is empty".to_string()));
    }
    if key.len() as u64 > MAX_KEY_LEN {
        return Err(StorageError::FieldTooLong {
            key: key.to_string(),
            field: "key",
            len: key.len(),
            max: MAX_KEY_LEN as usize,
        });
    }
    for (field, value, width) in [
        ("digest", record.digest(), DIGEST_LEN),
        ("modified", record.modified(), TIME_LEN),
    ] {
        let fits = value.is_empty() || (value.len() == width && !value.contains('\0'));
        if !fits {
            return Err(StorageError::FieldWidth {
                key: key.to_string(),
                field,
                len: value.len(),
                width,
            });
        }
    }
    Ok(())
}

fn write_fixed<W: Write>(out: &mut W, value: &str, width: usize) -> io::Result<()> {
    out.write_all(value.as_bytes())?;
    out.write_all(&ZEROS[..width - value.len()])
}

/// Encode one record. Call `check_record` first.
fn write_record<W: Write>(out: &mut W, record: &impl RecordView) -> io::Result<()> {
    let key = record.key();
    out.write_all(&(key.len() as u64).to_le_bytes())?;
    out.write_all(key.as_bytes())?;
    write_fixed(out, record.digest(), DIGEST_LEN)?;
    out.write_all(&record.size().to_le_bytes())?;
    write_fixed(out, record.modified(), TIME_LEN)
}

/// Encode records into an in-memory buffer.
pub fn encode<I, R>(records: I) -> Result<Vec<u8>, StorageError>
where
    I: IntoIterator<Item = R>,
    R: RecordView,
{
    let mut out = Vec::new();
    for record in records {
        check_record(&record)?;
        write_record(&mut out, &record).map_err(|e| StorageError::io("<memory>", e))?;
    }
    Ok(out)
}

/// Write the whole store to `path`, replacing any previous file.
///
/// Records stream into a temporary file beside the destination, which is then
/// renamed over it, so a failed write leaves the previous store untouched.
/// Returns the number of records written.
pub fn write_store<I, R>(records: I, path: &Path) -> Result<usize, StorageError>
where
    I: IntoIterator<Item = R>,
    R: RecordView,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;
    let temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| StorageError::io(dir, e))?;

    let mut count = 0usize;
    {
        let mut writer = BufWriter::with_capacity(IO_BUFFER, temp.as_file());
        for record in records {
            check_record(&record)?;
            write_record(&mut writer, &record).map_err(|e| StorageError::io(temp.path(), e))?;
            count += 1;
        }
        writer
            .flush()
            .map_err(|e| StorageError::io(temp.path(), e))?;
    }
    temp.persist(path)
        .map_err(|e| StorageError::io(path, e.error))?;

    debug!(path = %path.display(), records = count, "wrote store");
    Ok(count)
}

/// Decode a fixed-width text field.
pub(crate) fn decode_fixed(bytes: &[u8], offset: u64) -> Result<&str, StorageError> {
    if bytes.first().copied().unwrap_or(0) == 0 {
        return Ok("");
    }
    std::str::from_utf8(bytes).map_err(|e| StorageError::CorruptRecord {
        offset,
        reason: format!("fixed field is not text: {}", e),
    })
}

pub(crate) fn decode_key(bytes: &[u8], offset: u64) -> Result<&str, StorageError> {
    if bytes.is_empty() {
        return Err(StorageError::CorruptRecord {
            offset,
            reason: "empty key".to_string(),
        });
    }
    std::str::from_utf8(bytes).map_err(|e| StorageError::CorruptRecord {
        offset,
        reason: format!("key is not UTF-8: {}", e),
    })
}

pub(crate) fn check_key_len(key_len: u64, offset: u64) -> Result<usize, StorageError> {
    if key_len > MAX_KEY_LEN {
        return Err(StorageError::CorruptRecord {
            offset,
            reason: format!("key length {} exceeds {}", key_len, MAX_KEY_LEN),
        });
    }
    Ok(key_len as usize)
}

/// Split a record body (key followed by the fixed tail) into fields.
pub(crate) fn decode_body(
    body: &[u8],
    key_len: usize,
    offset: u64,
) -> Result<FlatRecord<'_>, StorageError> {
    let (key, tail) = body.split_at(key_len);
    let (digest, rest) = tail.split_at(DIGEST_LEN);
    let (size, modified) = rest.split_at(8);
    let mut size_bytes = [0u8; 8];
    size_bytes.copy_from_slice(size);
    Ok(FlatRecord {
        key: decode_key(key, offset)?,
        digest: decode_fixed(digest, offset)?,
        size: u64::from_le_bytes(size_bytes),
        modified: decode_fixed(modified, offset)?,
    })
}

/// Fill `buf` as far as the reader allows. Returns bytes read; fewer than
/// `buf.len()` only at end of stream.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Load a store file into a mutable catalog.
pub fn read_catalog(path: &Path) -> Result<Catalog, StorageError> {
    let file = File::open(path).map_err(|e| StorageError::io(path, e))?;
    let mut reader = BufReader::with_capacity(IO_BUFFER, file);
    let catalog = decode_stream(&mut reader).map_err(|e| match e {
        StorageError::Io { source, .. } => StorageError::io(path, source),
        other => other,
    })?;
    debug!(path = %path.display(), records = catalog.len(), "loaded store");
    Ok(catalog)
}

/// Decode records from a stream into a catalog.
pub fn decode_stream<R: Read>(reader: &mut R) -> Result<Catalog, StorageError> {
    let mut catalog = Catalog::new();
    let mut offset = 0u64;
    let mut prefix = [0u8; LEN_PREFIX];
    let mut body = Vec::new();
    loop {
        let got = read_full(reader, &mut prefix).map_err(|e| StorageError::io("<stream>", e))?;
        if got == 0 {
            break;
        }
        if got < LEN_PREFIX {
            return Err(StorageError::Truncated {
                offset,
                expected: LEN_PREFIX as u64,
                found: got as u64,
            });
        }
        let key_len = check_key_len(u64::from_le_bytes(prefix), offset)?;
        let body_len = key_len + FIXED_TAIL;
        body.resize(body_len, 0);
        let got = read_full(reader, &mut body).map_err(|e| StorageError::io("<stream>", e))?;
        if got < body_len {
            return Err(StorageError::Truncated {
                offset: offset + LEN_PREFIX as u64,
                expected: body_len as u64,
                found: got as u64,
            });
        }
        let record = decode_body(&body, key_len, offset)?;
        catalog.upsert(
            record.key.to_string(),
            super::Entry {
                digest: record.digest.to_string(),
                size: record.size,
                modified: record.modified.to_string(),
            },
        );
        offset += (LEN_PREFIX + body_len) as u64;
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Entry, Record};
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn record(key: &str, digest: &str, size: u64, modified: &str) -> Record {
        Record {
            key: key.to_string(),
            digest: digest.to_string(),
            size,
            modified: modified.to_string(),
        }
    }

    #[test]
    fn test_layout_is_little_endian_and_zero_padded() {
        let bytes = encode([record("d:/a", "", 0x0102, "")]).unwrap();
        assert_eq!(bytes.len(), LEN_PREFIX + 4 + FIXED_TAIL);
        assert_eq!(&bytes[..8], &[4, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&bytes[8..12], b"d:/a");
        assert!(bytes[12..44].iter().all(|b| *b == 0));
        assert_eq!(&bytes[44..52], &[0x02, 0x01, 0, 0, 0, 0, 0, 0]);
        assert!(bytes[52..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_write_and_read_catalog() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.fmd");
        let records = vec![
            record("d:/a", "d41d8cd98f00b204e9800998ecf8427e", 10, "2024-01-02 03:04:05"),
            record("d:/b", "", 0, ""),
        ];
        let written = write_store(&records, &path).unwrap();
        assert_eq!(written, 2);

        let catalog = read_catalog(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.get("d:/a").unwrap(),
            &Entry {
                digest: "d41d8cd98f00b204e9800998ecf8427e".to_string(),
                size: 10,
                modified: "2024-01-02 03:04:05".to_string(),
            }
        );
        assert_eq!(catalog.get("d:/b").unwrap(), &Entry::unknown());
    }

    #[test]
    fn test_write_replaces_existing_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.fmd");
        write_store(&[record("d:/a", "", 1, ""), record("d:/b", "", 2, "")], &path).unwrap();
        write_store(&[record("d:/c", "", 3, "")], &path).unwrap();
        let catalog = read_catalog(&path).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains_key("d:/c"));
    }

    #[test]
    fn test_empty_file_is_empty_store() {
        let catalog = decode_stream(&mut &b""[..]).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_truncated_body_is_rejected() {
        let bytes = encode([record("d:/a", "", 1, ""), record("d:/b", "", 2, "")]).unwrap();
        let cut = &bytes[..bytes.len() - 5];
        match decode_stream(&mut &cut[..]) {
            Err(StorageError::Truncated { expected, found, .. }) => {
                assert_eq!(expected, (4 + FIXED_TAIL) as u64);
                assert_eq!(found, (4 + FIXED_TAIL - 5) as u64);
            }
            other => panic!("expected truncation, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_prefix_is_rejected() {
        let mut bytes = encode([record("d:/a", "", 1, "")]).unwrap();
        bytes.extend_from_slice(&[3, 0, 0]);
        assert!(matches!(
            decode_stream(&mut &bytes[..]),
            Err(StorageError::Truncated { found: 3, .. })
        ));
    }

    #[test]
    fn test_oversized_key_length_is_corrupt() {
        let bytes = (MAX_KEY_LEN + 1).to_le_bytes();
        assert!(matches!(
            decode_stream(&mut &bytes[..]),
            Err(StorageError::CorruptRecord { offset: 0, .. })
        ));
    }

    #[test]
    fn test_misfit_fields_are_rejected_on_write() {
        let long_digest = "0".repeat(DIGEST_LEN + 1);
        assert!(matches!(
            encode([record("d:/a", &long_digest, 1, "")]),
            Err(StorageError::FieldWidth { field: "digest", .. })
        ));
        assert!(matches!(
            encode([record("d:/a", "abc", 1, "")]),
            Err(StorageError::FieldWidth { field: "digest", len: 3, .. })
        ));
        assert!(matches!(
            encode([record("d:/a", "", 1, "2024")]),
            Err(StorageError::FieldWidth { field: "modified", len: 4, .. })
        ));
        let nul_time = format!("\0{}", "0".repeat(TIME_LEN - 1));
        assert!(matches!(
            encode([record("d:/a", "", 1, &nul_time)]),
            Err(StorageError::FieldWidth { field: "modified", .. })
        ));
        assert!(matches!(
            encode([record("", "", 1, "")]),
            Err(StorageError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_read_missing_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.fmd");
        match read_catalog(&path) {
            Err(StorageError::Io { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected io error, got {:?}", other),
        }
    }

    fn arb_record() -> impl Strategy<Value = Record> {
        (
            "[a-z]{1,6}",
            "[ -~]{1,40}",
            prop_oneof![Just(String::new()), "[0-9a-f]{32}", "[0-9a-f]{1,40}"],
            any::<u64>(),
            prop_oneof![
                Just(String::new()),
                "[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}",
                "[0-9]{1,24}",
            ],
        )
            .prop_map(|(device, path, digest, size, modified)| Record {
                key: crate::store::make_key(&device, &path),
                digest,
                size,
                modified,
            })
    }

    proptest! {
        #[test]
        fn prop_round_trip(records in proptest::collection::vec(arb_record(), 0..20)) {
            let fits = |value: &str, width: usize| value.is_empty() || value.len() == width;
            let valid = records
                .iter()
                .all(|r| fits(&r.digest, DIGEST_LEN) && fits(&r.modified, TIME_LEN));
            match encode(&records) {
                Ok(bytes) => {
                    prop_assert!(valid);
                    let decoded = decode_stream(&mut &bytes[..]).unwrap();
                    let expected: Catalog = records.iter().cloned().collect();
                    prop_assert_eq!(decoded, expected);
                }
                Err(e) => {
                    prop_assert!(!valid);
                    prop_assert!(matches!(e, StorageError::FieldWidth { .. }), "{:?}", e);
                }
            }
        }
    }
}
