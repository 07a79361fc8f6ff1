//! Bulk key rewrites and store concatenation.

use crate::error::ApiError;
use crate::store::{make_key, split_key, Catalog, Record, RecordView};
use crate::types::{AlterMode, KEY_SEPARATOR};
use tracing::{info, warn};

/// Rewrite one key. `None` when the key has no drive character to replace.
fn rewrite_key(key: &str, mode: AlterMode, value: &str) -> Option<String> {
    match mode {
        AlterMode::DeviceName => Some(make_key(value, split_key(key).1)),
        AlterMode::DriveLetter => {
            let drive = value.chars().next()?;
            let (device, path) = key.split_once(KEY_SEPARATOR)?;
            let mut chars = path.chars();
            chars.next()?;
            let mut out = String::with_capacity(key.len());
            out.push_str(device);
            out.push(KEY_SEPARATOR);
            out.push(drive);
            out.push_str(chars.as_str());
            Some(out)
        }
    }
}

/// Build a new catalog holding every record of `records` under its
/// rewritten key. Keys that collide after rewriting keep the last record.
pub fn alter<R: RecordView>(
    records: impl IntoIterator<Item = R>,
    mode: AlterMode,
    value: &str,
) -> Result<Catalog, ApiError> {
    match mode {
        AlterMode::DriveLetter if value.is_empty() => {
            return Err(ApiError::InvalidArgument(
                "drive letter value must not be empty".to_string(),
            ));
        }
        AlterMode::DeviceName if value.contains(KEY_SEPARATOR) => {
            return Err(ApiError::InvalidArgument(format!(
                "device name {:?} must not contain '{}'",
                value, KEY_SEPARATOR
            )));
        }
        _ => {}
    }

    let mut altered = Catalog::new();
    let mut unchanged = 0usize;
    for record in records {
        let key = match rewrite_key(record.key(), mode, value) {
            Some(key) => key,
            None => {
                warn!(key = %record.key(), "key has no drive character, kept as is");
                unchanged += 1;
                record.key().to_string()
            }
        };
        let record = Record {
            key,
            digest: record.digest().to_string(),
            size: record.size(),
            modified: record.modified().to_string(),
        };
        let (key, entry) = record.into_parts();
        altered.upsert(key, entry);
    }
    info!(mode = %mode, value = %value, records = altered.len(), unchanged, "altered keys");
    Ok(altered)
}

/// Union of several catalogs. For a key present in more than one, the
/// earliest catalog wins.
pub fn concat<I>(sources: I) -> Catalog
where
    I: IntoIterator<Item = Catalog>,
{
    let mut merged = Catalog::new();
    for source in sources {
        for record in source.into_records() {
            let (key, entry) = record.into_parts();
            merged.insert_if_absent(key, entry);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Entry;

    fn catalog(pairs: &[(&str, &str)]) -> Catalog {
        pairs
            .iter()
            .map(|(key, digest)| {
                Record::new(
                    *key,
                    Entry {
                        digest: digest.to_string(),
                        size: 1,
                        modified: String::new(),
                    },
                )
            })
            .collect()
    }

    fn keys(catalog: &Catalog) -> Vec<&str> {
        catalog.iter().map(|r| r.key).collect()
    }

    #[test]
    fn test_device_name_rewrites_every_key() {
        let source = catalog(&[("old:C:\\a", "1"), ("other:/b", "2")]);
        let altered = alter(source.iter(), AlterMode::DeviceName, "new").unwrap();
        assert_eq!(keys(&altered), vec!["new:/b", "new:C:\\a"]);
    }

    #[test]
    fn test_drive_letter_replaces_char_after_separator() {
        let source = catalog(&[("usb:C:\\a", "1"), ("usb:D:\\b", "2")]);
        let altered = alter(source.iter(), AlterMode::DriveLetter, "E").unwrap();
        assert_eq!(keys(&altered), vec!["usb:E:\\a", "usb:E:\\b"]);
    }

    #[test]
    fn test_drive_letter_uses_first_char_only() {
        let source = catalog(&[("usb:C:\\a", "1")]);
        let altered = alter(source.iter(), AlterMode::DriveLetter, "Xyz").unwrap();
        assert_eq!(keys(&altered), vec!["usb:X:\\a"]);
    }

    #[test]
    fn test_drive_letter_keeps_keys_without_path() {
        let source = catalog(&[("usb:", "1"), ("bare", "2")]);
        let altered = alter(source.iter(), AlterMode::DriveLetter, "E").unwrap();
        assert_eq!(keys(&altered), vec!["bare", "usb:"]);
    }

    #[test]
    fn test_rejects_bad_values() {
        let source = catalog(&[("usb:C:\\a", "1")]);
        assert!(matches!(
            alter(source.iter(), AlterMode::DriveLetter, ""),
            Err(ApiError::InvalidArgument(_))
        ));
        assert!(matches!(
            alter(source.iter(), AlterMode::DeviceName, "a:b"),
            Err(ApiError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_collisions_keep_last() {
        let source = catalog(&[("a:/x", "first"), ("b:/x", "second")]);
        let altered = alter(source.iter(), AlterMode::DeviceName, "c").unwrap();
        assert_eq!(altered.len(), 1);
        assert_eq!(altered.get("c:/x").unwrap().digest, "second");
    }

    #[test]
    fn test_concat_first_source_wins() {
        let first = catalog(&[("d:/a", "one"), ("d:/b", "one")]);
        let second = catalog(&[("d:/b", "two"), ("d:/c", "two")]);
        let merged = concat([first, second]);
        assert_eq!(keys(&merged), vec!["d:/a", "d:/b", "d:/c"]);
        assert_eq!(merged.get("d:/b").unwrap().digest, "one");
        assert_eq!(merged.get("d:/c").unwrap().digest, "two");
    }
}
