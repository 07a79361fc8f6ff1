use md5db::store::{read_catalog, write_store, Arena, Catalog, Entry, Record, RecordView};
use proptest::prelude::*;
use tempfile::TempDir;

fn record(key: &str, digest: &str, size: u64, modified: &str) -> Record {
    Record::new(
        key,
        Entry {
            digest: digest.to_string(),
            size,
            modified: modified.to_string(),
        },
    )
}

#[test]
fn catalog_and_flat_views_agree() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.fmd");
    let catalog: Catalog = vec![
        record("usb:C:\\photos\\a.jpg", "900150983cd24fb0d6963f7d28e17f72", 3, "2024-01-01 00:00:00"),
        record("usb:C:\\empty", "", 0, ""),
        record("disk:/home/u/notes.md", "f96b697d7cb7938d525a2f31aaf161d0", 14, "2023-06-30 12:00:01"),
    ]
    .into_iter()
    .collect();

    assert_eq!(write_store(catalog.iter(), &path).unwrap(), 3);

    let reloaded = read_catalog(&path).unwrap();
    assert_eq!(reloaded, catalog);

    let arena = Arena::open(&path).unwrap();
    let flat = arena.records().unwrap();
    let keys: Vec<&str> = flat.iter().map(|r| r.key()).collect();
    let expected: Vec<&str> = catalog.iter().map(|r| r.key).collect();
    assert_eq!(keys, expected);
    let empty = flat.iter().find(|r| r.path() == "C:\\empty").unwrap();
    assert_eq!(empty.digest(), "");
    assert_eq!(empty.modified(), "");
    assert_eq!(empty.device(), "usb");
}

#[test]
fn failed_write_keeps_previous_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.fmd");
    write_store([record("d:/ok", "", 1, "")], &path).unwrap();
    let before = std::fs::read(&path).unwrap();

    let too_long = record("d:/bad", &"a".repeat(33), 1, "");
    assert!(write_store([record("d:/ok2", "", 2, ""), too_long], &path).is_err());
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

fn arb_record() -> impl Strategy<Value = Record> {
    (
        "[a-z]{1,6}",
        "[ -~]{1,40}",
        prop_oneof![Just(String::new()), "[0-9a-f]{32}"],
        any::<u64>(),
        prop_oneof![Just(String::new()), Just("2024-02-29 23:59:59".to_string())],
    )
        .prop_map(|(device, path, digest, size, modified)| {
            record(&format!("{}:{}", device, path), &digest, size, &modified)
        })
}

proptest! {
    #[test]
    fn write_then_read_preserves_catalog(records in proptest::collection::vec(arb_record(), 0..40)) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.fmd");
        let catalog: Catalog = records.into_iter().collect();
        write_store(catalog.iter(), &path).unwrap();
        prop_assert_eq!(read_catalog(&path).unwrap(), catalog);
    }
}
