use md5db::config::CatalogConfig;
use md5db::store::{read_catalog, RecordView};
use md5db::tooling::cli::{CliContext, Commands};
use md5db::types::{AlterMode, ExportFormat, Field, MatchMethod};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn context(store: &Path) -> CliContext {
    CliContext::from_config(CatalogConfig::default(), Some(store.to_path_buf())).unwrap()
}

fn fixture(root: &Path) {
    fs::create_dir_all(root.join("nested")).unwrap();
    fs::write(root.join("empty.bin"), b"").unwrap();
    fs::write(root.join("abc.txt"), b"abc").unwrap();
    fs::write(root.join("nested").join("digest.txt"), b"message digest").unwrap();
}

fn build(ctx: &CliContext, device: &str, root: &Path) {
    ctx.execute(&Commands::Build {
        device: device.to_string(),
        root: root.to_path_buf(),
        skips: vec![],
    })
    .unwrap();
}

#[test]
fn build_records_reference_digests() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("data");
    fixture(&root);
    let store = temp.path().join("store.fmd");
    build(&context(&store), "usb", &root);

    let catalog = read_catalog(&store).unwrap();
    assert_eq!(catalog.len(), 3);
    for record in catalog.iter() {
        assert_eq!(record.device(), "usb");
        if record.path().ends_with("empty.bin") {
            assert_eq!(record.digest(), "");
            assert_eq!(record.size(), 0);
        } else if record.path().ends_with("abc.txt") {
            assert_eq!(record.digest(), "900150983cd24fb0d6963f7d28e17f72");
            assert_eq!(record.size(), 3);
        } else {
            assert_eq!(record.digest(), "f96b697d7cb7938d525a2f31aaf161d0");
        }
        assert_eq!(record.modified().len(), 19);
    }
}

#[test]
fn csv_export_splits_device_and_normalizes_separators() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("data");
    fixture(&root);
    let store = temp.path().join("store.fmd");
    let ctx = context(&store);
    build(&ctx, "usb", &root);

    let out = temp.path().join("out.csv");
    ctx.execute(&Commands::Export {
        output: out.clone(),
        format: ExportFormat::Csv,
    })
    .unwrap();

    let text = fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().count(), 3);
    for line in text.lines() {
        let fields: Vec<&str> = line.split("\",\"").collect();
        assert_eq!(fields.len(), 5, "line {}", line);
        assert!(!fields[0].contains('\\'));
        assert_eq!(fields[1], "usb");
    }
    assert!(text.contains("\"900150983cd24fb0d6963f7d28e17f72\",\"3\""));
}

#[test]
fn add_overwrites_and_keeps_existing_records() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("data");
    fixture(&root);
    let store = temp.path().join("store.fmd");
    let ctx = context(&store);
    build(&ctx, "usb", &root);

    fs::write(root.join("abc.txt"), b"a").unwrap();
    ctx.execute(&Commands::Add {
        device: "usb".to_string(),
        files: vec![root.join("abc.txt")],
    })
    .unwrap();

    let catalog = read_catalog(&store).unwrap();
    assert_eq!(catalog.len(), 3);
    let abc = catalog
        .iter()
        .find(|r| r.path().ends_with("abc.txt"))
        .unwrap();
    assert_eq!(abc.digest(), "0cc175b9c0f1b6a831c399e269772661");
}

#[test]
fn query_sorts_descending_and_limits() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("data");
    fixture(&root);
    let store = temp.path().join("store.fmd");
    let ctx = context(&store);
    build(&ctx, "usb", &root);

    let out = ctx
        .execute(&Commands::Query {
            method: MatchMethod::Gt,
            field: Field::Size,
            keyword: "0".to_string(),
            sort: Some(Field::Size),
            limit: Some(1),
            desc: true,
            negate: false,
        })
        .unwrap();
    assert!(out.contains("Store records: 3"));
    assert!(out.contains("Matches: 1"));
    assert!(out.contains("f96b697d7cb7938d525a2f31aaf161d0"));
    assert!(!out.contains("900150983cd24fb0d6963f7d28e17f72"));
}

#[test]
fn alter_concat_and_conflicts() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("data");
    fixture(&root);

    let first = temp.path().join("first.fmd");
    let second = temp.path().join("second.fmd");
    build(&context(&first), "usb", &root);
    build(&context(&second), "usb", &root);
    context(&second)
        .execute(&Commands::Alter {
            mode: AlterMode::DeviceName,
            value: "backup".to_string(),
        })
        .unwrap();
    assert!(read_catalog(&second)
        .unwrap()
        .iter()
        .all(|r| r.device() == "backup"));

    let merged = temp.path().join("merged.fmd");
    context(&merged)
        .execute(&Commands::Concat {
            dest: merged.clone(),
            sources: vec![first.clone(), second.clone()],
        })
        .unwrap();
    assert_eq!(read_catalog(&merged).unwrap().len(), 6);

    let report = context(&merged).execute(&Commands::Conflicts).unwrap();
    assert!(report.starts_with("No digest conflicts in 6 records."));
}
