//! CSV and JSON export of store records.

use crate::error::ApiError;
use crate::store::RecordView;
use crate::types::ExportFormat;
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Exported shape of one record. `path` uses `/` separators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow<'a> {
    pub device: &'a str,
    pub path: String,
    pub digest: &'a str,
    pub size: u64,
    pub modified: &'a str,
}

impl<'a> ExportRow<'a> {
    pub fn from_record<R: RecordView + ?Sized>(record: &'a R) -> Self {
        ExportRow {
            device: record.device(),
            path: record.path().replace('\\', "/"),
            digest: record.digest(),
            size: record.size(),
            modified: record.modified(),
        }
    }
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// One CSV line (with trailing newline): path, device, digest, size, modified.
pub fn csv_row<R: RecordView + ?Sized>(record: &R) -> String {
    let row = ExportRow::from_record(record);
    format!(
        "{},{},{},{},{}\n",
        quote(&row.path),
        quote(row.device),
        quote(row.digest),
        quote(&row.size.to_string()),
        quote(row.modified)
    )
}

pub fn write_csv<W, R>(out: &mut W, records: &[R]) -> std::io::Result<()>
where
    W: Write,
    R: RecordView,
{
    for record in records {
        out.write_all(csv_row(record).as_bytes())?;
    }
    Ok(())
}

pub fn write_json<W, R>(out: &mut W, records: &[R]) -> Result<(), ApiError>
where
    W: Write,
    R: RecordView,
{
    let rows: Vec<ExportRow<'_>> = records.iter().map(ExportRow::from_record).collect();
    serde_json::to_writer_pretty(&mut *out, &rows)
        .map_err(|e| ApiError::Io(std::io::Error::other(e)))?;
    out.write_all(b"\n")?;
    Ok(())
}

/// Write every record to `path` in `format`. Returns the number of rows.
pub fn export_to_path<R: RecordView>(
    records: &[R],
    format: ExportFormat,
    path: &Path,
) -> Result<usize, ApiError> {
    let file = std::fs::File::create(path)?;
    let mut out = BufWriter::new(file);
    match format {
        ExportFormat::Csv => write_csv(&mut out, records)?,
        ExportFormat::Json => write_json(&mut out, records)?,
    }
    out.flush()?;
    info!(path = %path.display(), format = %format, rows = records.len(), "exported store");
    Ok(records.len())
}
