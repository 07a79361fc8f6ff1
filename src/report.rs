//! Format query results, build summaries, and store statistics as text.

use crate::catalog::BuildSummary;
use crate::store::RecordView;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::collections::BTreeMap;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Records as a table with Device, Path, Digest, Size, Modified columns.
pub fn format_records_table<R: RecordView>(records: &[R]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Device", "Path", "Digest", "Size", "Modified"]);
    for record in records {
        table.add_row(vec![
            record.device().to_string(),
            record.path().to_string(),
            or_dash(record.digest()),
            record.size().to_string(),
            or_dash(record.modified()),
        ]);
    }
    table.to_string()
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

/// Query output: store total, heading, match count, and the result table.
pub fn format_query_text<R: RecordView>(title: &str, store_total: usize, matches: &[R]) -> String {
    let mut out = String::new();
    out.push_str(&format!("Store records: {}\n\n", store_total));
    out.push_str(&format!("{}\n\n", format_section_heading(title)));
    out.push_str(&format!("Matches: {}\n", matches.len()));
    if !matches.is_empty() {
        out.push('\n');
        out.push_str(&format_records_table(matches));
        out.push('\n');
    }
    out
}

/// Per-device record counts.
pub fn format_device_counts(counts: &BTreeMap<String, usize>) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Devices")));
    if counts.is_empty() {
        out.push_str("No records.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Device", "Records"]);
    for (device, count) in counts {
        table.add_row(vec![device.clone(), count.to_string()]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

pub fn format_build_summary(device: &str, summary: &BuildSummary, store_total: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Build")));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Device", "Files", "Directories", "Skipped", "Errors"]);
    table.add_row(vec![
        device.to_string(),
        summary.files.to_string(),
        summary.directories.to_string(),
        summary.skipped.to_string(),
        summary.errors.to_string(),
    ]);
    out.push_str(&format!("{}\n\n", table));
    out.push_str(&format!("Total: {} records in store.\n", store_total));
    out
}
