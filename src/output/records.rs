//! CSV record file

use crate::crawler::ArticleRecord;
use crate::output::OutputResult;
use std::fs;
use std::path::Path;

/// Column order of the record file
pub const RECORD_COLUMNS: [&str; 5] = ["Date", "Title", "Article", "URL", "Category"];

/// Writes all records of a run to `path`, replacing any previous file
///
/// The parent directory is created if needed. The header row is written
/// even when there are no records.
pub fn write_records(path: &Path, records: &[ArticleRecord]) -> OutputResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    writer.write_record(RECORD_COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    tracing::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}
