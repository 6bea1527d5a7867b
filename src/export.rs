use std::fs;
use std::io::Write;

use camino::Utf8Path;
use csv::WriterBuilder;

use crate::domain::MetadataRecord;
use crate::error::KiraError;

/// Column headers in export order.
pub const CSV_HEADERS: [&str; 3] = ["BioSample_ID", "Organism", "Collection_Date"];

/// Writes the header and one row per record. Header is written even for an
/// empty batch.
pub fn write_csv<W: Write>(writer: W, records: &[MetadataRecord]) -> Result<(), KiraError> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    writer
        .write_record(CSV_HEADERS)
        .map_err(|err| KiraError::Export(err.to_string()))?;
    for record in records {
        writer
            .serialize(record)
            .map_err(|err| KiraError::Export(err.to_string()))?;
    }
    writer
        .flush()
        .map_err(|err| KiraError::Export(err.to_string()))
}

/// Replaces `path` with the export. Rows go to a temp file beside the
/// destination which is then persisted over it.
pub fn write_records(path: &Utf8Path, records: &[MetadataRecord]) -> Result<(), KiraError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| KiraError::Filesystem(format!("create {parent}: {err}")))?;

    let mut temp = tempfile::Builder::new()
        .prefix("kira-bsf-export")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| KiraError::Filesystem(err.to_string()))?;
    write_csv(&mut temp, records)?;

    temp.persist(path.as_std_path())
        .map_err(|err| KiraError::Filesystem(format!("persist {path}: {err}")))?;
    tracing::debug!(path = %path, rows = records.len(), "export written");
    Ok(())
}
