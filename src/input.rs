use std::fs;

use camino::Utf8Path;
use csv::ReaderBuilder;

use crate::domain::{BioSampleId, InputFormat};
use crate::error::KiraError;

/// Reads identifiers in input order. `format` overrides detection from the
/// file name.
pub fn read_identifiers(
    path: &Utf8Path,
    format: Option<InputFormat>,
) -> Result<Vec<BioSampleId>, KiraError> {
    let format = format.unwrap_or_else(|| InputFormat::detect(path.as_str()));
    tracing::debug!(path = %path, %format, "reading identifiers");
    let content = fs::read_to_string(path.as_std_path())
        .map_err(|err| KiraError::Filesystem(format!("read {path}: {err}")))?;
    match format.delimiter() {
        Some(delimiter) => parse_tabular(&content, delimiter),
        None => Ok(parse_lines(&content)),
    }
}

pub fn parse_lines(content: &str) -> Vec<BioSampleId> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(BioSampleId::from)
        .collect()
}

/// First column of every data row; the header row is skipped and all other
/// columns are ignored.
pub fn parse_tabular(content: &str, delimiter: u8) -> Result<Vec<BioSampleId>, KiraError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let mut ids = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| KiraError::InputParse(err.to_string()))?;
        ids.push(BioSampleId::from(record.get(0).unwrap_or_default()));
    }
    Ok(ids)
}
