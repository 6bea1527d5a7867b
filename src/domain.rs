use std::fmt;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::KiraError;

/// Organism value written for a lookup that failed.
pub const ERROR_ORGANISM: &str = "Error";

/// Collection date written when the record carries no `collection_date` attribute.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BioSampleId(String);

impl BioSampleId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BioSampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BioSampleId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BioSampleId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One CSV row. Field order is the column order of the export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataRecord {
    #[serde(rename = "BioSample_ID")]
    pub biosample_id: String,
    #[serde(rename = "Organism")]
    pub organism: String,
    #[serde(rename = "Collection_Date")]
    pub collection_date: String,
}

impl MetadataRecord {
    /// Sentinel row for a failed lookup: the input id is echoed back and the
    /// error text takes the place of the collection date.
    pub fn failed(id: &BioSampleId, error: &str) -> Self {
        Self {
            biosample_id: id.as_str().to_string(),
            organism: ERROR_ORGANISM.to_string(),
            collection_date: error.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.organism == ERROR_ORGANISM
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched(MetadataRecord),
    Failed { id: BioSampleId, error: String },
}

impl FetchOutcome {
    pub fn from_result(id: &BioSampleId, result: Result<MetadataRecord, KiraError>) -> Self {
        match result {
            Ok(record) => FetchOutcome::Fetched(record),
            Err(err) => FetchOutcome::Failed {
                id: id.clone(),
                error: err.to_string(),
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed { .. })
    }

    pub fn into_record(self) -> MetadataRecord {
        match self {
            FetchOutcome::Fetched(record) => record,
            FetchOutcome::Failed { id, error } => MetadataRecord::failed(&id, &error),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    Text,
    Csv,
    Tsv,
}

impl InputFormat {
    /// Picks the format from the file name; anything that is not `.csv` or
    /// `.tsv` is read as one identifier per line.
    pub fn detect(file_name: &str) -> Self {
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with(".csv") {
            InputFormat::Csv
        } else if lower.ends_with(".tsv") {
            InputFormat::Tsv
        } else {
            InputFormat::Text
        }
    }

    pub fn delimiter(self) -> Option<u8> {
        match self {
            InputFormat::Text => None,
            InputFormat::Csv => Some(b','),
            InputFormat::Tsv => Some(b'\t'),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Text => write!(f, "text"),
            InputFormat::Csv => write!(f, "csv"),
            InputFormat::Tsv => write!(f, "tsv"),
        }
    }
}
