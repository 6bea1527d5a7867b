use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum KiraError {
    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid contact email: {0}")]
    InvalidEmail(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("failed to parse identifier list: {0}")]
    InputParse(String),

    #[error("NCBI request failed: {0}")]
    NcbiHttp(String),

    #[error("NCBI returned status {status}: {message}")]
    NcbiStatus { status: u16, message: String },

    #[error("NCBI reported an error: {0}")]
    NcbiService(String),

    #[error("malformed BioSample record: {0}")]
    RecordParse(String),

    #[error("failed to write CSV export: {0}")]
    Export(String),
}
