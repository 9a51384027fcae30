//! Error types for worksheet output.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    /// Requested output format is not one of `csv` / `xls`.
    #[error("unsupported output format '{0}' (expected csv or xls)")]
    UnsupportedFormat(String),

    #[error("unknown taxonomy source '{0}' (expected n/a, NCBI, SILVA, GTDB or RDP)")]
    UnknownTaxonomySource(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to encode spreadsheet: {0}")]
    Xml(String),
}

impl OutputError {
    pub(crate) fn xml(err: impl std::fmt::Display) -> Self {
        OutputError::Xml(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OutputError>;
