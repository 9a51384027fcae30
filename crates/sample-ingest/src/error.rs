//! Error types for sample-sheet ingestion.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while reading a sample sheet.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file not found.
    #[error("sample file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds the size limit.
    #[error("file {path} is too large ({size} bytes, limit {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// Reading did not finish within the caller's deadline.
    #[error("reading {path} timed out after {}ms", .timeout.as_millis())]
    Timeout { path: PathBuf, timeout: Duration },

    // === Format Errors ===
    /// File kind cannot be read.
    #[error("unsupported input {path}: {reason}")]
    UnsupportedFormat { path: PathBuf, reason: String },

    /// File encoding is not supported.
    #[error("unsupported encoding {encoding} in {path} (save the file as UTF-8)")]
    UnsupportedEncoding {
        path: PathBuf,
        encoding: &'static str,
    },

    /// Failed to parse delimited text.
    #[error("failed to parse {path}: {source}")]
    Delimited {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Failed to parse SpreadsheetML.
    #[error("failed to parse spreadsheet {path}: {message}")]
    Spreadsheet { path: PathBuf, message: String },

    /// Workbook has no worksheet.
    #[error("spreadsheet {path} contains no worksheet")]
    NoWorksheet { path: PathBuf },

    // === Layout Errors ===
    /// The header row lies beyond the end of the file.
    #[error("{path} has {rows} row(s); expected headers on row {}", .index + 1)]
    MissingHeaderRow {
        path: PathBuf,
        index: usize,
        rows: usize,
    },
}

impl IngestError {
    pub(crate) fn open(path: &std::path::Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: err,
            }
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
