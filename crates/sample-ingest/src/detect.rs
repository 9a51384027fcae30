//! Input kind detection from extension and leading bytes.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{IngestError, Result};

/// Maximum input size (100 MB).
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

const BIFF_MAGIC: [u8; 4] = [0xD0, 0xCF, 0x11, 0xE0];
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// How the file's rows are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Delimited text with the given separator byte.
    Delimited(u8),
    /// Excel 2003 XML workbook.
    SpreadsheetMl,
}

impl InputKind {
    pub fn describe(&self) -> &'static str {
        match self {
            InputKind::Delimited(b'\t') => "tab-separated text",
            InputKind::Delimited(_) => "comma-separated text",
            InputKind::SpreadsheetMl => "SpreadsheetML workbook",
        }
    }
}

/// Decides how to read `path`, rejecting kinds that cannot be parsed.
pub fn detect_kind(path: &Path) -> Result<InputKind> {
    let metadata = std::fs::metadata(path).map_err(|e| IngestError::open(path, e))?;
    if metadata.len() > MAX_FILE_SIZE {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size: MAX_FILE_SIZE,
        });
    }

    let head = read_head(path)?;
    if head.starts_with(&BIFF_MAGIC) {
        return Err(unsupported(
            path,
            "legacy binary Excel (BIFF) workbooks are not supported; save as XML Spreadsheet 2003 or CSV",
        ));
    }
    if head.starts_with(&ZIP_MAGIC) {
        return Err(unsupported(
            path,
            "Office Open XML (.xlsx) workbooks are not supported; save as XML Spreadsheet 2003 or CSV",
        ));
    }
    if head.starts_with(&[0xFF, 0xFE]) {
        return Err(IngestError::UnsupportedEncoding {
            path: path.to_path_buf(),
            encoding: "UTF-16 LE",
        });
    }
    if head.starts_with(&[0xFE, 0xFF]) {
        return Err(IngestError::UnsupportedEncoding {
            path: path.to_path_buf(),
            encoding: "UTF-16 BE",
        });
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "csv" => Ok(InputKind::Delimited(b',')),
        "tsv" | "txt" => Ok(InputKind::Delimited(b'\t')),
        "xls" | "xml" => Ok(InputKind::SpreadsheetMl),
        "xlsx" | "xlsm" => Err(unsupported(path, "Office Open XML workbooks are not supported")),
        "" => Err(unsupported(path, "file has no extension")),
        other => Err(unsupported(path, &format!("unknown extension '.{other}'"))),
    }
}

fn read_head(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path).map_err(|e| IngestError::open(path, e))?;
    let mut buffer = [0u8; 8];
    let bytes_read = file.read(&mut buffer).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(buffer[..bytes_read].to_vec())
}

fn unsupported(path: &Path, reason: &str) -> IngestError {
    IngestError::UnsupportedFormat {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
