//! Sample-sheet ingestion.
//!
//! Reads comma/tab separated text and SpreadsheetML 2003 workbooks into a
//! [`RawTable`] of trimmed string cells, split at a caller-chosen header
//! row. Binary workbooks (BIFF `.xls`, `.xlsx`) are rejected up front.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use sample_ingest::read_table;
//!
//! let table = read_table(Path::new("samples.csv"), 0, Duration::from_secs(30))?;
//! for row in &table.rows {
//!     println!("{}: {}", row.number, row.cell(0));
//! }
//! ```

mod delimited;
mod detect;
mod error;
mod spreadsheet;
mod table;

// === Error Types ===
pub use error::{IngestError, Result};

// === Detection ===
pub use detect::{InputKind, MAX_FILE_SIZE, detect_kind};

// === Reading ===
pub use table::{RawRow, RawTable, read_table, read_table_blocking};
