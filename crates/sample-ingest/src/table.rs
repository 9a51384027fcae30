//! Raw grid extraction at a fixed header row.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::delimited;
use crate::detect::{InputKind, detect_kind};
use crate::error::{IngestError, Result};
use crate::spreadsheet;

/// One data row below the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based position among the non-blank rows after the header.
    pub number: usize,
    /// Trimmed cells in header order; short rows are padded with empty cells.
    pub cells: Vec<String>,
}

impl RawRow {
    pub fn cell(&self, column: usize) -> &str {
        self.cells.get(column).map_or("", String::as_str)
    }
}

/// Headers and data rows of one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Splits a grid at `header_row_index`, dropping blank data rows.
    pub fn from_grid(
        path: &Path,
        mut grid: Vec<Vec<String>>,
        header_row_index: usize,
    ) -> Result<Self> {
        if grid.len() <= header_row_index {
            return Err(IngestError::MissingHeaderRow {
                path: path.to_path_buf(),
                index: header_row_index,
                rows: grid.len(),
            });
        }
        let data = grid.split_off(header_row_index + 1);
        let headers: Vec<String> = grid
            .pop()
            .unwrap_or_default()
            .iter()
            .map(|header| header.trim().trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let width = headers.len();
        let rows = data
            .into_iter()
            .map(|cells| cells.iter().map(|cell| cell.trim().to_string()).collect::<Vec<_>>())
            .filter(|cells| cells.iter().any(|cell| !cell.is_empty()))
            .enumerate()
            .map(|(idx, mut cells)| {
                if cells.len() < width {
                    cells.resize(width, String::new());
                }
                RawRow {
                    number: idx + 1,
                    cells,
                }
            })
            .collect();

        Ok(Self { headers, rows })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Reads a sample sheet without a deadline.
pub fn read_table_blocking(path: &Path, header_row_index: usize) -> Result<RawTable> {
    let kind = detect_kind(path)?;
    tracing::debug!(path = %path.display(), kind = kind.describe(), "reading sample sheet");
    let grid = match kind {
        InputKind::Delimited(delimiter) => delimited::read_grid(path, delimiter)?,
        InputKind::SpreadsheetMl => spreadsheet::read_grid(path)?,
    };
    RawTable::from_grid(path, grid, header_row_index)
}

/// Reads a sample sheet, failing with [`IngestError::Timeout`] after `timeout`.
///
/// The read runs on a worker thread under the caller's subscriber and span;
/// on timeout the worker is detached and its result discarded.
pub fn read_table(path: &Path, header_row_index: usize, timeout: Duration) -> Result<RawTable> {
    let owned: PathBuf = path.to_path_buf();
    run_with_deadline(path, timeout, move || {
        read_table_blocking(&owned, header_row_index)
    })
}

fn run_with_deadline<T, F>(path: &Path, timeout: Duration, read: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let dispatch = tracing::dispatcher::get_default(Clone::clone);
    let span = tracing::Span::current();
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("sample-ingest".to_string())
        .spawn(move || {
            tracing::dispatcher::with_default(&dispatch, || {
                let _ = tx.send(span.in_scope(read));
            });
        })
        .map_err(|source| IngestError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(path = %path.display(), ?timeout, "sample sheet read timed out");
            Err(IngestError::Timeout {
                path: path.to_path_buf(),
                timeout,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_header_row_index_and_blank_rows() {
        let table = RawTable::from_grid(
            Path::new("s.csv"),
            grid(&[
                &["Object Type:", "Individual Sample"],
                &["\u{feff}Sample Name ", "Material"],
                &["S1", " Rock "],
                &["", "  "],
                &["S2"],
            ]),
            1,
        )
        .unwrap();
        assert_eq!(table.headers, vec!["Sample Name", "Material"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cells, vec!["S1", "Rock"]);
        assert_eq!(table.rows[1].number, 2);
        assert_eq!(table.rows[1].cell(1), "");
    }

    #[test]
    fn test_missing_header_row() {
        let err = RawTable::from_grid(Path::new("s.csv"), grid(&[&["only"]]), 1).unwrap_err();
        assert!(matches!(err, IngestError::MissingHeaderRow { rows: 1, .. }));
    }

    #[test]
    fn test_deadline_expires_before_slow_read() {
        let err = run_with_deadline(Path::new("slow.csv"), Duration::from_millis(20), || {
            thread::sleep(Duration::from_secs(2));
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            IngestError::Timeout { timeout, .. } if timeout == Duration::from_millis(20)
        ));
    }

    #[test]
    fn test_deadline_returns_worker_result() {
        let value = run_with_deadline(Path::new("fast.csv"), Duration::from_secs(5), || Ok(7))
            .unwrap();
        assert_eq!(value, 7);
    }
}
