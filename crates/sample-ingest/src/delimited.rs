//! Delimited text (CSV / TSV) reading.

use std::fs::File;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{IngestError, Result};

/// Reads every record of a delimited file as raw strings.
///
/// Records may have differing lengths; blank lines are skipped by the
/// reader.
pub fn read_grid(path: &Path, delimiter: u8) -> Result<Vec<Vec<String>>> {
    let file = File::open(path).map_err(|e| IngestError::open(path, e))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(file);

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::Delimited {
            path: path.to_path_buf(),
            source,
        })?;
        grid.push(record.iter().map(str::to_string).collect());
    }
    tracing::debug!(path = %path.display(), rows = grid.len(), "read delimited file");
    Ok(grid)
}
