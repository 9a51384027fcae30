//! Mapping, verification and normalization of raw sample sheets.
//!
//! [`import_samples`] reads a file with `sample-ingest`, binds its headers
//! to a [`sample_map::MappingTable`], verifies every mapped cell, collapses
//! groups, normalizes dates and quantities, and returns the resulting
//! [`sample_model::SampleSet`] together with the issues of dropped rows.

pub mod datetime;
pub mod error;
pub mod importer;
pub mod units;

pub use datetime::{ISO_DATETIME, normalize_date, parse_date};
pub use error::{FormatError, ImportError, MissingColumn, Result};
pub use importer::{
    ImportOutcome, ImportParams, UnmappedColumn, ValidationPolicy, import_samples, import_table,
};
pub use units::{Quantity, parse_quantity};
