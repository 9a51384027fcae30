//! OTU worksheet generation.
//!
//! [`generate`] lays out one row per sample of a [`sample_model::SampleSet`]
//! with blank OTU placeholder columns for lab results; the writers render
//! it as CSV or as a SpreadsheetML `.xls` workbook.

pub mod error;
pub mod options;
pub mod sheet;
pub mod writer;

pub use error::{OutputError, Result};
pub use options::{DEFAULT_NUM_OTUS, DEFAULT_OTU_PREFIX, OtuOptions, OutputFormat, TaxonomySource};
pub use sheet::{OtuSheet, generate, otu_columns};
pub use writer::{otu_file_name, render_csv, render_xls, write_sheet, write_sheet_named};
