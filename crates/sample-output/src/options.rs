use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OutputError;

/// Default number of OTU placeholder columns.
pub const DEFAULT_NUM_OTUS: usize = 10;
/// Default OTU column prefix.
pub const DEFAULT_OTU_PREFIX: &str = "OTU";

/// Taxonomy database whose assignments get a column of their own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxonomySource {
    #[default]
    #[serde(rename = "n/a")]
    None,
    #[serde(rename = "NCBI")]
    Ncbi,
    #[serde(rename = "SILVA")]
    Silva,
    #[serde(rename = "GTDB")]
    Gtdb,
    #[serde(rename = "RDP")]
    Rdp,
}

impl TaxonomySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxonomySource::None => "n/a",
            TaxonomySource::Ncbi => "NCBI",
            TaxonomySource::Silva => "SILVA",
            TaxonomySource::Gtdb => "GTDB",
            TaxonomySource::Rdp => "RDP",
        }
    }

    /// Header of the taxonomy column, if a source is selected.
    pub fn column(&self) -> Option<String> {
        match self {
            TaxonomySource::None => None,
            source => Some(format!("taxonomy_{}", source.as_str())),
        }
    }
}

impl fmt::Display for TaxonomySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaxonomySource {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "N/A" | "NA" | "NONE" => Ok(TaxonomySource::None),
            "NCBI" => Ok(TaxonomySource::Ncbi),
            "SILVA" => Ok(TaxonomySource::Silva),
            "GTDB" => Ok(TaxonomySource::Gtdb),
            "RDP" => Ok(TaxonomySource::Rdp),
            _ => Err(OutputError::UnknownTaxonomySource(s.to_string())),
        }
    }
}

/// Layout options for [`crate::generate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtuOptions {
    pub num_otus: usize,
    pub taxonomy_source: TaxonomySource,
    pub incl_seq: bool,
    pub otu_prefix: String,
}

impl Default for OtuOptions {
    fn default() -> Self {
        Self {
            num_otus: DEFAULT_NUM_OTUS,
            taxonomy_source: TaxonomySource::None,
            incl_seq: false,
            otu_prefix: DEFAULT_OTU_PREFIX.to_string(),
        }
    }
}

/// Serialization of a sheet on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    /// SpreadsheetML 2003, opened by Excel as a legacy `.xls`.
    Xls,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Xls => "xls",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "xls" => Ok(OutputFormat::Xls),
            _ => Err(OutputError::UnsupportedFormat(s.to_string())),
        }
    }
}
