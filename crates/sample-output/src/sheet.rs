//! OTU worksheet layout.

use sample_model::SampleSet;
use serde::{Deserialize, Serialize};

use crate::options::OtuOptions;

pub const SAMPLE_ID_COLUMN: &str = "sample_id";
pub const SAMPLE_NAME_COLUMN: &str = "sample_name";
pub const SEQUENCE_COLUMN: &str = "sequence";
/// Record field copied into the taxonomy column.
pub const TAXONOMY_FIELD: &str = "taxonomy";

/// A rectangular worksheet: one header row, one row per sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtuSheet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl OtuSheet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Column headers in their fixed order: sample columns, OTU placeholders,
/// then the optional taxonomy and sequence columns.
pub fn otu_columns(options: &OtuOptions) -> Vec<String> {
    let mut columns = vec![SAMPLE_ID_COLUMN.to_string(), SAMPLE_NAME_COLUMN.to_string()];
    columns.extend((1..=options.num_otus).map(|i| format!("{}{i}", options.otu_prefix)));
    columns.extend(options.taxonomy_source.column());
    if options.incl_seq {
        columns.push(SEQUENCE_COLUMN.to_string());
    }
    columns
}

/// Builds the OTU sheet for `set`, preserving sample order.
pub fn generate(set: &SampleSet, options: &OtuOptions) -> OtuSheet {
    let columns = otu_columns(options);
    let has_taxonomy = options.taxonomy_source.column().is_some();

    let rows = set
        .samples
        .iter()
        .map(|sample| {
            let mut row = Vec::with_capacity(columns.len());
            row.push(sample.id.to_string());
            row.push(sample.name.clone());
            row.extend(std::iter::repeat_n(String::new(), options.num_otus));
            if has_taxonomy {
                let taxonomy = sample
                    .field(TAXONOMY_FIELD)
                    .filter(|value| !value.is_absent())
                    .map(ToString::to_string)
                    .unwrap_or_default();
                row.push(taxonomy);
            }
            if options.incl_seq {
                row.push(String::new());
            }
            row
        })
        .collect();

    tracing::debug!(
        set = %set.name,
        rows = set.len(),
        columns = columns.len(),
        "generated OTU sheet"
    );
    OtuSheet { columns, rows }
}
