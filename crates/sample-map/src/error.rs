//! Error types for mapping tables.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("unsupported file format '{0}' (only SESAR and ENIGMA are supported)")]
    UnknownFormat(String),

    #[error("{format} mapping: group '{group}' references unknown field '{field}'")]
    UnknownGroupMember {
        format: String,
        group: String,
        field: String,
    },

    #[error("{format} mapping: date column '{field}' is not mapped")]
    UnknownDateColumn { format: String, field: String },

    #[error("{format} mapping: header '{header}' is mapped more than once")]
    DuplicateHeader { format: String, header: String },

    #[error("{format} mapping: no column maps to the sample name")]
    MissingNameColumn { format: String },
}
