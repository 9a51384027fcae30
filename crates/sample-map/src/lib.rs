//! Column mapping tables for the supported sample-metadata formats.
//!
//! Each [`FileFormat`] owns one immutable [`MappingTable`] describing its
//! header layout, canonical fields, verification rules, groups and dates.

pub mod error;
pub mod format;
pub mod formats;
pub mod suggest;
pub mod table;
pub mod utils;
pub mod verify;

pub use error::MapError;
pub use format::FileFormat;
pub use suggest::{SUGGESTION_THRESHOLD, closest_match};
pub use table::{
    ColumnRule, DESCRIPTION_FIELD, FieldKind, GroupRule, HeaderMatch, MappingTable, NAME_FIELD,
};
pub use utils::{normalize_text, split_header_unit};
pub use verify::{Verifier, parse_number};
