//! ENIGMA field-sample template.
//!
//! Headers sit on the first row. Physical measurements carry their unit
//! either in the header (`Depth (m)`) or in the cell (`12 m`).

use regex::Regex;

use crate::error::MapError;
use crate::format::FileFormat;
use crate::table::{ColumnRule, DESCRIPTION_FIELD, MappingTable, NAME_FIELD};
use crate::verify::Verifier;

pub const MATERIALS: &[&str] = &[
    "Soil",
    "Sediment",
    "Water",
    "Rock",
    "Biofilm",
    "Air",
    "Plant tissue",
    "Animal tissue",
    "Other",
];

pub const DATE_GRAMMAR: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d", "%m/%d/%Y"];

/// A unit starts with a letter, `°` or `%`; digits and signs may only follow.
const UNIT_PATTERN: &str = r"^\s*(?P<value>[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)\s*(?P<unit>[\p{L}°%][\p{L}\p{N}°%/^*·.\- ]*?)?\s*$";
const WELL_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9_.\-]*$";

pub fn table() -> Result<MappingTable, MapError> {
    let unit_regex = Regex::new(UNIT_PATTERN).expect("Invalid ENIGMA unit regex");
    let well_regex = Regex::new(WELL_PATTERN).expect("Invalid ENIGMA well regex");

    MappingTable::builder(FileFormat::Enigma)
        .header_row(0)
        .column(
            ColumnRule::text("Name", NAME_FIELD)
                .required()
                .aliases(&["Sample Name", "Sample ID"]),
        )
        .column(ColumnRule::text("Description", DESCRIPTION_FIELD))
        .column(ColumnRule::text("Collection Date", "collection_date"))
        .column(ColumnRule::number("Latitude", "latitude").verify(Verifier::range(-90.0, 90.0)))
        .column(
            ColumnRule::number("Longitude", "longitude").verify(Verifier::range(-180.0, 180.0)),
        )
        .column(ColumnRule::quantity("Depth", "depth").verify(Verifier::non_negative()))
        .column(ColumnRule::quantity("Elevation", "elevation"))
        .column(ColumnRule::text("Material", "material").verify(Verifier::OneOf(MATERIALS)))
        .column(ColumnRule::text("Sample Type", "sample_type"))
        .column(ColumnRule::text("Environmental Package", "env_package"))
        .column(ColumnRule::text("Well Name", "well_name").verify(Verifier::Pattern(well_regex)))
        .column(ColumnRule::text("Aquifer", "aquifer"))
        .column(ColumnRule::text("Sample Method", "sample_method"))
        .column(ColumnRule::number("pH", "ph").verify(Verifier::range(0.0, 14.0)))
        .column(ColumnRule::quantity("Conductivity", "conductivity").verify(Verifier::non_negative()))
        .column(ColumnRule::quantity("Temperature", "temperature"))
        .column(
            ColumnRule::quantity("Dissolved Oxygen", "dissolved_oxygen")
                .verify(Verifier::non_negative()),
        )
        .column(ColumnRule::text("Taxonomy", "taxonomy"))
        .column(ColumnRule::number("Replicate", "replicate").verify(Verifier::Integer {
            min: Some(1),
            max: None,
        }))
        .group("location", &["latitude", "longitude"])
        .dates(&["collection_date"])
        .date_grammar(DATE_GRAMMAR)
        .unit_regex(unit_regex)
        .build()
}
