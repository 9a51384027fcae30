//! SESAR batch-registration template.
//!
//! Row 0 carries the object type and user code; headers are on row 1.

use regex::Regex;

use crate::error::MapError;
use crate::format::FileFormat;
use crate::table::{ColumnRule, DESCRIPTION_FIELD, MappingTable, NAME_FIELD};
use crate::verify::Verifier;

pub const SAMPLE_TYPES: &[&str] = &[
    "Bead",
    "Chemical Fraction",
    "Core",
    "Core Half Round",
    "Core Piece",
    "Core Quarter Round",
    "Core Section",
    "Core Section Half",
    "Core Sub-Piece",
    "Core Whole Round",
    "CTD",
    "Cuttings",
    "Dredge",
    "Grab",
    "Hole",
    "Individual Sample",
    "Oriented Core",
    "Other",
    "Site",
    "Specimen",
    "Terrestrial Section",
    "Trawl",
];

pub const MATERIALS: &[&str] = &[
    "Biology",
    "Gas",
    "Ice",
    "Liquid>aqueous",
    "Liquid>organic",
    "Mineral",
    "NotApplicable",
    "Organic Material",
    "Other",
    "Particulate",
    "Rock",
    "Sediment",
    "Soil",
    "Synthetic",
];

pub const DATE_GRAMMAR: &[&str] = &[
    "%m/%d/%Y",
    "%Y-%m-%d",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// A unit starts with a letter, `°` or `%`; digits and signs may only follow.
const UNIT_PATTERN: &str = r"^\s*(?P<value>[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)\s*(?P<unit>[\p{L}°%][\p{L}\p{N}°%/^*·.\- ]*?)?\s*$";
const IGSN_PATTERN: &str = r"^[A-Z0-9]{5}[A-Z0-9]{4}$";

pub fn table() -> Result<MappingTable, MapError> {
    let unit_regex = Regex::new(UNIT_PATTERN).expect("Invalid SESAR unit regex");
    let igsn = || Verifier::Pattern(Regex::new(IGSN_PATTERN).expect("Invalid IGSN regex"));

    MappingTable::builder(FileFormat::Sesar)
        .header_row(1)
        .column(ColumnRule::text("Sample Name", NAME_FIELD).required())
        .column(ColumnRule::text("IGSN", "igsn").verify(igsn()))
        .column(ColumnRule::text("Parent IGSN", "parent_igsn").verify(igsn()))
        .column(ColumnRule::text("Sample Description", DESCRIPTION_FIELD).aliases(&["Description"]))
        .column(ColumnRule::text("Sample Type", "sample_type").verify(Verifier::OneOf(SAMPLE_TYPES)))
        .column(ColumnRule::text("Material", "material").verify(Verifier::OneOf(MATERIALS)))
        .column(
            ColumnRule::text("Field name (informal classification)", "field_name")
                .aliases(&["Field name"]),
        )
        .column(ColumnRule::text("Collection method", "collection_method"))
        .column(ColumnRule::number("Latitude", "latitude").verify(Verifier::range(-90.0, 90.0)))
        .column(
            ColumnRule::number("Longitude", "longitude").verify(Verifier::range(-180.0, 180.0)),
        )
        .column(ColumnRule::quantity("Elevation start", "elevation_start"))
        .column(ColumnRule::text("Navigation type", "navigation_type"))
        .column(ColumnRule::text("Locality", "locality"))
        .column(ColumnRule::text("Country", "country"))
        .column(ColumnRule::text("State/Province", "state_province"))
        .column(ColumnRule::text("County", "county"))
        .column(ColumnRule::text("City/Township", "city_township"))
        .column(ColumnRule::text("Collector/Chief Scientist", "collector"))
        .column(ColumnRule::text("Collection date", "collection_date"))
        .column(ColumnRule::text("Collection end date", "collection_end_date"))
        .column(
            ColumnRule::quantity("Depth in core (min)", "depth_in_core_min")
                .verify(Verifier::non_negative()),
        )
        .column(ColumnRule::text("Purpose", "purpose"))
        .column(ColumnRule::text("Current archive", "current_archive"))
        .group("location", &["latitude", "longitude"])
        .group(
            "geographic_area",
            &["country", "state_province", "county", "city_township"],
        )
        .dates(&["collection_date", "collection_end_date"])
        .date_grammar(DATE_GRAMMAR)
        .unit_regex(unit_regex)
        .build()
}
