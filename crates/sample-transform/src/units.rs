//! Quantity parsing (`"5.2 mg/L"` to value and unit).

use regex::Regex;
use sample_map::parse_number;
use sample_model::IssueReason;

/// A parsed numeric cell with its unit, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    pub value: f64,
    pub unit: Option<String>,
}

/// Splits a quantity cell.
///
/// With a unit pattern the `value` and optional `unit` captures are used;
/// without one the whole cell must be a number. A missing unit falls back
/// to `default_unit` (the unit annotated in the column header).
pub fn parse_quantity(
    raw: &str,
    unit_regex: Option<&Regex>,
    default_unit: Option<&str>,
) -> Result<Quantity, IssueReason> {
    let not_a_number = || IssueReason::NotANumber {
        value: raw.to_string(),
    };
    let (value, unit) = match unit_regex {
        Some(regex) => {
            let caps = regex.captures(raw).ok_or_else(not_a_number)?;
            let value = caps.name("value").ok_or_else(not_a_number)?.as_str();
            let unit = caps
                .name("unit")
                .map(|unit| unit.as_str().trim())
                .filter(|unit| !unit.is_empty());
            (value, unit)
        }
        None => (raw, None),
    };
    let value = parse_number(value).ok_or_else(not_a_number)?;
    let unit = unit.or(default_unit).map(str::to_string);
    Ok(Quantity { value, unit })
}
