//! Date normalization to `YYYY-MM-DDTHH:MM:SS`.
//!
//! Input is tried against a per-format grammar of chrono format strings.
//! Values already in the output form (optionally with fractional seconds)
//! are accepted as-is, so normalizing twice is a no-op.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Output format for every normalized date.
pub const ISO_DATETIME: &str = "%Y-%m-%dT%H:%M:%S";

const ISO_INPUTS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses `value` using ISO forms first, then `grammar` in order.
///
/// Each grammar entry is tried as a datetime and, failing that, as a bare
/// date at midnight.
pub fn parse_date(value: &str, grammar: &[&str]) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    ISO_INPUTS
        .iter()
        .chain(grammar)
        .find_map(|format| try_parse(trimmed, format))
}

/// Normalizes `value` to [`ISO_DATETIME`], or `None` when no format fits.
pub fn normalize_date(value: &str, grammar: &[&str]) -> Option<String> {
    parse_date(value, grammar).map(|dt| dt.format(ISO_DATETIME).to_string())
}

fn try_parse(value: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, format)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, format)
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ENIGMA: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d", "%m/%d/%Y"];

    #[test]
    fn test_date_only_gets_midnight() {
        assert_eq!(
            normalize_date("2020-01-15", ENIGMA).as_deref(),
            Some("2020-01-15T00:00:00")
        );
        assert_eq!(
            normalize_date("1/5/2021", ENIGMA).as_deref(),
            Some("2021-01-05T00:00:00")
        );
        assert_eq!(
            normalize_date("2020-01-15 08:30:00", ENIGMA).as_deref(),
            Some("2020-01-15T08:30:00")
        );
    }

    #[test]
    fn test_iso_input_is_accepted() {
        assert_eq!(
            normalize_date("2020-01-15T00:00:00", ENIGMA).as_deref(),
            Some("2020-01-15T00:00:00")
        );
        assert_eq!(
            normalize_date("2020-01-15T10:11:12.000", &[]).as_deref(),
            Some("2020-01-15T10:11:12")
        );
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(normalize_date("last tuesday", ENIGMA), None);
        assert_eq!(normalize_date("2020-13-45", ENIGMA), None);
        assert_eq!(normalize_date("  ", ENIGMA), None);
    }

    proptest! {
        #[test]
        fn normalizing_twice_is_a_no_op(
            year in 1900i32..2100,
            month in 1u32..=12,
            day in 1u32..=28,
            hour in 0u32..24,
            minute in 0u32..60,
            with_time in any::<bool>(),
            us_style in any::<bool>(),
        ) {
            let input = match (with_time, us_style) {
                (true, _) => format!("{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:00"),
                (false, true) => format!("{month}/{day}/{year:04}"),
                (false, false) => format!("{year:04}-{month:02}-{day:02}"),
            };
            let once = normalize_date(&input, ENIGMA).unwrap();
            let twice = normalize_date(&once, ENIGMA).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
