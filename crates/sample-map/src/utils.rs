//! Header normalization helpers.

/// Normalizes text for comparison by lowercasing and replacing separators with spaces.
pub fn normalize_text(raw: &str) -> String {
    raw.trim()
        .trim_matches('\u{feff}')
        .to_lowercase()
        .replace(['_', '-', '.', '/', '\\'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits a trailing unit annotation off a header.
///
/// `"Depth (m)"` and `"Depth [m]"` both yield `("Depth", Some("m"))`.
pub fn split_header_unit(raw: &str) -> (&str, Option<&str>) {
    let trimmed = raw.trim();
    for (open, close) in [('(', ')'), ('[', ']')] {
        if let Some(stripped) = trimmed.strip_suffix(close)
            && let Some(idx) = stripped.rfind(open)
        {
            let name = stripped[..idx].trim();
            let unit = stripped[idx + open.len_utf8()..].trim();
            if !name.is_empty() && !unit.is_empty() {
                return (name, Some(unit));
            }
        }
    }
    (trimmed, None)
}
