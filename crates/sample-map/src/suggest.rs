use rapidfuzz::distance::jaro_winkler::similarity as jaro_similarity;

use crate::utils::normalize_text;

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
pub const SUGGESTION_THRESHOLD: f64 = 0.85;

/// Returns the candidate closest to `value`, if any is similar enough.
pub fn closest_match<'a, I>(value: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let normalized = normalize_text(value);
    if normalized.is_empty() {
        return None;
    }
    let mut best: Option<(&'a str, f64)> = None;
    for candidate in candidates {
        let score = jaro_similarity(normalized.chars(), normalize_text(candidate).chars());
        if score < SUGGESTION_THRESHOLD {
            continue;
        }
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((candidate, score));
        }
    }
    best.map(|(candidate, _)| candidate)
}
