//! Cell verification rules.

use std::fmt;

use regex::Regex;
use sample_model::IssueReason;

use crate::suggest::closest_match;

/// A check applied to every non-empty cell of a mapped column.
#[derive(Debug, Clone)]
pub enum Verifier {
    /// Any finite number within the optional bounds.
    Number { min: Option<f64>, max: Option<f64> },
    /// A whole number within the optional bounds.
    Integer { min: Option<i64>, max: Option<i64> },
    /// One of a fixed vocabulary (case-insensitive).
    OneOf(&'static [&'static str]),
    /// Must match the regular expression.
    Pattern(Regex),
}

impl Verifier {
    pub fn range(min: f64, max: f64) -> Self {
        Verifier::Number {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn non_negative() -> Self {
        Verifier::Number {
            min: Some(0.0),
            max: None,
        }
    }

    /// Checks a raw (trimmed, non-empty) cell.
    pub fn check(&self, value: &str) -> Result<(), IssueReason> {
        match self {
            Verifier::Number { .. } => {
                let number = parse_number(value).ok_or_else(|| IssueReason::NotANumber {
                    value: value.to_string(),
                })?;
                self.check_number(number)
            }
            Verifier::Integer { .. } => {
                let number = parse_number(value).ok_or_else(|| IssueReason::NotANumber {
                    value: value.to_string(),
                })?;
                if number.fract() != 0.0 {
                    return Err(IssueReason::NotAnInteger {
                        value: value.to_string(),
                    });
                }
                self.check_number(number)
            }
            Verifier::OneOf(terms) => {
                if self.canonical_term(value).is_some() {
                    Ok(())
                } else {
                    Err(IssueReason::NotInVocabulary {
                        value: value.to_string(),
                        allowed: terms.iter().map(|term| (*term).to_string()).collect(),
                        suggestion: closest_match(value, terms.iter().copied()).map(str::to_string),
                    })
                }
            }
            Verifier::Pattern(regex) => {
                if regex.is_match(value) {
                    Ok(())
                } else {
                    Err(IssueReason::PatternMismatch {
                        value: value.to_string(),
                        pattern: regex.as_str().to_string(),
                    })
                }
            }
        }
    }

    /// Checks the bounds of an already-parsed number.
    ///
    /// Vocabulary and pattern rules do not constrain numbers and always pass.
    pub fn check_number(&self, number: f64) -> Result<(), IssueReason> {
        let (min, max) = match self {
            Verifier::Number { min, max } => (*min, *max),
            Verifier::Integer { min, max } => (min.map(|v| v as f64), max.map(|v| v as f64)),
            Verifier::OneOf(_) | Verifier::Pattern(_) => return Ok(()),
        };
        let below = min.is_some_and(|min| number < min);
        let above = max.is_some_and(|max| number > max);
        if below || above {
            return Err(IssueReason::OutOfRange {
                value: number,
                min,
                max,
            });
        }
        Ok(())
    }

    /// For vocabulary rules, the canonical spelling of `value`.
    pub fn canonical_term(&self, value: &str) -> Option<&'static str> {
        let Verifier::OneOf(terms) = self else {
            return None;
        };
        let value = value.trim();
        terms
            .iter()
            .copied()
            .find(|term| term.eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verifier::Number { min, max } => write_bounds(f, "number", min, max),
            Verifier::Integer { min, max } => write_bounds(f, "integer", min, max),
            Verifier::OneOf(terms) => write!(f, "one of {} terms", terms.len()),
            Verifier::Pattern(regex) => write!(f, "matches {}", regex.as_str()),
        }
    }
}

fn write_bounds<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    kind: &str,
    min: &Option<T>,
    max: &Option<T>,
) -> fmt::Result {
    match (min, max) {
        (Some(min), Some(max)) => write!(f, "{kind} in [{min}, {max}]"),
        (Some(min), None) => write!(f, "{kind} >= {min}"),
        (None, Some(max)) => write!(f, "{kind} <= {max}"),
        (None, None) => f.write_str(kind),
    }
}

/// Parses a finite number.
pub fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}
