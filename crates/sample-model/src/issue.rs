//! Cell-level validation issues.
//!
//! Each variant of [`IssueReason`] carries the offending value and the
//! constraint it failed so that a report can be acted on without reopening
//! the source file.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a cell failed verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueReason {
    /// Required field is empty.
    Required,
    /// Value is not a number.
    NotANumber { value: String },
    /// Value is a number but not a whole one.
    NotAnInteger { value: String },
    /// Number is outside the allowed range.
    OutOfRange {
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Value is not one of the allowed terms.
    NotInVocabulary {
        value: String,
        allowed: Vec<String>,
        suggestion: Option<String>,
    },
    /// Value does not match the column's pattern.
    PatternMismatch { value: String, pattern: String },
    /// Date could not be parsed with the format's date grammar.
    UnparseableDate { value: String },
    /// Another row in the same file already uses this sample name.
    DuplicateName { value: String, first_row: usize },
}

impl IssueReason {
    /// Short machine-friendly code for the reason.
    pub fn code(&self) -> &'static str {
        match self {
            IssueReason::Required => "required",
            IssueReason::NotANumber { .. } => "not-a-number",
            IssueReason::NotAnInteger { .. } => "not-an-integer",
            IssueReason::OutOfRange { .. } => "out-of-range",
            IssueReason::NotInVocabulary { .. } => "enum-mismatch",
            IssueReason::PatternMismatch { .. } => "pattern-mismatch",
            IssueReason::UnparseableDate { .. } => "unparseable-date",
            IssueReason::DuplicateName { .. } => "duplicate-name",
        }
    }
}

impl fmt::Display for IssueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueReason::Required => f.write_str("value is required"),
            IssueReason::NotANumber { value } => write!(f, "'{value}' is not a number"),
            IssueReason::NotAnInteger { value } => write!(f, "'{value}' is not a whole number"),
            IssueReason::OutOfRange { value, min, max } => {
                write!(f, "{value} is outside ")?;
                match (min, max) {
                    (Some(min), Some(max)) => write!(f, "[{min}, {max}]"),
                    (Some(min), None) => write!(f, "[{min}, ..)"),
                    (None, Some(max)) => write!(f, "(.., {max}]"),
                    (None, None) => f.write_str("the allowed range"),
                }
            }
            IssueReason::NotInVocabulary {
                value,
                allowed,
                suggestion,
            } => {
                write!(f, "'{value}' is not one of: {}", allowed.join(", "))?;
                if let Some(suggestion) = suggestion {
                    write!(f, " (did you mean '{suggestion}'?)")?;
                }
                Ok(())
            }
            IssueReason::PatternMismatch { value, pattern } => {
                write!(f, "'{value}' does not match {pattern}")
            }
            IssueReason::UnparseableDate { value } => write!(f, "'{value}' is not a valid date"),
            IssueReason::DuplicateName { value, first_row } => {
                write!(f, "sample name '{value}' already used on row {first_row}")
            }
        }
    }
}

/// A single failed cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellIssue {
    /// 1-based data row number (the first row after the header is 1).
    pub row: usize,
    /// Source column header as it appears in the file.
    pub column: String,
    pub reason: IssueReason,
}

impl CellIssue {
    pub fn new(row: usize, column: impl Into<String>, reason: IssueReason) -> Self {
        Self {
            row,
            column: column.into(),
            reason,
        }
    }
}

impl fmt::Display for CellIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}, column '{}': {}", self.row, self.column, self.reason)
    }
}

/// Every issue collected during one import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<CellIssue>,
}

impl ValidationReport {
    pub fn new(issues: Vec<CellIssue>) -> Self {
        Self { issues }
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Distinct row numbers that had at least one issue.
    pub fn failed_rows(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = self.issues.iter().map(|issue| issue.row).collect();
        rows.sort_unstable();
        rows.dedup();
        rows
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation issue(s)", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "\n  - {issue}")?;
        }
        Ok(())
    }
}
