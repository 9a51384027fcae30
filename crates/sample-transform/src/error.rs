//! Import errors.

use sample_ingest::IngestError;
use sample_map::FileFormat;
use sample_model::ValidationReport;
use thiserror::Error;

/// A required column that the file lacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingColumn {
    pub header: String,
    /// Closest unmapped header in the file.
    pub suggestion: Option<String>,
}

impl std::fmt::Display for MissingColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}'", self.header)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{suggestion}'?)")?;
        }
        Ok(())
    }
}

/// The file's columns do not fit the selected format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("no column matches the {format} template (found: {})", .headers.join(", "))]
    NoMappedColumns {
        format: FileFormat,
        headers: Vec<String>,
    },

    #[error("missing required {format} column(s): {}", join_missing(.missing))]
    MissingRequiredColumns {
        format: FileFormat,
        missing: Vec<MissingColumn>,
    },
}

fn join_missing(missing: &[MissingColumn]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Format(#[from] FormatError),

    /// Raised under the strict policy when any row was dropped.
    #[error("validation failed: {0}")]
    Validation(ValidationReport),

    /// Every data row was dropped.
    #[error("no samples could be imported ({} issue(s))", .issues.len())]
    Empty { issues: ValidationReport },
}

impl ImportError {
    /// Cell issues carried by the error, if any.
    pub fn issues(&self) -> Option<&ValidationReport> {
        match self {
            ImportError::Validation(issues) | ImportError::Empty { issues } => Some(issues),
            ImportError::Ingest(_) | ImportError::Format(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_display() {
        let err = FormatError::MissingRequiredColumns {
            format: FileFormat::Sesar,
            missing: vec![MissingColumn {
                header: "Sample Name".to_string(),
                suggestion: Some("Sampel Name".to_string()),
            }],
        };
        assert_eq!(
            err.to_string(),
            "missing required SESAR column(s): 'Sample Name' (did you mean 'Sampel Name'?)"
        );
    }
}
