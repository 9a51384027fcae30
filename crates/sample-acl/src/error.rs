use sample_model::ModelError;
use thiserror::Error;

use crate::reconcile::ReconcileReport;

#[derive(Debug, Error)]
pub enum AclError {
    #[error("ACL request names no users")]
    EmptyRequest,

    /// The request could not be resolved (overlapping grants under `Reject`).
    #[error("invalid ACL request: {0}")]
    InvalidRequest(#[source] ModelError),

    #[error("ACL update failed for all {} sample(s)", .report.len())]
    AllFailed { report: Box<ReconcileReport> },
}

impl AclError {
    /// Per-sample results, when the request got as far as the service.
    pub fn report(&self) -> Option<&ReconcileReport> {
        match self {
            AclError::AllFailed { report } => Some(report),
            AclError::EmptyRequest | AclError::InvalidRequest(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AclError>;
