//! Service-operation errors.

use std::path::PathBuf;

use sample_acl::AclError;
use sample_model::ServiceError;
use sample_output::OutputError;
use sample_transform::ImportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    Acl(#[from] AclError),

    /// A store or report call failed.
    #[error("{operation} failed: {source}")]
    Service {
        operation: &'static str,
        #[source]
        source: ServiceError,
    },

    #[error("input file {} does not exist (also tried {})", .path.display(), .staged.display())]
    InputNotFound { path: PathBuf, staged: PathBuf },

    #[error("no access level selected (set one of reader, writer, admin)")]
    NoAccessLevel,

    #[error("failed to {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CoreError {
    pub(crate) fn service(operation: &'static str) -> impl FnOnce(ServiceError) -> Self {
        move |source| CoreError::Service { operation, source }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
