//! Access-control propagation for sample sets.
//!
//! [`reconcile`] resolves an [`sample_model::AclRequest`] to one level per
//! user and pushes the resulting payload to every sample through a
//! [`PermissionService`], retrying transient failures and recording a
//! status per sample. [`WorkspacePermissions`] supplies the grants a new
//! sample set inherits from its workspace.

pub mod error;
pub mod reconcile;
pub mod service;
pub mod workspace;

pub use error::{AclError, Result};
pub use reconcile::{ReconcileOptions, ReconcileReport, SampleStatus, reconcile};
pub use service::{
    InMemoryPermissions, PermissionService, STATUS_UNCHANGED, STATUS_UPDATED, apply_payload,
};
pub use workspace::{InMemoryWorkspaces, WorkspacePermissions};
