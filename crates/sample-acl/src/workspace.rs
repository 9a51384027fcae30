//! Workspace permission collaborator.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use sample_model::{Credential, ServiceError, WorkspaceAcl};

/// Reads who can access a workspace so new samples can inherit it.
///
/// Like [`crate::PermissionService`], implementations must return
/// [`ServiceError::Timeout`] rather than block past `timeout`.
pub trait WorkspacePermissions {
    /// Permissions on `workspace`, leaving out `user` (the importing user).
    fn workspace_acl(
        &self,
        workspace: &str,
        user: &str,
        credential: &Credential,
        timeout: Duration,
    ) -> Result<WorkspaceAcl, ServiceError>;
}

impl<T: WorkspacePermissions + ?Sized> WorkspacePermissions for &T {
    fn workspace_acl(
        &self,
        workspace: &str,
        user: &str,
        credential: &Credential,
        timeout: Duration,
    ) -> Result<WorkspaceAcl, ServiceError> {
        (**self).workspace_acl(workspace, user, credential, timeout)
    }
}

/// Process-local workspace permissions, keyed by workspace name.
///
/// Unknown workspaces have no permissions.
#[derive(Debug, Default)]
pub struct InMemoryWorkspaces {
    workspaces: Mutex<HashMap<String, BTreeMap<String, String>>>,
}

impl InMemoryWorkspaces {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, BTreeMap<String, String>>> {
        self.workspaces.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets `user`'s permission code (`a`, `w`, `r` or `n`) on `workspace`.
    pub fn set_permission(&self, workspace: &str, user: &str, code: &str) {
        self.lock()
            .entry(workspace.to_string())
            .or_default()
            .insert(user.to_string(), code.to_string());
    }

    /// Sets the permission every user holds (`r` or `n`).
    pub fn set_global_permission(&self, workspace: &str, code: &str) {
        self.set_permission(workspace, sample_model::GLOBAL_USER, code);
    }
}

impl WorkspacePermissions for InMemoryWorkspaces {
    fn workspace_acl(
        &self,
        workspace: &str,
        user: &str,
        _credential: &Credential,
        _timeout: Duration,
    ) -> Result<WorkspaceAcl, ServiceError> {
        let workspaces = self.lock();
        let Some(permissions) = workspaces.get(workspace) else {
            return Ok(WorkspaceAcl::default());
        };
        WorkspaceAcl::from_permissions(
            user,
            permissions
                .iter()
                .map(|(user, code)| (user.as_str(), code.as_str())),
        )
        .map_err(|err| ServiceError::Rejected {
            message: err.to_string(),
        })
    }
}
