//! Collaborators and settings shared by the service operations.

use std::path::PathBuf;
use std::time::Duration;

use sample_acl::{InMemoryWorkspaces, PermissionService, WorkspacePermissions};
use sample_model::Credential;

use crate::permissions::FilePermissions;
use crate::report::{FileReportSink, ReportSink};
use crate::store::{FileStore, SampleSetStore};
use crate::workspaces::FileWorkspaces;

pub const DEFAULT_STAGING_DIR: &str = "/staging";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreSettings {
    /// Where generated sheets and copied inputs are written.
    pub scratch_dir: PathBuf,
    /// Root of the local object store.
    pub store_dir: PathBuf,
    /// Fallback directory for relative input paths.
    pub staging_dir: PathBuf,
    /// Workspace name used in object references.
    pub workspace: String,
    /// Importing user; left out when workspace permissions are carried over.
    pub user_id: String,
    /// Deadline for file reads and every collaborator call.
    pub timeout: Duration,
    /// Tries per sample for retryable permission failures.
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            scratch_dir: PathBuf::from("scratch"),
            store_dir: PathBuf::from("store"),
            staging_dir: PathBuf::from(DEFAULT_STAGING_DIR),
            workspace: "local".to_string(),
            user_id: String::new(),
            timeout: Duration::from_secs(60),
            max_attempts: 3,
            retry_delay: Duration::from_millis(200),
        }
    }
}

/// Everything an operation needs beyond its own parameters.
pub struct ServiceContext {
    pub settings: CoreSettings,
    pub credential: Credential,
    pub store: Box<dyn SampleSetStore>,
    pub reports: Box<dyn ReportSink>,
    pub permissions: Box<dyn PermissionService>,
    pub workspaces: Box<dyn WorkspacePermissions>,
}

impl ServiceContext {
    pub fn new(
        settings: CoreSettings,
        credential: Credential,
        store: Box<dyn SampleSetStore>,
        reports: Box<dyn ReportSink>,
        permissions: Box<dyn PermissionService>,
    ) -> Self {
        Self {
            settings,
            credential,
            store,
            reports,
            permissions,
            workspaces: Box::new(InMemoryWorkspaces::new()),
        }
    }

    #[must_use]
    pub fn with_workspaces(mut self, workspaces: Box<dyn WorkspacePermissions>) -> Self {
        self.workspaces = workspaces;
        self
    }

    /// File-backed collaborators rooted at `settings.store_dir`.
    pub fn local(settings: CoreSettings, credential: Credential) -> Self {
        let store = FileStore::new(&settings.store_dir, &settings.workspace);
        let reports = FileReportSink::new(settings.store_dir.join("reports"), &settings.workspace);
        let permissions = FilePermissions::new(settings.store_dir.join("permissions.json"));
        let workspaces = FileWorkspaces::new(settings.store_dir.join("workspaces.json"));
        Self::new(
            settings,
            credential,
            Box::new(store),
            Box::new(reports),
            Box::new(permissions),
        )
        .with_workspaces(Box::new(workspaces))
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("settings", &self.settings)
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}
