//! File-backed workspace permissions.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use sample_acl::WorkspacePermissions;
use sample_model::{Credential, ServiceError, WorkspaceAcl};

type PermissionTable = BTreeMap<String, BTreeMap<String, String>>;

/// Reads `{ "<workspace>": { "<user>": "a|w|r|n", "*": "r" } }` from one JSON document.
///
/// A missing document or workspace means nobody else has access.
#[derive(Debug, Clone)]
pub struct FileWorkspaces {
    path: PathBuf,
}

impl FileWorkspaces {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<PermissionTable, ServiceError> {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(ServiceError::storage),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(PermissionTable::new()),
            Err(err) => Err(ServiceError::storage(err)),
        }
    }
}

impl WorkspacePermissions for FileWorkspaces {
    fn workspace_acl(
        &self,
        workspace: &str,
        user: &str,
        _credential: &Credential,
        _timeout: Duration,
    ) -> Result<WorkspaceAcl, ServiceError> {
        let table = self.load()?;
        let Some(permissions) = table.get(workspace) else {
            return Ok(WorkspaceAcl::default());
        };
        WorkspaceAcl::from_permissions(
            user,
            permissions
                .iter()
                .map(|(user, code)| (user.as_str(), code.as_str())),
        )
        .map_err(|err| ServiceError::Rejected {
            message: format!("workspace {workspace}: {err}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[test]
    fn test_reads_workspace_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("workspaces.json");
        fs::write(
            &path,
            r#"{"ws": {"me": "a", "jrbolton": "w", "*": "r"}, "other": {"x": "a"}}"#,
        )
        .unwrap();
        let acl = FileWorkspaces::new(&path)
            .workspace_acl("ws", "me", &Credential::new("t"), TIMEOUT)
            .unwrap();
        assert_eq!(acl.write.iter().collect::<Vec<_>>(), vec!["jrbolton"]);
        assert!(acl.admin.is_empty());
        assert!(acl.public_read);
    }

    #[test]
    fn test_missing_document_is_private() {
        let dir = tempdir().unwrap();
        let acl = FileWorkspaces::new(dir.path().join("absent.json"))
            .workspace_acl("ws", "me", &Credential::new("t"), TIMEOUT)
            .unwrap();
        assert_eq!(acl, WorkspaceAcl::default());
    }
}
