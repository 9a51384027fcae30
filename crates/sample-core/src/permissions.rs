//! File-backed permission service.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use sample_acl::{PermissionService, STATUS_UNCHANGED, STATUS_UPDATED, apply_payload};
use sample_model::{AccessLevel, AclPayload, Credential, SampleId, ServiceError};

use crate::fsutil::write_atomic;

type AclTable = BTreeMap<SampleId, BTreeMap<String, AccessLevel>>;

/// Keeps every sample's ACL in one JSON document.
#[derive(Debug)]
pub struct FilePermissions {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FilePermissions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<AclTable, ServiceError> {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(ServiceError::storage),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(AclTable::new()),
            Err(err) => Err(ServiceError::storage(err)),
        }
    }

    /// Current ACL of one sample.
    pub fn acl(&self, sample: &SampleId) -> Result<BTreeMap<String, AccessLevel>, ServiceError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.remove(sample).unwrap_or_default())
    }
}

impl PermissionService for FilePermissions {
    fn update_acls(
        &self,
        sample: &SampleId,
        payload: &AclPayload,
        credential: &Credential,
        _timeout: Duration,
    ) -> Result<String, ServiceError> {
        if credential.expose().trim().is_empty() {
            return Err(ServiceError::Rejected {
                message: "missing credential".to_string(),
            });
        }
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut table = self.load()?;
        if !apply_payload(table.entry(sample.clone()).or_default(), payload) {
            return Ok(STATUS_UNCHANGED.to_string());
        }
        let bytes = serde_json::to_vec_pretty(&table).map_err(ServiceError::storage)?;
        write_atomic(&self.path, &bytes).map_err(ServiceError::storage)?;
        Ok(STATUS_UPDATED.to_string())
    }
}
