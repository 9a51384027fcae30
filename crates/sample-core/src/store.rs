//! Sample-set persistence.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use sample_model::{ObjectRef, SampleSet, ServiceError};
use serde::{Deserialize, Serialize};

use crate::fsutil::{sha256_hex, write_atomic};

/// Metadata recorded next to every saved object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub name: String,
    pub reference: ObjectRef,
    /// Hex SHA-256 of the serialized data.
    pub checksum: String,
    /// RFC 3339 save time.
    pub saved_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSampleSet {
    pub info: ObjectInfo,
    pub data: SampleSet,
}

/// Versioned storage for sample sets.
pub trait SampleSetStore {
    /// Saves a new version of object `name`.
    fn save(&self, name: &str, set: &SampleSet, timeout: Duration)
    -> Result<ObjectRef, ServiceError>;

    fn get(&self, reference: &ObjectRef, timeout: Duration)
    -> Result<StoredSampleSet, ServiceError>;
}

/// Stores each version as `<root>/<workspace>/<name>/<version>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    workspace: String,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>, workspace: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            workspace: workspace.into(),
        }
    }

    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    fn object_dir(&self, workspace: &str, name: &str) -> PathBuf {
        self.root.join(workspace).join(name)
    }

    fn latest_version(dir: &Path) -> Result<u32, ServiceError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(ServiceError::storage(err)),
        };
        let mut latest = 0;
        for entry in entries {
            let entry = entry.map_err(ServiceError::storage)?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(version) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<u32>().ok())
            {
                latest = latest.max(version);
            }
        }
        Ok(latest)
    }
}

fn validate_name(name: &str) -> Result<(), ServiceError> {
    let invalid = name.trim().is_empty()
        || name.contains(['/', '\\'])
        || name.starts_with('.');
    if invalid {
        return Err(ServiceError::Rejected {
            message: format!("invalid object name '{name}'"),
        });
    }
    Ok(())
}

impl SampleSetStore for FileStore {
    fn save(
        &self,
        name: &str,
        set: &SampleSet,
        _timeout: Duration,
    ) -> Result<ObjectRef, ServiceError> {
        validate_name(&self.workspace)?;
        validate_name(name)?;
        let dir = self.object_dir(&self.workspace, name);
        let version = Self::latest_version(&dir)? + 1;
        let reference = ObjectRef::new(&self.workspace, name, version);

        let data = serde_json::to_vec(set).map_err(ServiceError::storage)?;
        let stored = StoredSampleSet {
            info: ObjectInfo {
                name: name.to_string(),
                reference: reference.clone(),
                checksum: sha256_hex(&data),
                saved_at: Utc::now().to_rfc3339(),
            },
            data: set.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&stored).map_err(ServiceError::storage)?;
        write_atomic(&dir.join(format!("{version}.json")), &bytes).map_err(ServiceError::storage)?;

        tracing::info!(reference = %reference, samples = set.len(), "saved sample set");
        Ok(reference)
    }

    fn get(
        &self,
        reference: &ObjectRef,
        _timeout: Duration,
    ) -> Result<StoredSampleSet, ServiceError> {
        validate_name(&reference.workspace)?;
        validate_name(&reference.object)?;
        let path = self
            .object_dir(&reference.workspace, &reference.object)
            .join(format!("{}.json", reference.version));
        let bytes = fs::read(&path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                ServiceError::NotFound {
                    what: "sample set",
                    id: reference.to_string(),
                }
            } else {
                ServiceError::storage(err)
            }
        })?;
        let stored: StoredSampleSet =
            serde_json::from_slice(&bytes).map_err(ServiceError::storage)?;

        let data = serde_json::to_vec(&stored.data).map_err(ServiceError::storage)?;
        if sha256_hex(&data) != stored.info.checksum {
            return Err(ServiceError::Storage {
                message: format!("checksum mismatch for {reference}"),
            });
        }
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sample_model::{SampleId, SampleRecord};
    use tempfile::tempdir;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn set() -> SampleSet {
        SampleSet::new(
            "wells",
            "",
            vec![SampleRecord::new(SampleId::generate(), "W1")],
        )
    }

    #[test]
    fn test_versions_increment() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path(), "ws");
        let first = store.save("wells", &set(), TIMEOUT).unwrap();
        let second = store.save("wells", &set(), TIMEOUT).unwrap();
        assert_eq!(first.to_string(), "ws/wells/1");
        assert_eq!(second.version, 2);
        let loaded = store.get(&second, TIMEOUT).unwrap();
        assert_eq!(loaded.info.reference, second);
        assert_eq!(loaded.info.checksum.len(), 64);
    }

    #[test]
    fn test_missing_object() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path(), "ws");
        let err = store
            .get(&ObjectRef::new("ws", "nothing", 1), TIMEOUT)
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[test]
    fn test_rejects_path_like_names() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path(), "ws");
        for name in ["", "../up", "a/b", ".hidden"] {
            assert!(matches!(
                store.save(name, &set(), TIMEOUT),
                Err(ServiceError::Rejected { .. })
            ));
        }
    }

    #[test]
    fn test_rejects_references_outside_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("store");
        let store = FileStore::new(&root, "ws");
        fs::create_dir_all(dir.path().join("x")).unwrap();
        fs::write(dir.path().join("x/1.json"), "{}").unwrap();

        for reference in [ObjectRef::new("..", "x", 1), ObjectRef::new("a/..", "x", 1)] {
            assert!(matches!(
                store.get(&reference, TIMEOUT),
                Err(ServiceError::Rejected { .. })
            ));
        }
        let outside = FileStore::new(&root, "..");
        assert!(matches!(
            outside.save("wells", &set(), TIMEOUT),
            Err(ServiceError::Rejected { .. })
        ));
    }

    #[test]
    fn test_tampered_object_fails_checksum() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path(), "ws");
        let reference = store.save("wells", &set(), TIMEOUT).unwrap();
        let path = dir.path().join("ws/wells/1.json");
        let content = fs::read_to_string(&path).unwrap().replace("W1", "W2");
        fs::write(&path, content).unwrap();
        assert!(matches!(
            store.get(&reference, TIMEOUT),
            Err(ServiceError::Storage { .. })
        ));
    }
}
