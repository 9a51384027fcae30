//! Identifiers for samples and stored objects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Identifier assigned to a sample when it is imported.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleId(String);

impl SampleId {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptySampleId);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Draws a fresh random (v4) identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to a stored object: `workspace/object/version`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectRef {
    pub workspace: String,
    pub object: String,
    pub version: u32,
}

impl ObjectRef {
    pub fn new(workspace: impl Into<String>, object: impl Into<String>, version: u32) -> Self {
        Self {
            workspace: workspace.into(),
            object: object.into(),
            version,
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.workspace, self.object, self.version)
    }
}

impl FromStr for ObjectRef {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidObjectRef {
            value: s.to_string(),
        };
        let parts: Vec<&str> = s.trim().split('/').collect();
        let [workspace, object, version] = parts.as_slice() else {
            return Err(invalid());
        };
        if workspace.is_empty() || object.is_empty() {
            return Err(invalid());
        }
        let version = version.parse::<u32>().map_err(|_| invalid())?;
        Ok(Self::new(*workspace, *object, version))
    }
}

impl Serialize for ObjectRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
