//! Normalized sample records and sample sets.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::ids::SampleId;

/// A typed field value on a [`SampleRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Free text.
    Text(String),
    /// Plain numeric value without a unit.
    Number(f64),
    /// ISO 8601 datetime (`YYYY-MM-DDTHH:MM:SS`).
    Date(String),
    /// Numeric value with a unit suffix, e.g. `5.2 mg/L`.
    Quantity { value: f64, unit: String },
    /// Several source columns collapsed into one structured value.
    Group(BTreeMap<String, FieldValue>),
    /// The source column was missing or the cell was empty.
    Absent,
}

impl FieldValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) | FieldValue::Date(text) => f.write_str(text),
            FieldValue::Number(value) => write!(f, "{value}"),
            FieldValue::Quantity { value, unit } => write!(f, "{value} {unit}"),
            FieldValue::Group(members) => {
                let parts: Vec<String> = members
                    .iter()
                    .filter(|(_, value)| !value.is_absent())
                    .map(|(key, value)| format!("{key}={value}"))
                    .collect();
                f.write_str(&parts.join("; "))
            }
            FieldValue::Absent => Ok(()),
        }
    }
}

/// One imported sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub id: SampleId,
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Canonical field name to typed value.
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl SampleRecord {
    pub fn new(id: SampleId, name: impl Into<String>) -> Self {
        Self {
            id,
            version: 1,
            name: name.into(),
            description: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn info(&self) -> SampleInfo {
        SampleInfo {
            name: self.name.clone(),
            version: self.version,
            id: self.id.clone(),
        }
    }
}

/// The `(name, version, id)` triple used to address a stored sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleInfo {
    pub name: String,
    pub version: u32,
    pub id: SampleId,
}

/// A named, ordered collection of samples created from one import batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub samples: Vec<SampleRecord>,
}

impl SampleSet {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        samples: Vec<SampleRecord>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            samples,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Looks up a sample by its name.
    pub fn sample_info(&self, name: &str) -> Result<SampleInfo, ModelError> {
        self.samples
            .iter()
            .find(|sample| sample.name == name)
            .map(SampleRecord::info)
            .ok_or_else(|| ModelError::SampleNotFound {
                name: name.to_string(),
                set: self.name.clone(),
            })
    }

    pub fn sample_ids(&self) -> impl Iterator<Item = &SampleId> {
        self.samples.iter().map(|sample| &sample.id)
    }
}
