//! Operation reports.

use std::path::PathBuf;
use std::time::Duration;

use sample_model::{ObjectRef, ServiceError};
use serde::{Deserialize, Serialize};

use crate::fsutil::write_atomic;

/// A file attached to a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLink {
    pub path: PathBuf,
    pub name: String,
    pub label: String,
    pub description: String,
}

impl FileLink {
    /// Link named after the file's base name.
    pub fn new(path: PathBuf, label: impl Into<String>, description: impl Into<String>) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            name,
            label: label.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedObject {
    #[serde(rename = "ref")]
    pub reference: ObjectRef,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub message: String,
    pub objects_created: Vec<CreatedObject>,
    pub file_links: Vec<FileLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportInfo {
    pub name: String,
    #[serde(rename = "ref")]
    pub reference: ObjectRef,
}

/// Destination for operation reports.
pub trait ReportSink {
    fn create_report(
        &self,
        name: &str,
        report: &Report,
        timeout: Duration,
    ) -> Result<ReportInfo, ServiceError>;
}

/// Unique report object name, e.g. `SampleSet_import_report_<uuid>`.
pub fn report_name(prefix: &str) -> String {
    format!("{prefix}_{}", uuid::Uuid::new_v4())
}

/// Writes reports as `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct FileReportSink {
    dir: PathBuf,
    workspace: String,
}

impl FileReportSink {
    pub fn new(dir: impl Into<PathBuf>, workspace: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            workspace: workspace.into(),
        }
    }
}

impl ReportSink for FileReportSink {
    fn create_report(
        &self,
        name: &str,
        report: &Report,
        _timeout: Duration,
    ) -> Result<ReportInfo, ServiceError> {
        let path = self.dir.join(format!("{name}.json"));
        let bytes = serde_json::to_vec_pretty(report).map_err(ServiceError::storage)?;
        write_atomic(&path, &bytes).map_err(ServiceError::storage)?;
        tracing::debug!(path = %path.display(), "wrote report");
        Ok(ReportInfo {
            name: name.to_string(),
            reference: ObjectRef::new(&self.workspace, name, 1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_report_name_prefix() {
        let name = report_name("Generate_OTU_sheet_report");
        let uuid = name.strip_prefix("Generate_OTU_sheet_report_").unwrap();
        assert!(uuid::Uuid::parse_str(uuid).is_ok());
    }

    #[test]
    fn test_file_sink_writes_json() {
        let dir = tempdir().unwrap();
        let sink = FileReportSink::new(dir.path(), "ws");
        let report = Report {
            message: "done".to_string(),
            objects_created: vec![CreatedObject {
                reference: ObjectRef::new("ws", "set", 1),
                description: String::new(),
            }],
            file_links: vec![FileLink::new(
                PathBuf::from("/scratch/set_OTU.csv"),
                "OTU template file",
                "",
            )],
        };
        let info = sink
            .create_report("r1", &report, Duration::from_secs(1))
            .unwrap();
        assert_eq!(info.reference.to_string(), "ws/r1/1");
        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.path().join("r1.json")).unwrap()).unwrap();
        assert_eq!(json["objects_created"][0]["ref"], "ws/set/1");
        assert_eq!(json["file_links"][0]["name"], "set_OTU.csv");
    }
}
