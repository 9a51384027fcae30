//! Data model for sample metadata imports.
//!
//! The types here are shared by every stage of the uploader: the importer
//! produces [`SampleSet`]s, the OTU sheet generator and the ACL reconciler
//! consume them, and the collaborator traits in `sample-core` persist them.

pub mod acl;
pub mod error;
pub mod ids;
pub mod issue;
pub mod sample;
pub mod service;

pub use acl::{
    AccessLevel, AclPayload, AclRequest, GLOBAL_USER, OverlapPolicy, ResolvedAcl, WorkspaceAcl,
};
pub use error::{ModelError, Result};
pub use ids::{ObjectRef, SampleId};
pub use issue::{CellIssue, IssueReason, ValidationReport};
pub use sample::{FieldValue, SampleInfo, SampleRecord, SampleSet};
pub use service::{Credential, ServiceError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_set_serializes() {
        let mut record = SampleRecord::new(SampleId::generate(), "PB-1");
        record.set_field("material", FieldValue::Text("soil".to_string()));
        let set = SampleSet::new("set", "imported", vec![record]);

        let json = serde_json::to_string(&set).expect("serialize set");
        let round: SampleSet = serde_json::from_str(&json).expect("deserialize set");
        assert_eq!(round, set);
    }
}
