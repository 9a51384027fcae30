//! Sample uploader service layer.
//!
//! Wires the importer, OTU sheet generator and ACL reconciler to their
//! collaborators: a [`SampleSetStore`] for persistence, a [`ReportSink`]
//! for operation reports, a [`sample_acl::PermissionService`] and a
//! [`sample_acl::WorkspacePermissions`] source. Local file-backed
//! implementations of each are provided.

pub mod context;
pub mod error;
pub mod fsutil;
pub mod operations;
pub mod permissions;
pub mod report;
pub mod store;
pub mod workspaces;

pub use context::{CoreSettings, DEFAULT_STAGING_DIR, ServiceContext};
pub use error::{CoreError, Result};
pub use operations::{
    GenerateOtuSheetOutput, GenerateOtuSheetParams, IMPORT_REPORT_PREFIX, ImportSamplesOutput,
    ImportSamplesParams, OTU_REPORT_PREFIX, OtuRequest, UpdateAclsOutput, UpdateAclsParams,
    WorkspaceShare, generate_otu_sheet, import_samples, resolve_input, update_sample_set_acls,
};
pub use permissions::FilePermissions;
pub use report::{CreatedObject, FileLink, FileReportSink, Report, ReportInfo, ReportSink};
pub use store::{FileStore, ObjectInfo, SampleSetStore, StoredSampleSet};
pub use workspaces::FileWorkspaces;
