//! The three service operations: import, OTU sheet and ACL update.

use std::fs;
use std::path::{Path, PathBuf};

use sample_acl::{ReconcileOptions, ReconcileReport, reconcile};
use sample_map::FileFormat;
use sample_model::{
    AclRequest, ObjectRef, OverlapPolicy, SampleSet, ValidationReport, WorkspaceAcl,
};
use sample_output::{
    OtuOptions, OutputFormat, generate, otu_file_name, write_sheet, write_sheet_named,
};
use sample_transform::{ImportParams, UnmappedColumn, ValidationPolicy};
use tracing::{info, info_span};

use crate::context::{CoreSettings, ServiceContext};
use crate::error::{CoreError, Result};
use crate::report::{CreatedObject, FileLink, Report, ReportInfo, report_name};

pub const IMPORT_REPORT_PREFIX: &str = "SampleSet_import_report";
pub const OTU_REPORT_PREFIX: &str = "Generate_OTU_sheet_report";

const OTU_LINK_DESCRIPTION: &str = "file with each column containing the assigned sample_id and \
                                    sample name of each saved sample. Intended for uploading OTU data.";

/// OTU sheet to produce alongside an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtuRequest {
    pub format: OutputFormat,
    pub options: OtuOptions,
}

#[derive(Debug, Clone)]
pub struct ImportSamplesParams {
    pub sample_file: PathBuf,
    pub file_format: FileFormat,
    pub set_name: String,
    pub description: String,
    pub policy: ValidationPolicy,
    pub otu: Option<OtuRequest>,
    /// Copy the input file to scratch and link it from the report.
    pub incl_input_in_output: bool,
    /// Grant the workspace's other users their workspace level on the new samples.
    pub share_within_workspace: bool,
}

impl ImportSamplesParams {
    pub fn new(
        sample_file: impl Into<PathBuf>,
        file_format: FileFormat,
        set_name: impl Into<String>,
    ) -> Self {
        Self {
            sample_file: sample_file.into(),
            file_format,
            set_name: set_name.into(),
            description: String::new(),
            policy: ValidationPolicy::default(),
            otu: None,
            incl_input_in_output: false,
            share_within_workspace: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportSamplesOutput {
    pub report: ReportInfo,
    pub sample_set: SampleSet,
    pub sample_set_ref: ObjectRef,
    pub issues: ValidationReport,
    pub unmapped_columns: Vec<UnmappedColumn>,
    pub otu_path: Option<PathBuf>,
    /// Set when workspace permissions were carried over.
    pub workspace_acl: Option<WorkspaceShare>,
}

/// Workspace permissions carried over onto an imported set.
#[derive(Debug, Clone)]
pub struct WorkspaceShare {
    pub acl: WorkspaceAcl,
    /// `None` when nobody besides the importing user has access.
    pub report: Option<ReconcileReport>,
}

/// Resolves the input file, falling back to the staging directory.
pub fn resolve_input(ctx: &ServiceContext, sample_file: &Path) -> Result<PathBuf> {
    if sample_file.is_file() {
        return Ok(sample_file.to_path_buf());
    }
    let relative = sample_file.strip_prefix("/").unwrap_or(sample_file);
    let staged = ctx.settings.staging_dir.join(relative);
    if staged.is_file() {
        tracing::debug!(path = %staged.display(), "using staged input file");
        return Ok(staged);
    }
    Err(CoreError::InputNotFound {
        path: sample_file.to_path_buf(),
        staged,
    })
}

/// Imports a sample file, saves the set and files a report.
pub fn import_samples(ctx: &ServiceContext, params: &ImportSamplesParams) -> Result<ImportSamplesOutput> {
    let span = info_span!("import_samples", set = %params.set_name, format = %params.file_format);
    let _guard = span.enter();
    let settings = &ctx.settings;

    let input = resolve_input(ctx, &params.sample_file)?;
    let import_params = ImportParams::new(&params.set_name)
        .with_description(&params.description)
        .with_timeout(settings.timeout)
        .with_policy(params.policy);
    let outcome =
        sample_transform::import_samples(&input, params.file_format.mapping(), &import_params)?;

    let sample_set_ref = ctx
        .store
        .save(&params.set_name, &outcome.sample_set, settings.timeout)
        .map_err(CoreError::service("save sample set"))?;

    let mut file_links = Vec::new();
    let mut otu_path = None;
    if let Some(otu) = &params.otu {
        let sheet = generate(&outcome.sample_set, &otu.options);
        let path = settings.scratch_dir.join(otu_file_name(&input, otu.format));
        write_sheet(&sheet, &path, otu.format)?;
        file_links.push(FileLink::new(path.clone(), "OTU template file", OTU_LINK_DESCRIPTION));
        otu_path = Some(path);
    }

    if params.incl_input_in_output {
        let copy = copy_to_scratch(ctx, &input)?;
        file_links.push(FileLink::new(
            copy,
            "Input Sample file",
            "Input file provided to create the sample set.",
        ));
    }

    let workspace_acl = if params.share_within_workspace {
        Some(share_within_workspace(ctx, &outcome.sample_set)?)
    } else {
        None
    };

    let mut message = format!("SampleSet object named \"{}\" imported.", params.set_name);
    if let Some(share) = &workspace_acl {
        let shared = share.report.as_ref().map_or(0, |report| report.acl.len());
        message.push_str(&format!(
            " Workspace permissions carried over to {shared} user(s)."
        ));
        if share.acl.public_read {
            message.push_str(" The workspace is publicly readable.");
        }
    }
    if !outcome.issues.is_empty() {
        message.push_str(&format!(
            " {} row(s) were skipped:\n{}",
            outcome.issues.failed_rows().len(),
            outcome.issues
        ));
    }
    let report = Report {
        message,
        objects_created: vec![CreatedObject {
            reference: sample_set_ref.clone(),
            description: String::new(),
        }],
        file_links,
    };
    let report = ctx
        .reports
        .create_report(&report_name(IMPORT_REPORT_PREFIX), &report, settings.timeout)
        .map_err(CoreError::service("create report"))?;

    info!(reference = %sample_set_ref, samples = outcome.sample_set.len(), "sample set imported");
    Ok(ImportSamplesOutput {
        report,
        sample_set: outcome.sample_set,
        sample_set_ref,
        issues: outcome.issues,
        unmapped_columns: outcome.unmapped_columns,
        otu_path,
        workspace_acl,
    })
}

fn share_within_workspace(ctx: &ServiceContext, set: &SampleSet) -> Result<WorkspaceShare> {
    let settings = &ctx.settings;
    let acl = ctx
        .workspaces
        .workspace_acl(
            &settings.workspace,
            &settings.user_id,
            &ctx.credential,
            settings.timeout,
        )
        .map_err(CoreError::service("read workspace permissions"))?;
    let request = acl.to_request();
    if request.is_empty() {
        info!(workspace = %settings.workspace, "no workspace users to share with");
        return Ok(WorkspaceShare { acl, report: None });
    }
    let report = reconcile(
        set,
        &request,
        &*ctx.permissions,
        &ctx.credential,
        &reconcile_options(settings, OverlapPolicy::HighestWins),
    )?;
    info!(
        workspace = %settings.workspace,
        users = report.acl.len(),
        failed = report.failure_count(),
        "workspace permissions carried over"
    );
    Ok(WorkspaceShare {
        acl,
        report: Some(report),
    })
}

fn reconcile_options(settings: &CoreSettings, overlap: OverlapPolicy) -> ReconcileOptions {
    ReconcileOptions {
        overlap,
        timeout: settings.timeout,
        max_attempts: settings.max_attempts,
        retry_delay: settings.retry_delay,
    }
}

fn copy_to_scratch(ctx: &ServiceContext, input: &Path) -> Result<PathBuf> {
    let scratch = &ctx.settings.scratch_dir;
    fs::create_dir_all(scratch).map_err(|source| CoreError::Io {
        operation: "create",
        path: scratch.clone(),
        source,
    })?;
    let target = scratch.join(input.file_name().unwrap_or(input.as_os_str()));
    fs::copy(input, &target).map_err(|source| CoreError::Io {
        operation: "copy",
        path: input.to_path_buf(),
        source,
    })?;
    Ok(target)
}

#[derive(Debug, Clone)]
pub struct GenerateOtuSheetParams {
    pub sample_set_ref: ObjectRef,
    /// Defaults to `<set name>_OTUs`.
    pub output_name: Option<String>,
    pub format: OutputFormat,
    pub options: OtuOptions,
}

#[derive(Debug, Clone)]
pub struct GenerateOtuSheetOutput {
    pub report: ReportInfo,
    pub path: PathBuf,
}

/// Writes an OTU sheet for a stored sample set.
pub fn generate_otu_sheet(
    ctx: &ServiceContext,
    params: &GenerateOtuSheetParams,
) -> Result<GenerateOtuSheetOutput> {
    let span = info_span!("generate_otu_sheet", reference = %params.sample_set_ref);
    let _guard = span.enter();
    let settings = &ctx.settings;

    let stored = ctx
        .store
        .get(&params.sample_set_ref, settings.timeout)
        .map_err(CoreError::service("load sample set"))?;
    let output_name = params
        .output_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| format!("{}_OTUs", stored.info.name));

    let sheet = generate(&stored.data, &params.options);
    let path = write_sheet_named(&sheet, &settings.scratch_dir, &output_name, params.format)?;

    let report = Report {
        message: String::new(),
        objects_created: Vec::new(),
        file_links: vec![FileLink::new(
            path.clone(),
            "CSV with headers for OTU",
            OTU_LINK_DESCRIPTION,
        )],
    };
    let report = ctx
        .reports
        .create_report(&report_name(OTU_REPORT_PREFIX), &report, settings.timeout)
        .map_err(CoreError::service("create report"))?;
    Ok(GenerateOtuSheetOutput { report, path })
}

#[derive(Debug, Clone)]
pub struct UpdateAclsParams {
    pub sample_set_ref: ObjectRef,
    pub request: AclRequest,
    pub overlap: OverlapPolicy,
}

impl UpdateAclsParams {
    /// Grants every user in `new_users` the highest flagged level.
    pub fn from_flags<I, S>(
        sample_set_ref: ObjectRef,
        new_users: I,
        is_reader: bool,
        is_writer: bool,
        is_admin: bool,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let request = AclRequest::from_flags(new_users, is_reader, is_writer, is_admin)
            .ok_or(CoreError::NoAccessLevel)?;
        Ok(Self {
            sample_set_ref,
            request,
            overlap: OverlapPolicy::default(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct UpdateAclsOutput {
    pub status: String,
    pub report: ReconcileReport,
}

/// Applies an ACL request to every sample of a stored set.
pub fn update_sample_set_acls(
    ctx: &ServiceContext,
    params: &UpdateAclsParams,
) -> Result<UpdateAclsOutput> {
    let span = info_span!("update_sample_set_acls", reference = %params.sample_set_ref);
    let _guard = span.enter();
    let settings = &ctx.settings;

    let stored = ctx
        .store
        .get(&params.sample_set_ref, settings.timeout)
        .map_err(CoreError::service("load sample set"))?;
    let report = reconcile(
        &stored.data,
        &params.request,
        &*ctx.permissions,
        &ctx.credential,
        &reconcile_options(settings, params.overlap),
    )?;
    let applied = report.len() - report.failure_count();
    let status = format!("updated {applied} of {} samples", report.len());
    Ok(UpdateAclsOutput { status, report })
}
