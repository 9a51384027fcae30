use anyhow::{Context, Result};
use tracing::{info, warn};

use sample_cli::config::{Config, Overrides};
use sample_core::{
    CoreError, GenerateOtuSheetParams, ImportSamplesParams, OtuRequest, ServiceContext,
    UpdateAclsParams, generate_otu_sheet, import_samples, update_sample_set_acls,
};
use sample_map::FileFormat;
use sample_model::{Credential, OverlapPolicy};
use sample_output::{OtuOptions, OutputFormat, TaxonomySource};
use sample_transform::ValidationPolicy;

use crate::cli::{
    AclArgs, FileFormatArg, ImportArgs, OtuArgs, OtuOptionArgs, OutputFormatArg, OverlapArg,
    ServiceArgs, TaxonomyArg,
};
use crate::summary::{
    print_acl_summary, print_formats, print_import_summary, print_issue_table, print_otu_summary,
};

/// How a command that did not error finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Clean,
    /// Completed, but some rows or samples were skipped.
    WithIssues,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Clean => 0,
            Outcome::WithIssues => 2,
        }
    }
}

pub fn load_config(
    path: Option<&std::path::Path>,
    service: &ServiceArgs,
    otu: Option<&OtuOptionArgs>,
) -> Result<Config> {
    let overrides = Overrides {
        scratch_dir: service.scratch_dir.clone(),
        store_dir: service.store_dir.clone(),
        staging_dir: service.staging_dir.clone(),
        workspace: service.workspace.clone(),
        user_id: service.user_id.clone(),
        timeout_secs: service.timeout_secs,
        num_otus: otu.and_then(|otu| otu.num_otus),
        otu_prefix: otu.and_then(|otu| otu.otu_prefix.clone()),
    };
    Ok(Config::load(path)?.with_overrides(&overrides))
}

pub fn run_import(args: &ImportArgs, config: &Config) -> Result<Outcome> {
    let token = args.token.as_deref().unwrap_or_default();
    let ctx = ServiceContext::local(config.core_settings(), Credential::new(token));
    let mut params = ImportSamplesParams::new(
        &args.sample_file,
        file_format(args.format),
        &args.set_name,
    );
    params.description.clone_from(&args.description);
    params.policy = if args.strict {
        ValidationPolicy::Strict
    } else {
        ValidationPolicy::Lenient
    };
    params.otu = args.otu_format.map(|format| OtuRequest {
        format: output_format(format),
        options: otu_options(&args.otu, config),
    });
    params.incl_input_in_output = args.incl_input;
    params.share_within_workspace = args.share_within_workspace;

    let output = match import_samples(&ctx, &params) {
        Ok(output) => output,
        Err(CoreError::Import(error)) => {
            if let Some(report) = error.issues() {
                print_issue_table(report);
            }
            return Err(error).with_context(|| format!("import {}", args.sample_file.display()));
        }
        Err(error) => {
            return Err(error).with_context(|| format!("import {}", args.sample_file.display()));
        }
    };
    print_import_summary(&output);

    for column in &output.unmapped_columns {
        warn!(header = %column.header, "column ignored");
    }
    let share_failures = output
        .workspace_acl
        .as_ref()
        .and_then(|share| share.report.as_ref())
        .map_or(0, |report| report.failure_count());
    if share_failures > 0 {
        warn!(samples = share_failures, "workspace permissions not applied");
    }
    if output.issues.is_empty() && share_failures == 0 {
        Ok(Outcome::Clean)
    } else {
        if !output.issues.is_empty() {
            warn!(skipped = output.issues.failed_rows().len(), "rows skipped");
        }
        Ok(Outcome::WithIssues)
    }
}

pub fn run_otu(args: &OtuArgs, config: &Config) -> Result<Outcome> {
    let ctx = ServiceContext::local(config.core_settings(), Credential::new(""));
    let params = GenerateOtuSheetParams {
        sample_set_ref: args.sample_set_ref.clone(),
        output_name: args.output_name.clone(),
        format: output_format(args.format),
        options: otu_options(&args.otu, config),
    };
    let output = generate_otu_sheet(&ctx, &params)
        .with_context(|| format!("generate OTU sheet for {}", args.sample_set_ref))?;
    print_otu_summary(&output);
    Ok(Outcome::Clean)
}

pub fn run_acl(args: &AclArgs, config: &Config) -> Result<Outcome> {
    let ctx = ServiceContext::local(config.core_settings(), Credential::new(&args.token));
    let request = args.request().ok_or(CoreError::NoAccessLevel)?;
    let params = UpdateAclsParams {
        sample_set_ref: args.sample_set_ref.clone(),
        request,
        overlap: match args.overlap {
            OverlapArg::HighestWins => OverlapPolicy::HighestWins,
            OverlapArg::Reject => OverlapPolicy::Reject,
        },
    };
    let output = update_sample_set_acls(&ctx, &params)
        .with_context(|| format!("update ACLs of {}", args.sample_set_ref))?;
    print_acl_summary(&output);
    info!(status = %output.status, "ACL update finished");
    if output.report.failure_count() == 0 {
        Ok(Outcome::Clean)
    } else {
        Ok(Outcome::WithIssues)
    }
}

pub fn run_formats() -> Result<Outcome> {
    print_formats();
    Ok(Outcome::Clean)
}

fn otu_options(args: &OtuOptionArgs, config: &Config) -> OtuOptions {
    OtuOptions {
        num_otus: config.otu.num_otus,
        otu_prefix: config.otu.otu_prefix.clone(),
        taxonomy_source: match args.taxonomy_source {
            TaxonomyArg::None => TaxonomySource::None,
            TaxonomyArg::Ncbi => TaxonomySource::Ncbi,
            TaxonomyArg::Silva => TaxonomySource::Silva,
            TaxonomyArg::Gtdb => TaxonomySource::Gtdb,
            TaxonomyArg::Rdp => TaxonomySource::Rdp,
        },
        incl_seq: args.incl_seq,
    }
}

fn file_format(arg: FileFormatArg) -> FileFormat {
    match arg {
        FileFormatArg::Enigma => FileFormat::Enigma,
        FileFormatArg::Sesar => FileFormat::Sesar,
    }
}

fn output_format(arg: OutputFormatArg) -> OutputFormat {
    match arg {
        OutputFormatArg::Csv => OutputFormat::Csv,
        OutputFormatArg::Xls => OutputFormat::Xls,
    }
}
