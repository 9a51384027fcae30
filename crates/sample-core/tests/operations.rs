use std::path::{Path, PathBuf};
use std::time::Duration;

use sample_acl::{AclError, InMemoryPermissions, InMemoryWorkspaces, SampleStatus};
use sample_core::{
    CoreError, CoreSettings, FilePermissions, FileReportSink, FileStore, GenerateOtuSheetParams,
    ImportSamplesParams, OtuRequest, ServiceContext, UpdateAclsParams, generate_otu_sheet,
    import_samples, update_sample_set_acls,
};
use sample_map::FileFormat;
use sample_model::{AccessLevel, Credential, ServiceError};
use sample_output::{OtuOptions, OutputFormat};
use tempfile::TempDir;

const ENIGMA_CSV: &str = "Name,Latitude,Longitude,Depth (m),Material\n\
                          W1,35.9,-84.3,10,Soil\n\
                          W2,35.8,-84.2,12,Water\n\
                          W3,95.0,-84.2,3,Rock\n";

fn settings(dir: &TempDir) -> CoreSettings {
    CoreSettings {
        scratch_dir: dir.path().join("scratch"),
        store_dir: dir.path().join("store"),
        staging_dir: dir.path().join("staging"),
        workspace: "ws".to_string(),
        user_id: "me".to_string(),
        timeout: Duration::from_secs(10),
        max_attempts: 2,
        retry_delay: Duration::ZERO,
    }
}

fn write_input(dir: &Path, name: &str) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, ENIGMA_CSV).unwrap();
    path
}

#[test]
fn import_saves_set_writes_otu_sheet_and_report() {
    let dir = TempDir::new().unwrap();
    let ctx = ServiceContext::local(settings(&dir), Credential::new("token"));
    let input = write_input(dir.path(), "site.v1.csv");

    let mut params = ImportSamplesParams::new(&input, FileFormat::Enigma, "site");
    params.otu = Some(OtuRequest {
        format: OutputFormat::Csv,
        options: OtuOptions::default(),
    });
    params.incl_input_in_output = true;
    let output = import_samples(&ctx, &params).unwrap();

    assert_eq!(output.sample_set.len(), 2);
    assert_eq!(output.issues.len(), 1);
    assert_eq!(output.sample_set_ref.to_string(), "ws/site/1");
    assert_eq!(
        output.otu_path.as_deref(),
        Some(dir.path().join("scratch/site_OTU.csv").as_path())
    );
    assert!(dir.path().join("scratch/site.v1.csv").is_file());
    assert!(output.report.name.starts_with("SampleSet_import_report_"));

    let report_path = dir
        .path()
        .join("store/reports")
        .join(format!("{}.json", output.report.name));
    let report: serde_json::Value =
        serde_json::from_slice(&std::fs::read(report_path).unwrap()).unwrap();
    assert_eq!(report["objects_created"][0]["ref"], "ws/site/1");
    assert_eq!(report["file_links"].as_array().unwrap().len(), 2);
    assert_eq!(report["file_links"][1]["label"], "Input Sample file");
}

#[test]
fn relative_input_falls_back_to_staging() {
    let dir = TempDir::new().unwrap();
    let settings = settings(&dir);
    write_input(&settings.staging_dir, "staged.csv");
    let ctx = ServiceContext::local(settings, Credential::new("token"));

    let params = ImportSamplesParams::new("staged.csv", FileFormat::Enigma, "staged");
    let output = import_samples(&ctx, &params).unwrap();
    assert_eq!(output.sample_set.len(), 2);

    let params = ImportSamplesParams::new("absent.csv", FileFormat::Enigma, "absent");
    assert!(matches!(
        import_samples(&ctx, &params),
        Err(CoreError::InputNotFound { .. })
    ));
}

#[test]
fn otu_sheet_defaults_to_set_name() {
    let dir = TempDir::new().unwrap();
    let ctx = ServiceContext::local(settings(&dir), Credential::new("token"));
    let input = write_input(dir.path(), "site.csv");
    let imported = import_samples(&ctx, &ImportSamplesParams::new(&input, FileFormat::Enigma, "site"))
        .unwrap();

    let output = generate_otu_sheet(
        &ctx,
        &GenerateOtuSheetParams {
            sample_set_ref: imported.sample_set_ref,
            output_name: None,
            format: OutputFormat::Xls,
            options: OtuOptions {
                num_otus: 3,
                otu_prefix: "OTU_".to_string(),
                ..OtuOptions::default()
            },
        },
    )
    .unwrap();
    assert_eq!(output.path, dir.path().join("scratch/site_OTUs.xls"));
    assert!(output.report.name.starts_with("Generate_OTU_sheet_report_"));
    let xml = std::fs::read_to_string(&output.path).unwrap();
    assert!(xml.contains(">OTU_3<"));
}

#[test]
fn acl_update_with_flags_uses_highest_level() {
    let dir = TempDir::new().unwrap();
    let settings = settings(&dir);
    let permissions = InMemoryPermissions::new();
    let input = write_input(dir.path(), "site.csv");

    let imported = {
        let ctx = ServiceContext::local(settings.clone(), Credential::new("token"));
        import_samples(&ctx, &ImportSamplesParams::new(&input, FileFormat::Enigma, "site")).unwrap()
    };
    let first = imported.sample_set.samples[0].id.clone();
    permissions.fail_always(
        &first,
        ServiceError::Rejected {
            message: "not an owner".to_string(),
        },
    );

    let ctx = ServiceContext::new(
        settings.clone(),
        Credential::new("token"),
        Box::new(FileStore::new(&settings.store_dir, "ws")),
        Box::new(FileReportSink::new(settings.store_dir.join("reports"), "ws")),
        Box::new(permissions),
    );
    let params = UpdateAclsParams::from_flags(
        imported.sample_set_ref.clone(),
        ["alice", "bob"],
        true,
        true,
        false,
    )
    .unwrap();
    let output = update_sample_set_acls(&ctx, &params).unwrap();
    assert_eq!(output.status, "updated 1 of 2 samples");
    assert_eq!(output.report.acl.level_of("alice"), Some(AccessLevel::Writer));
    assert!(matches!(
        output.report.samples[&first],
        SampleStatus::Failed { .. }
    ));

    assert!(matches!(
        UpdateAclsParams::from_flags(imported.sample_set_ref, ["alice"], false, false, false),
        Err(CoreError::NoAccessLevel)
    ));
}

#[test]
fn acl_update_fails_when_every_sample_fails() {
    let dir = TempDir::new().unwrap();
    let ctx = ServiceContext::local(settings(&dir), Credential::new(""));
    let input = write_input(dir.path(), "site.csv");
    let imported =
        import_samples(&ctx, &ImportSamplesParams::new(&input, FileFormat::Enigma, "site")).unwrap();
    let params =
        UpdateAclsParams::from_flags(imported.sample_set_ref, ["alice"], true, false, false).unwrap();
    let err = update_sample_set_acls(&ctx, &params).unwrap_err();
    assert!(matches!(err, CoreError::Acl(AclError::AllFailed { .. })));
}

#[test]
fn import_carries_workspace_permissions_to_samples() {
    let dir = TempDir::new().unwrap();
    let settings = settings(&dir);
    std::fs::create_dir_all(&settings.store_dir).unwrap();
    std::fs::write(
        settings.store_dir.join("workspaces.json"),
        r#"{"ws": {"me": "a", "jrbolton": "w", "alice": "r", "*": "r"}}"#,
    )
    .unwrap();
    let ctx = ServiceContext::local(settings.clone(), Credential::new("token"));
    let input = write_input(dir.path(), "site.csv");

    let mut params = ImportSamplesParams::new(&input, FileFormat::Enigma, "site");
    params.share_within_workspace = true;
    let output = import_samples(&ctx, &params).unwrap();

    let share = output.workspace_acl.as_ref().unwrap();
    assert!(share.acl.public_read);
    let report = share.report.as_ref().unwrap();
    assert_eq!(report.failure_count(), 0);
    assert_eq!(report.acl.level_of("me"), None);

    let permissions = FilePermissions::new(settings.store_dir.join("permissions.json"));
    for sample in &output.sample_set.samples {
        let acl = permissions.acl(&sample.id).unwrap();
        assert_eq!(acl.get("jrbolton"), Some(&AccessLevel::Writer));
        assert_eq!(acl.get("alice"), Some(&AccessLevel::Reader));
        assert!(!acl.contains_key("me"));
    }
}

#[test]
fn private_workspace_shares_nothing() {
    let dir = TempDir::new().unwrap();
    let settings = settings(&dir);
    let workspaces = InMemoryWorkspaces::new();
    workspaces.set_permission("ws", "me", "a");
    let ctx = ServiceContext::new(
        settings.clone(),
        Credential::new("token"),
        Box::new(FileStore::new(&settings.store_dir, "ws")),
        Box::new(FileReportSink::new(settings.store_dir.join("reports"), "ws")),
        Box::new(InMemoryPermissions::new()),
    )
    .with_workspaces(Box::new(workspaces));
    let input = write_input(dir.path(), "site.csv");

    let mut params = ImportSamplesParams::new(&input, FileFormat::Enigma, "site");
    params.share_within_workspace = true;
    let output = import_samples(&ctx, &params).unwrap();
    let share = output.workspace_acl.unwrap();
    assert!(share.report.is_none());
    assert!(!share.acl.public_read);

    params.share_within_workspace = false;
    let output = import_samples(&ctx, &params).unwrap();
    assert!(output.workspace_acl.is_none());
}
