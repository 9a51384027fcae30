//! CLI argument definitions for the sample uploader.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use sample_model::{AccessLevel, AclRequest, ObjectRef};

#[derive(Parser)]
#[command(
    name = "sample-uploader",
    version,
    about = "Import ENIGMA and SESAR sample sheets into sample sets",
    long_about = "Import ENIGMA and SESAR sample sheets into sample sets.\n\n\
                  Generates OTU templates for imported sets and propagates\n\
                  access control to every sample of a set."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub service: ServiceArgs,
}

/// Overrides for the configuration file.
#[derive(Args)]
pub struct ServiceArgs {
    /// Directory for generated sheets and copied inputs.
    #[arg(long = "scratch-dir", value_name = "DIR", global = true)]
    pub scratch_dir: Option<PathBuf>,

    /// Root of the local object store.
    #[arg(long = "store-dir", value_name = "DIR", global = true)]
    pub store_dir: Option<PathBuf>,

    /// Fallback directory for input files that do not exist as given.
    #[arg(long = "staging-dir", value_name = "DIR", global = true)]
    pub staging_dir: Option<PathBuf>,

    /// Workspace name used in object references.
    #[arg(long = "workspace", global = true)]
    pub workspace: Option<String>,

    /// Importing user, left out when sharing within the workspace.
    #[arg(long = "user-id", value_name = "USER", global = true)]
    pub user_id: Option<String>,

    /// Deadline in seconds for file reads and service calls.
    #[arg(long = "timeout", value_name = "SECS", global = true)]
    pub timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Import a sample file into a new sample set.
    Import(ImportArgs),

    /// Generate an OTU template for a stored sample set.
    Otu(OtuArgs),

    /// Grant users access to every sample of a stored set.
    Acl(AclArgs),

    /// List supported file formats and their columns.
    Formats,
}

#[derive(Parser)]
pub struct ImportArgs {
    /// Sample file (CSV, TSV or SpreadsheetML).
    #[arg(value_name = "SAMPLE_FILE")]
    pub sample_file: PathBuf,

    /// Template the file follows.
    #[arg(long = "format", value_enum)]
    pub format: FileFormatArg,

    /// Name of the sample set to create.
    #[arg(long = "name")]
    pub set_name: String,

    #[arg(long = "description", default_value = "")]
    pub description: String,

    /// Fail the import when any row has an invalid cell.
    ///
    /// By default invalid rows are skipped and reported while the remaining
    /// rows are imported.
    #[arg(long = "strict")]
    pub strict: bool,

    /// Also write an OTU template in this format.
    #[arg(long = "otu-format", value_enum, value_name = "FORMAT")]
    pub otu_format: Option<OutputFormatArg>,

    #[command(flatten)]
    pub otu: OtuOptionArgs,

    /// Copy the input file next to the outputs and link it from the report.
    #[arg(long = "incl-input")]
    pub incl_input: bool,

    /// Give the workspace's other users their workspace level on the new samples.
    #[arg(long = "share-within-workspace", requires = "token")]
    pub share_within_workspace: bool,

    /// Credential presented to the permission service.
    #[arg(long = "token")]
    pub token: Option<String>,
}

#[derive(Args)]
pub struct OtuOptionArgs {
    /// Number of OTU columns.
    #[arg(long = "num-otus", value_name = "N")]
    pub num_otus: Option<usize>,

    /// Prefix of the OTU column headers.
    #[arg(long = "otu-prefix", value_name = "PREFIX")]
    pub otu_prefix: Option<String>,

    /// Add a taxonomy column for this reference database.
    #[arg(long = "taxonomy-source", value_enum, default_value = "none")]
    pub taxonomy_source: TaxonomyArg,

    /// Add a consensus sequence column.
    #[arg(long = "incl-seq")]
    pub incl_seq: bool,
}

#[derive(Parser)]
pub struct OtuArgs {
    /// Sample set reference (`workspace/object/version`).
    #[arg(value_name = "SAMPLE_SET_REF")]
    pub sample_set_ref: ObjectRef,

    /// Output file name without extension (default: `<set name>_OTUs`).
    #[arg(long = "output-name")]
    pub output_name: Option<String>,

    #[arg(long = "format", value_enum, default_value = "csv")]
    pub format: OutputFormatArg,

    #[command(flatten)]
    pub otu: OtuOptionArgs,
}

#[derive(Parser)]
pub struct AclArgs {
    /// Sample set reference (`workspace/object/version`).
    #[arg(value_name = "SAMPLE_SET_REF")]
    pub sample_set_ref: ObjectRef,

    /// User to grant the flagged level to (repeatable).
    #[arg(
        long = "user",
        value_name = "USER",
        required_unless_present_any = ["reader_users", "writer_users", "admin_users"]
    )]
    pub users: Vec<String>,

    #[arg(long = "reader", requires = "users")]
    pub reader: bool,

    #[arg(long = "writer", requires = "users")]
    pub writer: bool,

    #[arg(long = "admin", requires = "users")]
    pub admin: bool,

    /// User to grant read access to (repeatable).
    #[arg(long = "reader-user", value_name = "USER")]
    pub reader_users: Vec<String>,

    /// User to grant write access to (repeatable).
    #[arg(long = "writer-user", value_name = "USER")]
    pub writer_users: Vec<String>,

    /// User to grant admin access to (repeatable).
    #[arg(long = "admin-user", value_name = "USER")]
    pub admin_users: Vec<String>,

    /// What to do when a user is listed at several levels.
    #[arg(long = "overlap", value_enum, default_value = "highest-wins")]
    pub overlap: OverlapArg,

    /// Credential presented to the permission service.
    #[arg(long = "token")]
    pub token: String,
}

impl AclArgs {
    /// Combines the flagged `--user` list with the per-level options.
    ///
    /// Returns `None` when `--user` is given without a level flag.
    pub fn request(&self) -> Option<AclRequest> {
        let mut request = if self.users.is_empty() {
            AclRequest::new()
        } else {
            AclRequest::from_flags(self.users.iter().cloned(), self.reader, self.writer, self.admin)?
        };
        for (level, users) in [
            (AccessLevel::Reader, &self.reader_users),
            (AccessLevel::Writer, &self.writer_users),
            (AccessLevel::Admin, &self.admin_users),
        ] {
            for user in users {
                request.insert(level, user.as_str());
            }
        }
        Some(request)
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FileFormatArg {
    Enigma,
    Sesar,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Csv,
    Xls,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TaxonomyArg {
    None,
    Ncbi,
    Silva,
    Gtdb,
    Rdp,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OverlapArg {
    HighestWins,
    Reject,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn acl_requires_a_user() {
        let result = Cli::try_parse_from([
            "sample-uploader",
            "acl",
            "ws/set/1",
            "--reader",
            "--token",
            "t",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn global_overrides_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sample-uploader",
            "otu",
            "ws/set/2",
            "--scratch-dir",
            "/tmp/out",
            "--num-otus",
            "5",
        ])
        .unwrap();
        assert_eq!(cli.service.scratch_dir, Some(PathBuf::from("/tmp/out")));
        let Command::Otu(args) = cli.command else {
            panic!("expected otu command");
        };
        assert_eq!(args.sample_set_ref.to_string(), "ws/set/2");
        assert_eq!(args.otu.num_otus, Some(5));
    }

    fn acl_args(args: &[&str]) -> AclArgs {
        let mut argv = vec!["sample-uploader", "acl", "ws/set/1", "--token", "t"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Acl(args) => args,
            _ => panic!("expected acl command"),
        }
    }

    #[test]
    fn import_sharing_needs_a_token() {
        let base = [
            "sample-uploader",
            "import",
            "s.csv",
            "--format",
            "enigma",
            "--name",
            "set",
            "--share-within-workspace",
        ];
        assert!(Cli::try_parse_from(base).is_err());

        let cli = Cli::try_parse_from(base.iter().copied().chain(["--token", "t", "--user-id", "me"]))
            .unwrap();
        assert_eq!(cli.service.user_id.as_deref(), Some("me"));
        let Command::Import(args) = cli.command else {
            panic!("expected import command");
        };
        assert!(args.share_within_workspace);
        assert_eq!(args.token.as_deref(), Some("t"));
    }

    #[test]
    fn acl_per_level_users() {
        let args = acl_args(&[
            "--reader-user",
            "bob",
            "--reader-user",
            "carol",
            "--admin-user",
            "alice",
        ]);
        let request = args.request().unwrap();
        assert_eq!(
            request.users_at(AccessLevel::Reader).collect::<Vec<_>>(),
            vec!["bob", "carol"]
        );
        assert_eq!(
            request.users_at(AccessLevel::Admin).collect::<Vec<_>>(),
            vec!["alice"]
        );
        assert_eq!(request.users_at(AccessLevel::Writer).count(), 0);
    }

    #[test]
    fn acl_overlapping_levels_reach_reject_policy() {
        let args = acl_args(&[
            "--writer-user",
            "alice",
            "--admin-user",
            "alice",
            "--overlap",
            "reject",
        ]);
        assert!(matches!(args.overlap, OverlapArg::Reject));
        let request = args.request().unwrap();
        assert!(
            request
                .resolve(sample_model::OverlapPolicy::Reject)
                .is_err()
        );
    }

    #[test]
    fn acl_flags_combine_with_per_level_users() {
        let args = acl_args(&["--user", "dave", "--writer", "--reader-user", "erin"]);
        let request = args.request().unwrap();
        assert_eq!(
            request.users_at(AccessLevel::Writer).collect::<Vec<_>>(),
            vec!["dave"]
        );
        assert_eq!(
            request.users_at(AccessLevel::Reader).collect::<Vec<_>>(),
            vec!["erin"]
        );
    }

    #[test]
    fn acl_user_without_level_flag_has_no_request() {
        let args = acl_args(&["--user", "dave"]);
        assert!(args.request().is_none());
    }
}
