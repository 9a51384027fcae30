//! TOML configuration for the CLI.
//!
//! ```toml
//! scratch_dir = "/kb/module/work/tmp"
//! store_dir = "store"
//! staging_dir = "/staging"
//! workspace = "my_workspace"
//! user_id = "jrbolton"
//! timeout_secs = 60
//! max_attempts = 3
//!
//! [otu]
//! num_otus = 10
//! otu_prefix = "OTU"
//! ```
//!
//! Every key is optional. Command-line flags override file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use sample_core::CoreSettings;
use sample_output::{DEFAULT_NUM_OTUS, DEFAULT_OTU_PREFIX};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub scratch_dir: PathBuf,
    pub store_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub workspace: String,
    pub user_id: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub otu: OtuDefaults,
}

/// Defaults for generated OTU sheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OtuDefaults {
    pub num_otus: usize,
    pub otu_prefix: String,
}

impl Default for OtuDefaults {
    fn default() -> Self {
        Self {
            num_otus: DEFAULT_NUM_OTUS,
            otu_prefix: DEFAULT_OTU_PREFIX.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let settings = CoreSettings::default();
        Self {
            scratch_dir: settings.scratch_dir,
            store_dir: settings.store_dir,
            staging_dir: settings.staging_dir,
            workspace: settings.workspace,
            user_id: settings.user_id,
            timeout_secs: settings.timeout.as_secs(),
            max_attempts: settings.max_attempts,
            retry_delay_ms: u64::try_from(settings.retry_delay.as_millis()).unwrap_or(u64::MAX),
            otu: OtuDefaults::default(),
        }
    }
}

/// Values given on the command line; `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub scratch_dir: Option<PathBuf>,
    pub store_dir: Option<PathBuf>,
    pub staging_dir: Option<PathBuf>,
    pub workspace: Option<String>,
    pub user_id: Option<String>,
    pub timeout_secs: Option<u64>,
    pub num_otus: Option<usize>,
    pub otu_prefix: Option<String>,
}

impl Config {
    /// Loads `path`, or the defaults when no path is given or the file is missing.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parse config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(dir) = &overrides.scratch_dir {
            self.scratch_dir.clone_from(dir);
        }
        if let Some(dir) = &overrides.store_dir {
            self.store_dir.clone_from(dir);
        }
        if let Some(dir) = &overrides.staging_dir {
            self.staging_dir.clone_from(dir);
        }
        if let Some(workspace) = &overrides.workspace {
            self.workspace.clone_from(workspace);
        }
        if let Some(user_id) = &overrides.user_id {
            self.user_id.clone_from(user_id);
        }
        if let Some(secs) = overrides.timeout_secs {
            self.timeout_secs = secs;
        }
        if let Some(num_otus) = overrides.num_otus {
            self.otu.num_otus = num_otus;
        }
        if let Some(prefix) = &overrides.otu_prefix {
            self.otu.otu_prefix.clone_from(prefix);
        }
        self
    }

    pub fn core_settings(&self) -> CoreSettings {
        CoreSettings {
            scratch_dir: self.scratch_dir.clone(),
            store_dir: self.store_dir.clone(),
            staging_dir: self.staging_dir.clone(),
            workspace: self.workspace.clone(),
            user_id: self.user_id.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            max_attempts: self.max_attempts.max(1),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}
