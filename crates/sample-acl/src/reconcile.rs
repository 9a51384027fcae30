//! ACL reconciliation across a sample set.

use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

use sample_model::{
    AclPayload, AclRequest, Credential, OverlapPolicy, ResolvedAcl, SampleId, SampleSet,
    ServiceError,
};
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use crate::error::{AclError, Result};
use crate::service::PermissionService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOptions {
    pub overlap: OverlapPolicy,
    /// Deadline handed to every permission call.
    pub timeout: Duration,
    /// Total tries per sample for retryable failures (at least one).
    pub max_attempts: u32,
    /// Pause between tries of the same sample.
    pub retry_delay: Duration,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            overlap: OverlapPolicy::HighestWins,
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            retry_delay: Duration::from_millis(200),
        }
    }
}

/// Outcome for one sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SampleStatus {
    Applied {
        status: String,
        attempts: u32,
    },
    Failed {
        #[serde(serialize_with = "display")]
        error: ServiceError,
        retryable: bool,
        attempts: u32,
    },
}

fn display<S: serde::Serializer>(
    error: &ServiceError,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

impl SampleStatus {
    pub fn is_applied(&self) -> bool {
        matches!(self, SampleStatus::Applied { .. })
    }
}

/// Per-sample results keyed by sample id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub acl: ResolvedAcl,
    pub samples: BTreeMap<SampleId, SampleStatus>,
}

impl ReconcileReport {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn applied(&self) -> impl Iterator<Item = &SampleId> {
        self.samples
            .iter()
            .filter(|(_, status)| status.is_applied())
            .map(|(id, _)| id)
    }

    pub fn failed(&self) -> impl Iterator<Item = (&SampleId, &SampleStatus)> {
        self.samples.iter().filter(|(_, status)| !status.is_applied())
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    pub fn all_failed(&self) -> bool {
        !self.samples.is_empty() && self.samples.values().all(|status| !status.is_applied())
    }
}

/// Applies `request` to every sample of `set`.
///
/// Samples are processed in set order. A failing sample never stops the
/// others; the call itself fails only for an empty or unresolvable request,
/// or when every sample failed.
pub fn reconcile<P>(
    set: &SampleSet,
    request: &AclRequest,
    service: &P,
    credential: &Credential,
    options: &ReconcileOptions,
) -> Result<ReconcileReport>
where
    P: PermissionService + ?Sized,
{
    let span = info_span!("reconcile", set = %set.name, samples = set.len());
    let _guard = span.enter();

    if request.is_empty() {
        return Err(AclError::EmptyRequest);
    }
    let acl = request
        .resolve(options.overlap)
        .map_err(AclError::InvalidRequest)?;
    let payload = acl.payload();
    debug!(
        admin = payload.admin.len(),
        writer = payload.writer.len(),
        reader = payload.reader.len(),
        "resolved ACL request"
    );

    let mut samples = BTreeMap::new();
    for sample in &set.samples {
        let status = apply_with_retry(&sample.id, &payload, service, credential, options);
        samples.insert(sample.id.clone(), status);
    }

    let report = ReconcileReport { acl, samples };
    if report.all_failed() {
        warn!("ACL update failed for every sample");
        return Err(AclError::AllFailed {
            report: Box::new(report),
        });
    }
    info!(
        applied = report.len() - report.failure_count(),
        failed = report.failure_count(),
        "ACL reconciliation complete"
    );
    Ok(report)
}

fn apply_with_retry<P>(
    id: &SampleId,
    payload: &AclPayload,
    service: &P,
    credential: &Credential,
    options: &ReconcileOptions,
) -> SampleStatus
where
    P: PermissionService + ?Sized,
{
    let max_attempts = options.max_attempts.max(1);
    let mut attempts = 0;
    loop {
        attempts += 1;
        match service.update_acls(id, payload, credential, options.timeout) {
            Ok(status) => {
                debug!(sample = %id, %status, attempts, "ACL applied");
                return SampleStatus::Applied { status, attempts };
            }
            Err(error) if error.is_retryable() && attempts < max_attempts => {
                debug!(sample = %id, %error, attempts, "retrying ACL update");
                if !options.retry_delay.is_zero() {
                    thread::sleep(options.retry_delay);
                }
            }
            Err(error) => {
                warn!(sample = %id, %error, attempts, "ACL update failed");
                return SampleStatus::Failed {
                    retryable: error.is_retryable(),
                    error,
                    attempts,
                };
            }
        }
    }
}
