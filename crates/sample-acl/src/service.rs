//! Permission collaborator.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use sample_model::{AccessLevel, AclPayload, Credential, SampleId, ServiceError};

/// Applies ACL payloads to individual samples.
///
/// Every level in the payload overwrites whatever the user held before on
/// that sample; users not named in the payload are left untouched.
///
/// Implementations must honor `timeout`: a call that cannot finish in time
/// returns [`ServiceError::Timeout`] instead of blocking. The reconciler
/// retries such failures but never interrupts a call in progress.
pub trait PermissionService {
    /// Returns a short status string reported back to the caller.
    fn update_acls(
        &self,
        sample: &SampleId,
        payload: &AclPayload,
        credential: &Credential,
        timeout: Duration,
    ) -> Result<String, ServiceError>;
}

impl<T: PermissionService + ?Sized> PermissionService for &T {
    fn update_acls(
        &self,
        sample: &SampleId,
        payload: &AclPayload,
        credential: &Credential,
        timeout: Duration,
    ) -> Result<String, ServiceError> {
        (**self).update_acls(sample, payload, credential, timeout)
    }
}

/// Merges `payload` into an existing per-user ACL, reporting whether anything changed.
pub fn apply_payload(acl: &mut BTreeMap<String, AccessLevel>, payload: &AclPayload) -> bool {
    let mut changed = false;
    for (user, level) in payload.entries() {
        if acl.insert(user.to_string(), level) != Some(level) {
            changed = true;
        }
    }
    changed
}

pub const STATUS_UPDATED: &str = "updated";
pub const STATUS_UNCHANGED: &str = "unchanged";

#[derive(Debug, Default)]
struct MemoryState {
    acls: BTreeMap<SampleId, BTreeMap<String, AccessLevel>>,
    failures: HashMap<SampleId, (ServiceError, usize)>,
    calls: usize,
}

/// Process-local permission store, mainly for tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemoryPermissions {
    state: Mutex<MemoryState>,
}

impl InMemoryPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes the next `times` updates of `sample` fail with `error`.
    pub fn fail_next(&self, sample: &SampleId, error: ServiceError, times: usize) {
        self.lock().failures.insert(sample.clone(), (error, times));
    }

    /// Makes every update of `sample` fail with `error`.
    pub fn fail_always(&self, sample: &SampleId, error: ServiceError) {
        self.fail_next(sample, error, usize::MAX);
    }

    pub fn acl(&self, sample: &SampleId) -> BTreeMap<String, AccessLevel> {
        self.lock().acls.get(sample).cloned().unwrap_or_default()
    }

    pub fn level_of(&self, sample: &SampleId, user: &str) -> Option<AccessLevel> {
        self.lock()
            .acls
            .get(sample)
            .and_then(|acl| acl.get(user).copied())
    }

    /// Number of update calls received, failed ones included.
    pub fn calls(&self) -> usize {
        self.lock().calls
    }
}

impl PermissionService for InMemoryPermissions {
    fn update_acls(
        &self,
        sample: &SampleId,
        payload: &AclPayload,
        _credential: &Credential,
        _timeout: Duration,
    ) -> Result<String, ServiceError> {
        let mut state = self.lock();
        state.calls += 1;
        if let Some((error, remaining)) = state.failures.get_mut(sample) {
            let error = error.clone();
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                state.failures.remove(sample);
            }
            return Err(error);
        }
        let changed = apply_payload(state.acls.entry(sample.clone()).or_default(), payload);
        Ok(if changed { STATUS_UPDATED } else { STATUS_UNCHANGED }.to_string())
    }
}
