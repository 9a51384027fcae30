use std::time::Duration;

use proptest::prelude::*;
use sample_acl::{InMemoryPermissions, ReconcileOptions, STATUS_UNCHANGED, reconcile};
use sample_model::{AccessLevel, AclRequest, Credential, SampleId, SampleRecord, SampleSet};

fn sample_set(n: usize) -> SampleSet {
    let samples = (0..n)
        .map(|i| SampleRecord::new(SampleId::generate(), format!("S{i}")))
        .collect();
    SampleSet::new("wells", "", samples)
}

fn level() -> impl Strategy<Value = AccessLevel> {
    prop_oneof![
        Just(AccessLevel::Reader),
        Just(AccessLevel::Writer),
        Just(AccessLevel::Admin),
    ]
}

proptest! {
    #[test]
    fn reconciling_twice_changes_nothing(
        grants in proptest::collection::vec(("[a-e]", level()), 1..8),
        samples in 1usize..5,
    ) {
        let set = sample_set(samples);
        let mut request = AclRequest::new();
        for (user, level) in &grants {
            request.insert(*level, user.clone());
        }
        let service = InMemoryPermissions::new();
        let options = ReconcileOptions { retry_delay: Duration::ZERO, ..ReconcileOptions::default() };
        let credential = Credential::new("token");

        reconcile(&set, &request, &service, &credential, &options).unwrap();
        let before: Vec<_> = set.sample_ids().map(|id| service.acl(id)).collect();

        let second = reconcile(&set, &request, &service, &credential, &options).unwrap();
        let after: Vec<_> = set.sample_ids().map(|id| service.acl(id)).collect();

        prop_assert_eq!(before, after);
        for status in second.samples.values() {
            prop_assert!(
                matches!(status, sample_acl::SampleStatus::Applied { status, .. } if status == STATUS_UNCHANGED),
                "{:?}",
                status
            );
        }
    }
}
