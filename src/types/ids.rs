//! Deterministic UUIDv5 identifier for bootstrap runs.
//!
//! The UUID namespace is derived from a stable tag (`NS_TAG`) so that the
//! `bootstrap_id` is reproducible across runs for the same effective policy;
//! the per-run `run_id` (UUIDv4) distinguishes individual executions.
use uuid::Uuid;

use crate::constants::NS_TAG;
use crate::policy::Policy;

fn namespace() -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, NS_TAG.as_bytes())
}

/// Compute a deterministic UUIDv5 for a bootstrap run from the externally
/// visible bits of the policy: the target service and the two resource paths.
#[must_use]
pub fn bootstrap_id(policy: &Policy) -> Uuid {
    let s = format!(
        "B:{}:{}:{}",
        policy.service.name,
        policy.flag.path.display(),
        policy.service.marker_path.display(),
    );
    Uuid::new_v5(&namespace(), s.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_policy_same_id() {
        let a = Policy::default();
        let b = Policy::default();
        assert_eq!(bootstrap_id(&a), bootstrap_id(&b));
    }

    #[test]
    fn different_service_different_id() {
        let a = Policy::default();
        let mut b = Policy::default();
        b.service.name = "other-svc".into();
        assert_ne!(bootstrap_id(&a), bootstrap_id(&b));
    }
}
