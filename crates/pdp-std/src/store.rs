//! In-memory policy store backing id references

use pdp_core::{IdReferenceMatch, Policy, PolicyNode, PolicySet, Status};
use std::sync::Arc;

/// Policies and policy sets that references may resolve to
///
/// Built once and shared behind an `Arc`; lookups never lock. Several
/// versions of the same identifier may be stored side by side, and a
/// lookup picks the greatest version the reference accepts.
#[derive(Debug, Clone, Default)]
pub struct PolicyStore {
    policies: Vec<Arc<Policy>>,
    policy_sets: Vec<Arc<PolicySet>>,
}

impl PolicyStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a policy
    #[must_use]
    pub fn with_policy(mut self, policy: impl Into<Arc<Policy>>) -> Self {
        self.insert_policy(policy);
        self
    }

    /// Add a policy set
    #[must_use]
    pub fn with_policy_set(mut self, policy_set: impl Into<Arc<PolicySet>>) -> Self {
        self.insert_policy_set(policy_set);
        self
    }

    /// Add a policy
    pub fn insert_policy(&mut self, policy: impl Into<Arc<Policy>>) {
        self.policies.push(policy.into());
    }

    /// Add a policy set
    pub fn insert_policy_set(&mut self, policy_set: impl Into<Arc<PolicySet>>) {
        self.policy_sets.push(policy_set.into());
    }

    /// Add an inline policy or policy set; references are ignored
    pub fn insert(&mut self, node: PolicyNode) {
        match node {
            PolicyNode::Policy(policy) => self.insert_policy(policy),
            PolicyNode::PolicySet(policy_set) => self.insert_policy_set(policy_set),
            PolicyNode::PolicyReference(_) | PolicyNode::PolicySetReference(_) => {}
        }
    }

    /// Number of stored policies and policy sets
    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len() + self.policy_sets.len()
    }

    /// Returns true if nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The newest policy accepted by `id_match`
    ///
    /// # Errors
    ///
    /// Returns a processing-error status when no stored policy matches
    pub fn find_policy(&self, id_match: &IdReferenceMatch) -> Result<Arc<Policy>, Status> {
        self.policies
            .iter()
            .filter(|policy| id_match.matches(policy.id(), policy.version()))
            .max_by(|a, b| a.version().cmp(b.version()))
            .cloned()
            .ok_or_else(|| {
                Status::processing_error(format!("No matching policy found for {id_match}"))
            })
    }

    /// The newest policy set accepted by `id_match`
    ///
    /// # Errors
    ///
    /// Returns a processing-error status when no stored policy set matches
    pub fn find_policy_set(&self, id_match: &IdReferenceMatch) -> Result<Arc<PolicySet>, Status> {
        self.policy_sets
            .iter()
            .filter(|policy_set| id_match.matches(policy_set.id(), policy_set.version()))
            .max_by(|a, b| a.version().cmp(b.version()))
            .cloned()
            .ok_or_else(|| {
                Status::processing_error(format!("No matching policy set found for {id_match}"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdp_core::{PolicyBuilder, VersionMatch};

    fn policy(id: &str, version: &str) -> Policy {
        PolicyBuilder::new(id)
            .version(version)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_picks_greatest_matching_version() {
        let store = PolicyStore::new()
            .with_policy(policy("urn:test:p", "1.0"))
            .with_policy(policy("urn:test:p", "2.1"))
            .with_policy(policy("urn:test:p", "1.5"))
            .with_policy(policy("urn:test:other", "9.0"));

        let any = store.find_policy(&IdReferenceMatch::new("urn:test:p")).unwrap();
        assert_eq!(any.version().to_string(), "2.1");

        let capped = store
            .find_policy(
                &IdReferenceMatch::new("urn:test:p")
                    .with_latest_version(VersionMatch::parse("1.*").unwrap()),
            )
            .unwrap();
        assert_eq!(capped.version().to_string(), "1.5");
    }

    #[test]
    fn test_no_match() {
        let store = PolicyStore::new().with_policy(policy("urn:test:p", "1.0"));
        let status = store
            .find_policy(&IdReferenceMatch::new("urn:test:missing"))
            .unwrap_err();
        assert!(status
            .message()
            .is_some_and(|m| m.starts_with("No matching policy found for urn:test:missing")));
        assert!(store
            .find_policy_set(&IdReferenceMatch::new("urn:test:p"))
            .is_err());
    }
}
