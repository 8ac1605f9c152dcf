//! Standard combining algorithms
//!
//! Every algorithm is generic over the element type, so one implementation
//! serves both rule combining (`Rule`) and policy combining (`PolicyNode`).
//! Each is registered twice, once under its rule-combining identifier and
//! once under its policy-combining identifier.
//!
//! Children are evaluated in order and only as far as needed: an
//! algorithm returns as soon as no later child can change the decision.

mod first_applicable;
mod only_one_applicable;
mod overrides;
mod unless;

pub use first_applicable::FirstApplicable;
pub use only_one_applicable::OnlyOneApplicable;
pub use overrides::Overrides;
pub use unless::Unless;

use pdp_core::{PolicyCombiningAlgorithm, RuleCombiningAlgorithm};
use std::sync::Arc;

/// Combining-algorithm identifiers
pub mod ids {
    /// Rule-combining deny-overrides
    pub const RULE_DENY_OVERRIDES: &str =
        "urn:oasis:names:tc:xacml:3.0:rule-combining-algorithm:deny-overrides";
    /// Rule-combining ordered-deny-overrides
    pub const RULE_ORDERED_DENY_OVERRIDES: &str =
        "urn:oasis:names:tc:xacml:3.0:rule-combining-algorithm:ordered-deny-overrides";
    /// Rule-combining permit-overrides
    pub const RULE_PERMIT_OVERRIDES: &str =
        "urn:oasis:names:tc:xacml:3.0:rule-combining-algorithm:permit-overrides";
    /// Rule-combining ordered-permit-overrides
    pub const RULE_ORDERED_PERMIT_OVERRIDES: &str =
        "urn:oasis:names:tc:xacml:3.0:rule-combining-algorithm:ordered-permit-overrides";
    /// Rule-combining first-applicable
    pub const RULE_FIRST_APPLICABLE: &str =
        "urn:oasis:names:tc:xacml:1.0:rule-combining-algorithm:first-applicable";
    /// Rule-combining deny-unless-permit
    pub const RULE_DENY_UNLESS_PERMIT: &str =
        "urn:oasis:names:tc:xacml:3.0:rule-combining-algorithm:deny-unless-permit";
    /// Rule-combining permit-unless-deny
    pub const RULE_PERMIT_UNLESS_DENY: &str =
        "urn:oasis:names:tc:xacml:3.0:rule-combining-algorithm:permit-unless-deny";

    /// Policy-combining deny-overrides
    pub const POLICY_DENY_OVERRIDES: &str =
        "urn:oasis:names:tc:xacml:3.0:policy-combining-algorithm:deny-overrides";
    /// Policy-combining ordered-deny-overrides
    pub const POLICY_ORDERED_DENY_OVERRIDES: &str =
        "urn:oasis:names:tc:xacml:3.0:policy-combining-algorithm:ordered-deny-overrides";
    /// Policy-combining permit-overrides
    pub const POLICY_PERMIT_OVERRIDES: &str =
        "urn:oasis:names:tc:xacml:3.0:policy-combining-algorithm:permit-overrides";
    /// Policy-combining ordered-permit-overrides
    pub const POLICY_ORDERED_PERMIT_OVERRIDES: &str =
        "urn:oasis:names:tc:xacml:3.0:policy-combining-algorithm:ordered-permit-overrides";
    /// Policy-combining first-applicable
    pub const POLICY_FIRST_APPLICABLE: &str =
        "urn:oasis:names:tc:xacml:1.0:policy-combining-algorithm:first-applicable";
    /// Policy-combining only-one-applicable
    pub const POLICY_ONLY_ONE_APPLICABLE: &str =
        "urn:oasis:names:tc:xacml:1.0:policy-combining-algorithm:only-one-applicable";
    /// Policy-combining deny-unless-permit
    pub const POLICY_DENY_UNLESS_PERMIT: &str =
        "urn:oasis:names:tc:xacml:3.0:policy-combining-algorithm:deny-unless-permit";
    /// Policy-combining permit-unless-deny
    pub const POLICY_PERMIT_UNLESS_DENY: &str =
        "urn:oasis:names:tc:xacml:3.0:policy-combining-algorithm:permit-unless-deny";
}

/// Every standard rule-combining algorithm
#[must_use]
pub fn standard_rule_algorithms() -> Vec<RuleCombiningAlgorithm> {
    vec![
        Arc::new(Overrides::deny(ids::RULE_DENY_OVERRIDES)),
        Arc::new(Overrides::deny(ids::RULE_ORDERED_DENY_OVERRIDES)),
        Arc::new(Overrides::permit(ids::RULE_PERMIT_OVERRIDES)),
        Arc::new(Overrides::permit(ids::RULE_ORDERED_PERMIT_OVERRIDES)),
        Arc::new(FirstApplicable::new(ids::RULE_FIRST_APPLICABLE)),
        Arc::new(Unless::deny_unless_permit(ids::RULE_DENY_UNLESS_PERMIT)),
        Arc::new(Unless::permit_unless_deny(ids::RULE_PERMIT_UNLESS_DENY)),
    ]
}

/// Every standard policy-combining algorithm
#[must_use]
pub fn standard_policy_algorithms() -> Vec<PolicyCombiningAlgorithm> {
    vec![
        Arc::new(Overrides::deny(ids::POLICY_DENY_OVERRIDES)),
        Arc::new(Overrides::deny(ids::POLICY_ORDERED_DENY_OVERRIDES)),
        Arc::new(Overrides::permit(ids::POLICY_PERMIT_OVERRIDES)),
        Arc::new(Overrides::permit(ids::POLICY_ORDERED_PERMIT_OVERRIDES)),
        Arc::new(FirstApplicable::new(ids::POLICY_FIRST_APPLICABLE)),
        Arc::new(OnlyOneApplicable::new(ids::POLICY_ONLY_ONE_APPLICABLE)),
        Arc::new(Unless::deny_unless_permit(ids::POLICY_DENY_UNLESS_PERMIT)),
        Arc::new(Unless::permit_unless_deny(ids::POLICY_PERMIT_UNLESS_DENY)),
    ]
}
