//! Property-based tests for the standard rule-combining algorithms
//!
//! Invariants checked for arbitrary rule sequences:
//!
//! 1. deny-overrides: Deny wins, an Indeterminate Deny rule blocks Permit,
//!    an Indeterminate Permit rule only counts when nothing else applies
//! 2. permit-overrides is the dual of deny-overrides
//! 3. first-applicable returns the first rule that is not NotApplicable
//! 4. the unless algorithms are always decisive
//! 5. the ordered variants decide exactly like the plain ones

mod common;

use common::{decide, Outcome};
use pdp_core::Decision;
use pdp_std::combining::ids;
use proptest::prelude::*;

fn outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        Just(Outcome::Permit),
        Just(Outcome::Deny),
        Just(Outcome::NotApplicable),
        Just(Outcome::BrokenPermit),
        Just(Outcome::BrokenDeny),
    ]
}

fn outcomes() -> impl Strategy<Value = Vec<Outcome>> {
    prop::collection::vec(outcome(), 0..8)
}

fn decision_of(outcome: Outcome) -> Decision {
    match outcome {
        Outcome::Permit => Decision::Permit,
        Outcome::Deny => Decision::Deny,
        Outcome::NotApplicable => Decision::NotApplicable,
        Outcome::BrokenPermit | Outcome::BrokenDeny => Decision::Indeterminate,
    }
}

/// Expected result of an overrides algorithm, `winner` being the overriding
/// outcome and `winner_broken` its failing counterpart
fn overrides(
    outcomes: &[Outcome],
    winner: Outcome,
    winner_broken: Outcome,
    loser: Outcome,
) -> Decision {
    if outcomes.contains(&winner) {
        decision_of(winner)
    } else if outcomes.contains(&winner_broken) {
        Decision::Indeterminate
    } else if outcomes.contains(&loser) {
        decision_of(loser)
    } else if outcomes.iter().any(|o| decision_of(*o) == Decision::Indeterminate) {
        Decision::Indeterminate
    } else {
        Decision::NotApplicable
    }
}

// ============================================================================
// PROPERTY 1: deny-overrides
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_deny_overrides(outcomes in outcomes()) {
        let expected = overrides(&outcomes, Outcome::Deny, Outcome::BrokenDeny, Outcome::Permit);
        prop_assert_eq!(decide(ids::RULE_DENY_OVERRIDES, &outcomes), expected);
    }
}

// ============================================================================
// PROPERTY 2: permit-overrides
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_permit_overrides(outcomes in outcomes()) {
        let expected =
            overrides(&outcomes, Outcome::Permit, Outcome::BrokenPermit, Outcome::Deny);
        prop_assert_eq!(decide(ids::RULE_PERMIT_OVERRIDES, &outcomes), expected);
    }
}

// ============================================================================
// PROPERTY 3: first-applicable
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_first_applicable(outcomes in outcomes()) {
        let expected = outcomes
            .iter()
            .map(|o| decision_of(*o))
            .find(|d| *d != Decision::NotApplicable)
            .unwrap_or(Decision::NotApplicable);
        prop_assert_eq!(decide(ids::RULE_FIRST_APPLICABLE, &outcomes), expected);
    }
}

// ============================================================================
// PROPERTY 4: deny-unless-permit / permit-unless-deny
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_unless_algorithms(outcomes in outcomes()) {
        let deny_unless = if outcomes.contains(&Outcome::Permit) {
            Decision::Permit
        } else {
            Decision::Deny
        };
        let permit_unless = if outcomes.contains(&Outcome::Deny) {
            Decision::Deny
        } else {
            Decision::Permit
        };
        prop_assert_eq!(decide(ids::RULE_DENY_UNLESS_PERMIT, &outcomes), deny_unless);
        prop_assert_eq!(decide(ids::RULE_PERMIT_UNLESS_DENY, &outcomes), permit_unless);
    }
}

// ============================================================================
// PROPERTY 5: ordered variants
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_ordered_variants_match(outcomes in outcomes()) {
        prop_assert_eq!(
            decide(ids::RULE_ORDERED_DENY_OVERRIDES, &outcomes),
            decide(ids::RULE_DENY_OVERRIDES, &outcomes)
        );
        prop_assert_eq!(
            decide(ids::RULE_ORDERED_PERMIT_OVERRIDES, &outcomes),
            decide(ids::RULE_PERMIT_OVERRIDES, &outcomes)
        );
    }
}
