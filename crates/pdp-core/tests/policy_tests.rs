//! Integration tests for policies, policy sets and id references

mod common;

use common::{
    scripted, FixedRetrieval, TestContext, XPathVersionRetrieval, FIRST_APPLICABLE, STRING_EQUAL,
};
use pdp_core::{
    AttributeValue, CombinerParameter, Decision, Effect, Evaluatable, Expression,
    IdReferenceMatch, Identifier, MatchCode, Matchable, NodeKind, ObligationExpression, Policy,
    PolicyBuilder, PolicyDefaults, PolicyNode, PolicySetBuilder, Request, StatusCode, Target,
    TargetedCombinerParameter, VersionMatch,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn policy(id: &str, version: &str, effect: Effect) -> Policy {
    PolicyBuilder::new(id)
        .version(version)
        .unwrap()
        .rule_combining_algorithm(FIRST_APPLICABLE)
        .add_rule_with(format!("{id}:rule"), |rule| rule.effect(effect))
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn test_policy_combines_rules_in_order() {
    let context = TestContext::new();
    let policy = PolicyBuilder::new("urn:test:policy")
        .rule_combining_algorithm(FIRST_APPLICABLE)
        .add_rule_with("urn:test:rule:skipped", |rule| {
            rule.permit().target(Target::single(scripted("nomatch")))
        })
        .unwrap()
        .add_rule_with("urn:test:rule:deny", |rule| rule.deny())
        .unwrap()
        .add_rule_with("urn:test:rule:permit", |rule| rule.permit())
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(policy.evaluate(&context).unwrap().decision(), Decision::Deny);
}

#[test]
fn test_unknown_rule_combining_algorithm() {
    let context = TestContext::new();
    let policy = PolicyBuilder::new("urn:test:policy")
        .rule_combining_algorithm("urn:test:combining-algorithm:nope")
        .build()
        .unwrap();
    let result = policy.evaluate(&context).unwrap();

    assert_eq!(result.decision(), Decision::Indeterminate);
    assert_eq!(result.status().code(), StatusCode::SyntaxError);
    assert!(result
        .status()
        .message()
        .is_some_and(|m| m.starts_with("Unknown RuleCombiningAlgorithm")));
}

#[test]
fn test_missing_rule_combining_algorithm() {
    let context = TestContext::new();
    let policy = PolicyBuilder::new("urn:test:policy").build().unwrap();
    let result = policy.evaluate(&context).unwrap();

    assert_eq!(result.decision(), Decision::Indeterminate);
    assert_eq!(result.status().message(), Some("Missing RuleCombiningAlgId"));
}

#[test]
fn test_policy_target_no_match_skips_rules() {
    let context = TestContext::new();
    let retrieval = FixedRetrieval::new(AttributeValue::Boolean(true));
    let calls = retrieval.calls();
    let policy = PolicyBuilder::new("urn:test:policy")
        .rule_combining_algorithm(FIRST_APPLICABLE)
        .target(Target::single(scripted("nomatch")))
        .add_rule_with("urn:test:rule", |rule| {
            rule.permit().condition(Expression::retrieval(retrieval))
        })
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(policy.evaluate(&context).unwrap().decision(), Decision::NotApplicable);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_policy_target_indeterminate() {
    let context = TestContext::new();
    let policy = PolicyBuilder::new("urn:test:policy")
        .rule_combining_algorithm(FIRST_APPLICABLE)
        .target(Target::single(scripted("unreachable source")))
        .build()
        .unwrap();
    let result = policy.evaluate(&context).unwrap();

    assert_eq!(result.decision(), Decision::Indeterminate);
    assert_eq!(result.status().message(), Some("scripted: unreachable source"));
}

#[test]
fn test_policy_obligations_and_identifiers() {
    let context = TestContext::with_request(Request::new().with_return_policy_id_list(true));
    let policy = PolicyBuilder::new("urn:test:policy")
        .version("3.1")
        .unwrap()
        .rule_combining_algorithm(FIRST_APPLICABLE)
        .add_rule_with("urn:test:rule", |rule| {
            rule.permit()
                .obligation(ObligationExpression::new("urn:test:obligation:rule", Effect::Permit))
        })
        .unwrap()
        .obligation(ObligationExpression::new("urn:test:obligation:policy", Effect::Permit))
        .obligation(ObligationExpression::new("urn:test:obligation:other", Effect::Deny))
        .build()
        .unwrap();
    let result = policy.evaluate(&context).unwrap();

    let obligations: Vec<_> = result.obligations().iter().map(|o| o.id().as_str()).collect();
    assert_eq!(
        obligations,
        vec!["urn:test:obligation:rule", "urn:test:obligation:policy"]
    );
    assert_eq!(result.policy_identifiers().len(), 1);
    assert_eq!(result.policy_identifiers()[0].id().as_str(), "urn:test:policy");
    assert_eq!(result.policy_identifiers()[0].version().to_string(), "3.1");
}

#[test]
fn test_policy_identifiers_only_when_requested() {
    let context = TestContext::new();
    let result = policy("urn:test:policy", "1.0", Effect::Permit)
        .evaluate(&context)
        .unwrap();
    assert!(result.policy_identifiers().is_empty());
}

#[test]
fn test_not_applicable_policy_is_not_decorated() {
    let context = TestContext::with_request(Request::new().with_return_policy_id_list(true));
    let policy = PolicyBuilder::new("urn:test:policy")
        .rule_combining_algorithm(FIRST_APPLICABLE)
        .obligation(ObligationExpression::from_parts(None, None))
        .build()
        .unwrap();
    let result = policy.evaluate(&context).unwrap();

    assert_eq!(result.decision(), Decision::NotApplicable);
    assert!(result.policy_identifiers().is_empty());
}

#[test]
fn test_policy_set_over_inline_policies() {
    let context = TestContext::with_request(Request::new().with_return_policy_id_list(true));
    let set = PolicySetBuilder::new("urn:test:set")
        .policy_combining_algorithm(FIRST_APPLICABLE)
        .policy(
            PolicyBuilder::new("urn:test:policy:empty")
                .rule_combining_algorithm(FIRST_APPLICABLE)
                .build()
                .unwrap(),
        )
        .policy(policy("urn:test:policy:deny", "1.0", Effect::Deny))
        .build()
        .unwrap();
    let result = set.evaluate(&context).unwrap();

    assert_eq!(result.decision(), Decision::Deny);
    assert_eq!(result.policy_identifiers()[0].id().as_str(), "urn:test:policy:deny");
    assert_eq!(result.policy_set_identifiers()[0].id().as_str(), "urn:test:set");
}

#[test]
fn test_unknown_policy_combining_algorithm() {
    let context = TestContext::new();
    let set = PolicySetBuilder::new("urn:test:set")
        .policy_combining_algorithm("urn:test:combining-algorithm:nope")
        .build()
        .unwrap();
    let result = set.evaluate(&context).unwrap();

    assert_eq!(result.decision(), Decision::Indeterminate);
    assert_eq!(result.status().code(), StatusCode::SyntaxError);
}

#[test]
fn test_policy_reference_resolves_once() {
    let target = Arc::new(policy("urn:test:policy:shared", "1.0", Effect::Permit));
    let context = TestContext::new().with_policy(target);
    let set = PolicySetBuilder::new("urn:test:set")
        .policy_combining_algorithm(FIRST_APPLICABLE)
        .policy_reference(IdReferenceMatch::new("urn:test:policy:shared"))
        .build()
        .unwrap();

    assert_eq!(set.evaluate(&context).unwrap().decision(), Decision::Permit);
    assert_eq!(set.evaluate(&context).unwrap().decision(), Decision::Permit);
    assert_eq!(context.lookups.get(), 1);
}

#[test]
fn test_unresolved_reference_is_indeterminate_and_retried() {
    let context = TestContext::new();
    let set = PolicySetBuilder::new("urn:test:set")
        .policy_combining_algorithm(FIRST_APPLICABLE)
        .policy_reference(IdReferenceMatch::new("urn:test:policy:missing"))
        .build()
        .unwrap();

    let result = set.evaluate(&context).unwrap();
    assert_eq!(result.decision(), Decision::Indeterminate);
    assert_eq!(result.status().code(), StatusCode::ProcessingError);
    assert_eq!(
        result.status().message(),
        Some("missing: No matching policy found for urn:test:policy:missing")
    );

    set.evaluate(&context).unwrap();
    assert_eq!(context.lookups.get(), 2);
}

#[test]
fn test_reference_honours_version_constraints() {
    let context = TestContext::new()
        .with_policy(Arc::new(policy("urn:test:policy", "1.0", Effect::Permit)))
        .with_policy(Arc::new(policy("urn:test:policy", "2.3", Effect::Deny)));
    let reference = PolicyNode::policy_reference(
        IdReferenceMatch::new("urn:test:policy").with_version(VersionMatch::parse("2.*").unwrap()),
    );

    assert_eq!(reference.evaluate(&context).unwrap().decision(), Decision::Deny);
}

#[test]
fn test_policy_set_reference() {
    let inner = PolicySetBuilder::new("urn:test:set:inner")
        .policy_combining_algorithm(FIRST_APPLICABLE)
        .policy(policy("urn:test:policy", "1.0", Effect::Deny))
        .build()
        .unwrap();
    let context = TestContext::new().with_policy_set(Arc::new(inner));
    let outer = PolicySetBuilder::new("urn:test:set:outer")
        .policy_combining_algorithm(FIRST_APPLICABLE)
        .policy_set_reference(IdReferenceMatch::new("urn:test:set:inner"))
        .build()
        .unwrap();

    assert_eq!(outer.evaluate(&context).unwrap().decision(), Decision::Deny);
}

#[test]
fn test_reference_match_delegates_to_target() {
    let target = PolicyBuilder::new("urn:test:policy")
        .rule_combining_algorithm(FIRST_APPLICABLE)
        .target(Target::single(scripted("nomatch")))
        .build()
        .unwrap();
    let context = TestContext::new().with_policy(Arc::new(target));

    let found = PolicyNode::policy_reference(IdReferenceMatch::new("urn:test:policy"));
    let missing = PolicyNode::policy_reference(IdReferenceMatch::new("urn:test:other"));
    assert_eq!(found.match_request(&context).code(), MatchCode::NoMatch);
    assert_eq!(missing.match_request(&context).code(), MatchCode::Indeterminate);
}

#[test]
fn test_nested_policy_sees_inherited_defaults() {
    let context = TestContext::new();
    let scope = Arc::new(PolicyDefaults::new(Some(Identifier::new("urn:test:xpath")), None));
    let set = PolicySetBuilder::new("urn:test:set")
        .policy_combining_algorithm(FIRST_APPLICABLE)
        .defaults(scope)
        .add_policy_with("urn:test:policy", |policy| {
            policy
                .rule_combining_algorithm(FIRST_APPLICABLE)
                .add_rule_with("urn:test:rule", |rule| {
                    rule.permit().condition(Expression::apply(
                        STRING_EQUAL,
                        vec![
                            Expression::value("urn:test:xpath"),
                            Expression::retrieval(XPathVersionRetrieval),
                        ],
                    ))
                })
        })
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(set.evaluate(&context).unwrap().decision(), Decision::Permit);
}

#[test]
fn test_rule_combiner_parameters_reach_their_rule() {
    let policy = PolicyBuilder::new("urn:test:policy")
        .rule_combining_algorithm(FIRST_APPLICABLE)
        .add_rule_with("urn:test:rule:a", |rule| rule.permit())
        .unwrap()
        .add_rule_with("urn:test:rule:b", |rule| rule.deny())
        .unwrap()
        .rule_combiner_parameter(TargetedCombinerParameter::new(
            "urn:test:rule:b",
            CombinerParameter::new("weight", AttributeValue::Integer(5)),
        ))
        .build()
        .unwrap();

    let elements = policy.combining_elements();
    assert!(elements[0].parameters().is_empty());
    assert_eq!(elements[1].parameters()[0].name(), "weight");
}

#[test]
fn test_trace_events_bubble_up() {
    let context = TestContext::new().tracing();
    policy("urn:test:policy", "1.0", Effect::Permit)
        .evaluate(&context)
        .unwrap();

    let kinds: Vec<_> = context.events.borrow().iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![NodeKind::Rule, NodeKind::Policy]);
}

#[test]
fn test_variable_definitions_replace() {
    let first = pdp_core::VariableDefinition::new("a", Expression::value(true));
    let second = pdp_core::VariableDefinition::new("b", Expression::value(false));
    let policy = PolicyBuilder::new("urn:test:policy")
        .variable(first)
        .variable_definitions(vec![second])
        .build()
        .unwrap();

    assert!(policy.variable("a").is_none());
    assert!(policy.variable("b").is_some());
}

fn referencing_set(id: &str, target: &str) -> Arc<pdp_core::PolicySet> {
    Arc::new(
        PolicySetBuilder::new(id)
            .policy_combining_algorithm(FIRST_APPLICABLE)
            .policy_set_reference(IdReferenceMatch::new(target))
            .build()
            .unwrap(),
    )
}

#[test]
fn test_circular_references_are_indeterminate() {
    common::init_tracing();
    let a = referencing_set("urn:test:set:a", "urn:test:set:b");
    let b = referencing_set("urn:test:set:b", "urn:test:set:a");
    let context = TestContext::new()
        .with_policy_set(Arc::clone(&a))
        .with_policy_set(b);

    for _ in 0..2 {
        let result = a.evaluate(&context).unwrap();
        assert_eq!(result.decision(), Decision::Indeterminate);
        assert_eq!(result.status().code(), StatusCode::ProcessingError);
        assert!(result
            .status()
            .message()
            .is_some_and(|m| m.contains("Circular reference to urn:test:set:b")));
    }
}

#[test]
fn test_repeated_sibling_references_are_not_circular() {
    let shared = Arc::new(
        PolicyBuilder::new("urn:test:policy:shared")
            .rule_combining_algorithm(FIRST_APPLICABLE)
            .build()
            .unwrap(),
    );
    let set = PolicySetBuilder::new("urn:test:set")
        .policy_combining_algorithm(FIRST_APPLICABLE)
        .policy_reference(IdReferenceMatch::new("urn:test:policy:shared"))
        .policy_reference(IdReferenceMatch::new("urn:test:policy:shared"))
        .build()
        .unwrap();
    let context = TestContext::new().with_policy(shared);

    let result = set.evaluate(&context).unwrap();
    assert_eq!(result.decision(), Decision::NotApplicable);
    assert!(result.status().is_ok());
}
