//! Integration tests for rule evaluation, conditions and obligations

mod common;

use common::{
    init_tracing, scripted, FailingRetrieval, FixedRetrieval, TestContext, STRING_EQUAL,
};
use pdp_core::{
    AdviceExpression, AttributeAssignmentExpression, AttributeValue, Decision, Effect,
    Evaluatable, EvaluationError, Expression, NodeKind, ObligationExpression, PolicyDefaults,
    RuleBuilder, StatusCode, Target, VariableDefinition,
};
use std::sync::atomic::Ordering;

#[test]
fn test_rule_without_target_or_condition_yields_effect() {
    let context = TestContext::new();
    let rule = RuleBuilder::new("urn:test:rule").deny().build().unwrap();
    let result = rule.evaluate(&context).unwrap();

    assert_eq!(result.decision(), Decision::Deny);
    assert!(result.status().is_ok());
    assert!(result.obligations().is_empty());
}

#[test]
fn test_rule_target_no_match_is_not_applicable() {
    let context = TestContext::new();
    let rule = RuleBuilder::new("urn:test:rule")
        .permit()
        .target(Target::single(scripted("nomatch")))
        .build()
        .unwrap();
    let result = rule.evaluate(&context).unwrap();

    assert_eq!(result.decision(), Decision::NotApplicable);
    assert!(result.status().is_ok());
}

#[test]
fn test_rule_target_indeterminate_carries_status() {
    let context = TestContext::new();
    let rule = RuleBuilder::new("urn:test:rule")
        .permit()
        .target(Target::single(scripted("target broke")))
        .build()
        .unwrap();
    let result = rule.evaluate(&context).unwrap();

    assert_eq!(result.decision(), Decision::Indeterminate);
    assert_eq!(result.status().message(), Some("scripted: target broke"));
}

#[test]
fn test_rule_condition_true_and_false() {
    let context = TestContext::new();
    let allowed = RuleBuilder::new("urn:test:rule:true")
        .permit()
        .condition(Expression::value(true))
        .build()
        .unwrap();
    let skipped = RuleBuilder::new("urn:test:rule:false")
        .permit()
        .condition(Expression::value(false))
        .build()
        .unwrap();

    assert_eq!(allowed.evaluate(&context).unwrap().decision(), Decision::Permit);
    assert_eq!(skipped.evaluate(&context).unwrap().decision(), Decision::NotApplicable);
}

#[test]
fn test_rule_condition_applies_function() {
    let context = TestContext::new();
    let rule = RuleBuilder::new("urn:test:rule")
        .permit()
        .condition(Expression::apply(
            STRING_EQUAL,
            vec![
                Expression::value("alice"),
                Expression::retrieval(FixedRetrieval::string("alice")),
            ],
        ))
        .build()
        .unwrap();

    assert_eq!(rule.evaluate(&context).unwrap().decision(), Decision::Permit);
}

#[test]
fn test_condition_returning_bag_is_indeterminate() {
    let context = TestContext::new();
    let rule = RuleBuilder::new("urn:test:rule")
        .permit()
        .condition(Expression::retrieval(FixedRetrieval::strings(&["a", "b"])))
        .build()
        .unwrap();
    let result = rule.evaluate(&context).unwrap();

    assert_eq!(result.decision(), Decision::Indeterminate);
    assert_eq!(result.status().code(), StatusCode::ProcessingError);
    assert!(result
        .status()
        .message()
        .is_some_and(|m| m.contains("returned a bag")));
}

#[test]
fn test_condition_returning_non_boolean_is_indeterminate() {
    let context = TestContext::new();
    let rule = RuleBuilder::new("urn:test:rule")
        .permit()
        .condition(Expression::value(AttributeValue::Integer(3)))
        .build()
        .unwrap();
    let result = rule.evaluate(&context).unwrap();

    assert_eq!(result.decision(), Decision::Indeterminate);
    assert_eq!(
        result.status().message(),
        Some("rule: Condition Expression returned non-boolean integer")
    );
}

#[test]
fn test_condition_retrieval_fault_is_indeterminate() {
    let context = TestContext::new();
    let rule = RuleBuilder::new("urn:test:rule")
        .deny()
        .condition(Expression::retrieval(FailingRetrieval))
        .build()
        .unwrap();
    let result = rule.evaluate(&context).unwrap();

    assert_eq!(result.decision(), Decision::Indeterminate);
    assert_eq!(result.status().code(), StatusCode::ProcessingError);
}

#[test]
fn test_unknown_condition_function_fails_validation() {
    let context = TestContext::new();
    let rule = RuleBuilder::new("urn:test:rule")
        .permit()
        .condition(Expression::apply("urn:test:function:nope", vec![]))
        .build()
        .unwrap();

    for _ in 0..2 {
        let result = rule.evaluate(&context).unwrap();
        assert_eq!(result.decision(), Decision::Indeterminate);
        assert_eq!(result.status().code(), StatusCode::SyntaxError);
    }
}

#[test]
fn test_condition_through_variable() {
    let context = TestContext::new();
    let is_alice = VariableDefinition::new(
        "is-alice",
        Expression::apply(
            STRING_EQUAL,
            vec![
                Expression::value("alice"),
                Expression::retrieval(FixedRetrieval::string("alice")),
            ],
        ),
    );
    let rule = RuleBuilder::new("urn:test:rule")
        .permit()
        .condition(Expression::variable(&is_alice))
        .build()
        .unwrap();

    assert_eq!(rule.evaluate(&context).unwrap().decision(), Decision::Permit);
}

#[test]
fn test_deny_rule_with_false_condition_never_evaluates_obligations() {
    let context = TestContext::new();
    let retrieval = FixedRetrieval::string("logged");
    let calls = retrieval.calls();
    let rule = RuleBuilder::new("urn:test:rule")
        .deny()
        .target(Target::single(scripted("match")))
        .condition(Expression::value(false))
        .obligation(
            ObligationExpression::new("urn:test:obligation:log", Effect::Deny).with_assignment(
                AttributeAssignmentExpression::new(
                    "urn:test:attribute:message",
                    Expression::retrieval(retrieval),
                ),
            ),
        )
        .build()
        .unwrap();
    let result = rule.evaluate(&context).unwrap();

    assert_eq!(result.decision(), Decision::NotApplicable);
    assert!(result.obligations().is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_only_matching_obligations_and_advice_are_attached() {
    let context = TestContext::new();
    let rule = RuleBuilder::new("urn:test:rule")
        .permit()
        .obligation(ObligationExpression::new("urn:test:obligation:on-permit", Effect::Permit))
        .obligation(ObligationExpression::new("urn:test:obligation:on-deny", Effect::Deny))
        .advice(AdviceExpression::new("urn:test:advice:on-deny", Effect::Deny))
        .advice(AdviceExpression::new("urn:test:advice:on-permit", Effect::Permit))
        .build()
        .unwrap();
    let result = rule.evaluate(&context).unwrap();

    let obligations: Vec<_> = result.obligations().iter().map(|o| o.id().as_str()).collect();
    let advice: Vec<_> = result.advice().iter().map(|a| a.id().as_str()).collect();
    assert_eq!(obligations, vec!["urn:test:obligation:on-permit"]);
    assert_eq!(advice, vec!["urn:test:advice:on-permit"]);
}

#[test]
fn test_obligation_assignments() {
    let context = TestContext::new();
    let obligation = ObligationExpression::new("urn:test:obligation:notify", Effect::Permit)
        .with_assignment(
            AttributeAssignmentExpression::new(
                "urn:test:attribute:to",
                Expression::retrieval(FixedRetrieval::strings(&["alice", "bob"])),
            )
            .with_category("urn:test:category:recipient"),
        )
        .with_assignment(AttributeAssignmentExpression::new(
            "urn:test:attribute:cc",
            Expression::retrieval(FixedRetrieval::new(pdp_core::ExpressionResult::EmptyBag)),
        ))
        .with_assignment(AttributeAssignmentExpression::new(
            "urn:test:attribute:broken",
            Expression::retrieval(FailingRetrieval),
        ))
        .with_assignment(AttributeAssignmentExpression::anonymous(Expression::value("x")));
    let rule = RuleBuilder::new("urn:test:rule")
        .permit()
        .obligation(obligation)
        .build()
        .unwrap();
    let result = rule.evaluate(&context).unwrap();

    let assignments = result.obligations()[0].attribute_assignments();
    assert_eq!(assignments.len(), 3);
    assert_eq!(assignments[0].value(), Some(&AttributeValue::string("alice")));
    assert_eq!(assignments[1].value(), Some(&AttributeValue::string("bob")));
    assert_eq!(
        assignments[0].category().map(|c| c.as_str()),
        Some("urn:test:category:recipient")
    );
    assert_eq!(assignments[2].attribute_id().as_str(), "urn:test:attribute:cc");
    assert_eq!(assignments[2].value(), None);
}

#[test]
fn test_invalid_obligation_aborts_evaluation() {
    init_tracing();
    let context = TestContext::new();
    let rule = RuleBuilder::new("urn:test:rule")
        .permit()
        .obligation(ObligationExpression::from_parts(
            Some("urn:test:obligation:incomplete".into()),
            None,
        ))
        .build()
        .unwrap();

    let err = rule.evaluate(&context).unwrap_err();
    assert!(matches!(err, EvaluationError::InvalidObligation(_)));
}

#[test]
fn test_invalid_advice_aborts_evaluation() {
    let context = TestContext::new();
    let rule = RuleBuilder::new("urn:test:rule")
        .deny()
        .advice(AdviceExpression::from_parts(None, Some(Effect::Deny)))
        .build()
        .unwrap();

    let err = rule.evaluate(&context).unwrap_err();
    assert!(matches!(err, EvaluationError::InvalidAdvice(_)));
}

#[test]
fn test_invalid_obligation_ignored_when_not_applicable() {
    let context = TestContext::new();
    let rule = RuleBuilder::new("urn:test:rule")
        .permit()
        .condition(Expression::value(false))
        .obligation(ObligationExpression::from_parts(None, None))
        .build()
        .unwrap();

    assert_eq!(rule.evaluate(&context).unwrap().decision(), Decision::NotApplicable);
}

#[test]
fn test_non_decisive_decisions_skip_directive_validation() {
    let context = TestContext::new();
    let defaults = PolicyDefaults::default();
    let obligations = [ObligationExpression::from_parts(None, Some(Effect::Permit))];
    let advice = [AdviceExpression::from_parts(
        Some("urn:test:advice:incomplete".into()),
        None,
    )];

    for decision in [Decision::NotApplicable, Decision::Indeterminate] {
        let attached =
            ObligationExpression::evaluate_all(&context, &defaults, decision, &obligations);
        assert!(attached.unwrap().is_empty());
        let attached = AdviceExpression::evaluate_all(&context, &defaults, decision, &advice);
        assert!(attached.unwrap().is_empty());
    }

    assert!(matches!(
        ObligationExpression::evaluate_all(&context, &defaults, Decision::Deny, &obligations),
        Err(EvaluationError::InvalidObligation(_))
    ));
}

#[test]
fn test_rule_emits_trace_event() {
    init_tracing();
    let context = TestContext::new().tracing();
    let rule = RuleBuilder::new("urn:test:rule").permit().build().unwrap();
    rule.evaluate(&context).unwrap();

    let events = context.events.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, NodeKind::Rule);
    assert_eq!(events[0].id.as_str(), "urn:test:rule");
    assert_eq!(events[0].message, "Permit");
}

#[test]
fn test_rule_declares_effect() {
    let rule = RuleBuilder::new("urn:test:rule").deny().build().unwrap();
    assert_eq!(rule.declared_effect(), Some(Effect::Deny));
}
