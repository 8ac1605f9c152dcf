//! Shared fixtures: rules with a scripted outcome and a counting retrieval

#![allow(dead_code)]

use pdp_core::{
    AttributeRetrieval, AttributeValue, Decision, EvaluationContext, EvaluationResult,
    Expression, ExpressionResult, ObligationExpression, Policy, PolicyBuilder, PolicyDefaults,
    Request, Rule, RuleBuilder,
};
use pdp_std::Pdp;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// What a generated rule evaluates to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Permit,
    Deny,
    NotApplicable,
    /// A Permit rule whose condition fails
    BrokenPermit,
    /// A Deny rule whose condition fails
    BrokenDeny,
}

/// Retrieval returning `true`, counting how often it ran
#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl AttributeRetrieval for Counter {
    fn evaluate(
        &self,
        _context: &dyn EvaluationContext,
        _defaults: &PolicyDefaults,
    ) -> pdp_core::Result<ExpressionResult> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(ExpressionResult::boolean(true))
    }
}

pub fn rule(index: usize, outcome: Outcome) -> Rule {
    let builder = RuleBuilder::new(format!("urn:test:rule:{index}"));
    let builder = match outcome {
        Outcome::Permit => builder.permit(),
        Outcome::Deny => builder.deny(),
        Outcome::NotApplicable => builder.permit().condition(Expression::value(false)),
        Outcome::BrokenPermit => builder
            .permit()
            .condition(Expression::value(AttributeValue::Integer(index as i64))),
        Outcome::BrokenDeny => builder
            .deny()
            .condition(Expression::value(AttributeValue::Integer(index as i64))),
    };
    builder.build().unwrap()
}

/// A rule whose condition counts its evaluations
pub fn counted_rule(id: &str, deny: bool, counter: &Counter) -> Rule {
    let builder = RuleBuilder::new(id);
    let builder = if deny { builder.deny() } else { builder.permit() };
    builder
        .condition(Expression::retrieval(counter.clone()))
        .build()
        .unwrap()
}

/// A rule with one obligation fulfilled on its own effect
pub fn rule_with_obligation(id: &str, outcome: Outcome, obligation: &str) -> Rule {
    let effect = match outcome {
        Outcome::Deny | Outcome::BrokenDeny => pdp_core::Effect::Deny,
        _ => pdp_core::Effect::Permit,
    };
    RuleBuilder::new(id)
        .effect(effect)
        .obligation(ObligationExpression::new(obligation, effect))
        .build()
        .unwrap()
}

pub fn policy_of(id: &str, algorithm: &str, rules: Vec<Rule>) -> Policy {
    rules
        .into_iter()
        .fold(
            PolicyBuilder::new(id).rule_combining_algorithm(algorithm),
            PolicyBuilder::rule,
        )
        .build()
        .unwrap()
}

pub fn policy(algorithm: &str, outcomes: &[Outcome]) -> Policy {
    policy_of(
        "urn:test:policy",
        algorithm,
        outcomes
            .iter()
            .enumerate()
            .map(|(index, outcome)| rule(index, *outcome))
            .collect(),
    )
}

pub fn evaluate(policy: Policy) -> EvaluationResult {
    Pdp::new(policy).evaluate(Request::new()).unwrap()
}

pub fn decide(algorithm: &str, outcomes: &[Outcome]) -> Decision {
    evaluate(policy(algorithm, outcomes)).decision()
}
