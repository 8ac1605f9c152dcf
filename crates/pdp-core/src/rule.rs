//! Rules: the leaves of the decision tree

use crate::combining::Evaluatable;
use crate::context::{trace_result, EvaluationContext, NodeKind};
use crate::defaults::PolicyDefaults;
use crate::error::Result;
use crate::expression::Condition;
use crate::identifier::Identifier;
use crate::obligation::{AdviceExpression, ObligationExpression};
use crate::registry::Registry;
use crate::result::{Effect, EvaluationResult};
use crate::status::{validate_once, Status};
use crate::target::{MatchCode, MatchResult, Matchable, Target};
use crate::version::IdReference;
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace};

/// A rule: target, optional condition, effect and the directives to attach
///
/// Rules are normally created with [`RuleBuilder`](crate::RuleBuilder) and
/// then added to a policy, which points them at its defaults scope.
#[derive(Debug, Clone)]
pub struct Rule {
    pub(crate) id: Identifier,
    pub(crate) effect: Effect,
    pub(crate) description: Option<String>,
    pub(crate) target: Option<Target>,
    pub(crate) condition: Option<Condition>,
    pub(crate) obligation_expressions: Vec<ObligationExpression>,
    pub(crate) advice_expressions: Vec<AdviceExpression>,
    pub(crate) defaults: Arc<PolicyDefaults>,
    pub(crate) policy: Option<IdReference>,
    pub(crate) validated: OnceLock<Status>,
}

impl Rule {
    /// Create a rule that applies to everything
    #[must_use]
    pub fn new(id: impl Into<Identifier>, effect: Effect) -> Self {
        Self {
            id: id.into(),
            effect,
            description: None,
            target: None,
            condition: None,
            obligation_expressions: Vec::new(),
            advice_expressions: Vec::new(),
            defaults: Arc::default(),
            policy: None,
            validated: OnceLock::new(),
        }
    }

    /// Rule identifier
    #[must_use]
    pub fn id(&self) -> &Identifier {
        &self.id
    }

    /// The rule's effect
    #[must_use]
    pub const fn effect(&self) -> Effect {
        self.effect
    }

    /// Description, if any
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Target, if any
    #[must_use]
    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    /// Condition, if any
    #[must_use]
    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    /// Obligation expressions
    #[must_use]
    pub fn obligation_expressions(&self) -> &[ObligationExpression] {
        &self.obligation_expressions
    }

    /// Advice expressions
    #[must_use]
    pub fn advice_expressions(&self) -> &[AdviceExpression] {
        &self.advice_expressions
    }

    /// The defaults scope of the owning policy
    #[must_use]
    pub fn defaults(&self) -> &Arc<PolicyDefaults> {
        &self.defaults
    }

    /// Id and version of the owning policy
    #[must_use]
    pub fn policy(&self) -> Option<&IdReference> {
        self.policy.as_ref()
    }

    pub(crate) fn attach(&mut self, defaults: &Arc<PolicyDefaults>, owner: &IdReference) {
        self.defaults = Arc::clone(defaults);
        if let Some(target) = self.target.as_mut() {
            target.inherit_defaults(defaults);
        }
        self.policy = Some(owner.clone());
    }

    /// Structural validation, cached after the first call
    ///
    /// # Errors
    ///
    /// Returns the syntax-error status of the first defect
    pub fn validate(&self, registry: &Registry) -> std::result::Result<(), Status> {
        validate_once(&self.validated, || {
            if self.id.is_empty() {
                return Err(Status::syntax_error("Missing RuleId"));
            }
            if let Some(target) = &self.target {
                target.validate(registry)?;
            }
            if let Some(condition) = &self.condition {
                condition.validate(registry)?;
            }
            Ok(())
        })
    }

    fn evaluate_rule(&self, context: &dyn EvaluationContext) -> Result<EvaluationResult> {
        if let Err(status) = self.validate(context.registry()) {
            debug!(rule = %self.id, %status, "rule failed validation");
            return Ok(EvaluationResult::indeterminate(status));
        }

        let matched = self.match_request(context);
        match matched.code() {
            MatchCode::NoMatch => return Ok(EvaluationResult::not_applicable()),
            MatchCode::Indeterminate => {
                return Ok(EvaluationResult::indeterminate(matched.into_status()))
            }
            MatchCode::Match => {}
        }

        let defaults = self.defaults.or_root(context.root_defaults());
        if let Some(condition) = &self.condition {
            match condition.evaluate(context, defaults) {
                Ok(true) => {}
                Ok(false) => return Ok(EvaluationResult::not_applicable()),
                Err(status) => {
                    return Ok(EvaluationResult::indeterminate(
                        status.prefixed(self.id.short()),
                    ))
                }
            }
        }

        let decision = self.effect.decision();
        let mut result = EvaluationResult::from(self.effect);
        result.add_obligations(ObligationExpression::evaluate_all(
            context,
            defaults,
            decision,
            &self.obligation_expressions,
        )?);
        result.add_advice(AdviceExpression::evaluate_all(
            context,
            defaults,
            decision,
            &self.advice_expressions,
        )?);
        Ok(result)
    }
}

impl Matchable for Rule {
    fn match_request(&self, context: &dyn EvaluationContext) -> MatchResult {
        self.target
            .as_ref()
            .map_or_else(MatchResult::matched, |target| target.match_request(context))
    }
}

impl Evaluatable for Rule {
    fn id(&self) -> &Identifier {
        &self.id
    }

    fn evaluate(&self, context: &dyn EvaluationContext) -> Result<EvaluationResult> {
        let result = self.evaluate_rule(context)?;
        trace!(rule = %self.id, decision = ?result.decision(), "rule evaluated");
        trace_result(context, NodeKind::Rule, &self.id, &result);
        Ok(result)
    }

    fn declared_effect(&self) -> Option<Effect> {
        Some(self.effect)
    }
}
