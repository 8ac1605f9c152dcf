//! Obligations and advice
//!
//! Both are directives attached to a Permit or Deny result. Their
//! expressions state which effect they apply to. Only the expressions whose
//! effect equals the decision are evaluated, in declaration order.

use crate::assignment::{AttributeAssignment, AttributeAssignmentExpression};
use crate::context::EvaluationContext;
use crate::defaults::PolicyDefaults;
use crate::error::{EvaluationError, Result};
use crate::identifier::Identifier;
use crate::result::{Decision, Effect};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// An obligation the PEP must fulfil
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obligation {
    id: Identifier,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    attribute_assignments: Vec<AttributeAssignment>,
}

impl Obligation {
    /// Create an obligation
    #[must_use]
    pub fn new(id: Identifier, attribute_assignments: Vec<AttributeAssignment>) -> Self {
        Self {
            id,
            attribute_assignments,
        }
    }

    /// Obligation identifier
    #[must_use]
    pub fn id(&self) -> &Identifier {
        &self.id
    }

    /// Attribute assignments
    #[must_use]
    pub fn attribute_assignments(&self) -> &[AttributeAssignment] {
        &self.attribute_assignments
    }
}

/// Advice the PEP may act upon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    id: Identifier,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    attribute_assignments: Vec<AttributeAssignment>,
}

impl Advice {
    /// Create advice
    #[must_use]
    pub fn new(id: Identifier, attribute_assignments: Vec<AttributeAssignment>) -> Self {
        Self {
            id,
            attribute_assignments,
        }
    }

    /// Advice identifier
    #[must_use]
    pub fn id(&self) -> &Identifier {
        &self.id
    }

    /// Attribute assignments
    #[must_use]
    pub fn attribute_assignments(&self) -> &[AttributeAssignment] {
        &self.attribute_assignments
    }
}

#[derive(Debug, Clone)]
struct DirectiveExpression {
    id: Option<Identifier>,
    effect: Option<Effect>,
    assignment_expressions: Vec<AttributeAssignmentExpression>,
}

impl DirectiveExpression {
    fn check(&self) -> std::result::Result<(&Identifier, Effect), &'static str> {
        match (&self.id, self.effect) {
            (None, _) => Err("missing id"),
            (Some(_), None) => Err("missing effect"),
            (Some(id), Some(effect)) => Ok((id, effect)),
        }
    }

    // Failed assignments are skipped, the rest are kept.
    fn assignments(
        &self,
        context: &dyn EvaluationContext,
        defaults: &PolicyDefaults,
    ) -> Vec<AttributeAssignment> {
        self.assignment_expressions
            .iter()
            .map(|expression| expression.evaluate(context, defaults))
            .filter(|result| result.is_ok())
            .flat_map(|result| result.into_assignments())
            .collect()
    }
}

fn evaluate_directives<'a, O>(
    context: &dyn EvaluationContext,
    defaults: &PolicyDefaults,
    decision: Decision,
    expressions: impl Iterator<Item = &'a DirectiveExpression> + Clone,
    kind: &'static str,
    invalid: fn(String) -> EvaluationError,
    make: fn(Identifier, Vec<AttributeAssignment>) -> O,
) -> Result<Vec<O>> {
    let Some(effect) = decision.effect() else {
        return Ok(Vec::new());
    };

    for expression in expressions.clone() {
        if let Err(reason) = expression.check() {
            let id = expression.id.as_ref().map_or("<none>", Identifier::as_str);
            warn!(kind, id, reason, "aborting evaluation on invalid expression");
            return Err(invalid(format!("{kind} {id}: {reason}")));
        }
    }

    Ok(expressions
        .filter_map(|expression| match expression.check() {
            Ok((id, fulfill_on)) if fulfill_on == effect => {
                Some(make(id.clone(), expression.assignments(context, defaults)))
            }
            _ => None,
        })
        .collect())
}

/// Declares an obligation to attach when the decision equals its effect
#[derive(Debug, Clone)]
pub struct ObligationExpression(DirectiveExpression);

impl ObligationExpression {
    /// Create an obligation expression
    #[must_use]
    pub fn new(id: impl Into<Identifier>, fulfill_on: Effect) -> Self {
        Self::from_parts(Some(id.into()), Some(fulfill_on))
    }

    /// Create an obligation expression from possibly missing parts
    ///
    /// Loaders use this for documents that omit required attributes;
    /// evaluating such an expression aborts the request.
    #[must_use]
    pub fn from_parts(id: Option<Identifier>, fulfill_on: Option<Effect>) -> Self {
        Self(DirectiveExpression {
            id,
            effect: fulfill_on,
            assignment_expressions: Vec::new(),
        })
    }

    /// Add an attribute assignment expression
    #[must_use]
    pub fn with_assignment(mut self, expression: AttributeAssignmentExpression) -> Self {
        self.0.assignment_expressions.push(expression);
        self
    }

    /// Obligation id
    #[must_use]
    pub fn id(&self) -> Option<&Identifier> {
        self.0.id.as_ref()
    }

    /// The effect this obligation applies to
    #[must_use]
    pub fn fulfill_on(&self) -> Option<Effect> {
        self.0.effect
    }

    /// Attribute assignment expressions
    #[must_use]
    pub fn assignment_expressions(&self) -> &[AttributeAssignmentExpression] {
        &self.0.assignment_expressions
    }

    /// Evaluate every expression applying to `decision`
    ///
    /// NotApplicable and Indeterminate yield nothing and validate nothing.
    /// For Permit and Deny every expression is validated first.
    ///
    /// # Errors
    ///
    /// Returns `EvaluationError::InvalidObligation` if any expression lacks
    /// its id or effect
    pub fn evaluate_all(
        context: &dyn EvaluationContext,
        defaults: &PolicyDefaults,
        decision: Decision,
        expressions: &[ObligationExpression],
    ) -> Result<Vec<Obligation>> {
        evaluate_directives(
            context,
            defaults,
            decision,
            expressions.iter().map(|e| &e.0),
            "ObligationExpression",
            EvaluationError::InvalidObligation,
            Obligation::new,
        )
    }
}

/// Declares advice to attach when the decision equals its effect
#[derive(Debug, Clone)]
pub struct AdviceExpression(DirectiveExpression);

impl AdviceExpression {
    /// Create an advice expression
    #[must_use]
    pub fn new(id: impl Into<Identifier>, applies_to: Effect) -> Self {
        Self::from_parts(Some(id.into()), Some(applies_to))
    }

    /// Create an advice expression from possibly missing parts
    #[must_use]
    pub fn from_parts(id: Option<Identifier>, applies_to: Option<Effect>) -> Self {
        Self(DirectiveExpression {
            id,
            effect: applies_to,
            assignment_expressions: Vec::new(),
        })
    }

    /// Add an attribute assignment expression
    #[must_use]
    pub fn with_assignment(mut self, expression: AttributeAssignmentExpression) -> Self {
        self.0.assignment_expressions.push(expression);
        self
    }

    /// Advice id
    #[must_use]
    pub fn id(&self) -> Option<&Identifier> {
        self.0.id.as_ref()
    }

    /// The effect this advice applies to
    #[must_use]
    pub fn applies_to(&self) -> Option<Effect> {
        self.0.effect
    }

    /// Attribute assignment expressions
    #[must_use]
    pub fn assignment_expressions(&self) -> &[AttributeAssignmentExpression] {
        &self.0.assignment_expressions
    }

    /// Evaluate every expression applying to `decision`
    ///
    /// NotApplicable and Indeterminate yield nothing and validate nothing.
    /// For Permit and Deny every expression is validated first.
    ///
    /// # Errors
    ///
    /// Returns `EvaluationError::InvalidAdvice` if any expression lacks its
    /// id or effect
    pub fn evaluate_all(
        context: &dyn EvaluationContext,
        defaults: &PolicyDefaults,
        decision: Decision,
        expressions: &[AdviceExpression],
    ) -> Result<Vec<Advice>> {
        evaluate_directives(
            context,
            defaults,
            decision,
            expressions.iter().map(|e| &e.0),
            "AdviceExpression",
            EvaluationError::InvalidAdvice,
            Advice::new,
        )
    }
}
