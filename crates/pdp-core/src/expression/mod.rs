//! Expressions, function arguments and conditions
//!
//! Every expression evaluates to an [`ExpressionResult`]. Failures that the
//! XACML model can describe (type mismatches, missing attributes, unknown
//! functions) are `ExpressionResult::Error` values. `Err(EvaluationError)`
//! is reserved for collaborator faults; the first [`FunctionArgument`],
//! [`Condition`] or [`Match`](crate::Match) that sees one turns it into an
//! error status, so a fault degrades its node to Indeterminate exactly once.

mod apply;
mod argument;
mod condition;
mod result;

pub use apply::Apply;
pub use argument::{ArgumentExpression, ConvertedArgument, FunctionArgument};
pub use condition::Condition;
pub use result::ExpressionResult;

use crate::context::EvaluationContext;
use crate::defaults::PolicyDefaults;
use crate::error::Result;
use crate::identifier::Identifier;
use crate::registry::Registry;
use crate::status::Status;
use crate::value::AttributeValue;
use std::fmt;
use std::sync::Arc;

/// Attribute designator or selector
///
/// The internals of attribute retrieval live outside the core; the core only
/// asks for the resulting value or bag.
pub trait AttributeRetrieval: fmt::Debug + Send + Sync {
    /// Retrieve the attribute(s) for the current request
    ///
    /// # Errors
    ///
    /// Returns `EvaluationError` for faults that are not expressible as a status
    fn evaluate(
        &self,
        context: &dyn EvaluationContext,
        defaults: &PolicyDefaults,
    ) -> Result<ExpressionResult>;

    /// Structural validation
    ///
    /// # Errors
    ///
    /// Returns a syntax-error status describing the defect
    fn validate(&self) -> std::result::Result<(), Status> {
        Ok(())
    }
}

/// A named expression shared by every reference to it within a policy
#[derive(Debug)]
pub struct VariableDefinition {
    id: Identifier,
    expression: Expression,
}

impl VariableDefinition {
    /// Define a variable
    #[must_use]
    pub fn new(id: impl Into<Identifier>, expression: Expression) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            expression,
        })
    }

    /// Variable identifier
    #[must_use]
    pub fn id(&self) -> &Identifier {
        &self.id
    }

    /// The defining expression
    #[must_use]
    pub fn expression(&self) -> &Expression {
        &self.expression
    }
}

/// Evaluatable expression node
#[derive(Debug, Clone)]
pub enum Expression {
    /// Literal value
    Value(AttributeValue),
    /// Attribute designator or selector
    Retrieval(Arc<dyn AttributeRetrieval>),
    /// Function application
    Apply(Apply),
    /// Reference to a policy variable
    Variable(Arc<VariableDefinition>),
}

impl Expression {
    /// Literal value expression
    #[must_use]
    pub fn value(value: impl Into<AttributeValue>) -> Self {
        Self::Value(value.into())
    }

    /// Function application expression
    #[must_use]
    pub fn apply(function_id: impl Into<Identifier>, arguments: Vec<Expression>) -> Self {
        Self::Apply(Apply::new(function_id, arguments))
    }

    /// Attribute retrieval expression
    #[must_use]
    pub fn retrieval(retrieval: impl AttributeRetrieval + 'static) -> Self {
        Self::Retrieval(Arc::new(retrieval))
    }

    /// Variable reference expression
    #[must_use]
    pub fn variable(definition: &Arc<VariableDefinition>) -> Self {
        Self::Variable(Arc::clone(definition))
    }

    /// Evaluate the expression
    ///
    /// # Errors
    ///
    /// Propagates collaborator faults from attribute retrieval
    pub fn evaluate(
        &self,
        context: &dyn EvaluationContext,
        defaults: &PolicyDefaults,
    ) -> Result<ExpressionResult> {
        match self {
            Self::Value(value) => Ok(ExpressionResult::Single(value.clone())),
            Self::Retrieval(retrieval) => retrieval.evaluate(context, defaults),
            Self::Apply(apply) => apply.evaluate(context, defaults),
            Self::Variable(definition) => definition.expression.evaluate(context, defaults),
        }
    }

    /// Structural validation, resolving function identifiers against `registry`
    ///
    /// # Errors
    ///
    /// Returns a syntax-error status for the first defect found
    pub fn validate(&self, registry: &Registry) -> std::result::Result<(), Status> {
        match self {
            Self::Value(_) => Ok(()),
            Self::Retrieval(retrieval) => retrieval.validate(),
            Self::Apply(apply) => apply.validate(registry),
            Self::Variable(definition) => definition.expression.validate(registry),
        }
    }
}

impl From<AttributeValue> for Expression {
    fn from(value: AttributeValue) -> Self {
        Self::Value(value)
    }
}

impl From<Apply> for Expression {
    fn from(apply: Apply) -> Self {
        Self::Apply(apply)
    }
}
