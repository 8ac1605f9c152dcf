use super::{Expression, ExpressionResult};
use crate::context::EvaluationContext;
use crate::defaults::PolicyDefaults;
use crate::registry::Registry;
use crate::status::Status;
use crate::value::AttributeValue;

/// A rule condition: an expression that must produce a single boolean
#[derive(Debug, Clone)]
pub struct Condition {
    expression: Expression,
}

impl Condition {
    /// Wrap an expression as a condition
    #[must_use]
    pub const fn new(expression: Expression) -> Self {
        Self { expression }
    }

    /// The wrapped expression
    #[must_use]
    pub const fn expression(&self) -> &Expression {
        &self.expression
    }

    /// Evaluate the condition
    ///
    /// # Errors
    ///
    /// Returns the expression's error status, or a processing error if the
    /// expression returned a bag or a non-boolean value
    pub fn evaluate(
        &self,
        context: &dyn EvaluationContext,
        defaults: &PolicyDefaults,
    ) -> Result<bool, Status> {
        let result = self
            .expression
            .evaluate(context, defaults)
            .map_err(|err| Status::processing_error(err.to_string()))?;

        match result {
            ExpressionResult::Error(status) => Err(status),
            ExpressionResult::Bag(_) | ExpressionResult::EmptyBag => Err(
                Status::processing_error("Condition Expression returned a bag"),
            ),
            ExpressionResult::Single(AttributeValue::Boolean(value)) => Ok(value),
            ExpressionResult::Single(other) => Err(Status::processing_error(format!(
                "Condition Expression returned non-boolean {}",
                other.data_type()
            ))),
        }
    }

    /// Structural validation of the wrapped expression
    ///
    /// # Errors
    ///
    /// Returns the first syntax error found
    pub fn validate(&self, registry: &Registry) -> Result<(), Status> {
        self.expression.validate(registry)
    }
}

impl From<Expression> for Condition {
    fn from(expression: Expression) -> Self {
        Self::new(expression)
    }
}
