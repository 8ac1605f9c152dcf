//! Attribute assignments carried by obligations and advice

use crate::context::EvaluationContext;
use crate::defaults::PolicyDefaults;
use crate::expression::{Expression, ExpressionResult};
use crate::identifier::Identifier;
use crate::status::Status;
use crate::value::AttributeValue;
use serde::{Deserialize, Serialize};

/// One evaluated attribute assignment
///
/// `value` is `None` when the expression produced an empty bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeAssignment {
    attribute_id: Identifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<Identifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<AttributeValue>,
}

impl AttributeAssignment {
    /// Create an assignment
    #[must_use]
    pub fn new(
        attribute_id: impl Into<Identifier>,
        category: Option<Identifier>,
        issuer: Option<String>,
        value: Option<AttributeValue>,
    ) -> Self {
        Self {
            attribute_id: attribute_id.into(),
            category,
            issuer,
            value,
        }
    }

    /// Attribute identifier
    #[must_use]
    pub fn attribute_id(&self) -> &Identifier {
        &self.attribute_id
    }

    /// Category, if given
    #[must_use]
    pub fn category(&self) -> Option<&Identifier> {
        self.category.as_ref()
    }

    /// Issuer, if given
    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    /// Assigned value
    #[must_use]
    pub fn value(&self) -> Option<&AttributeValue> {
        self.value.as_ref()
    }
}

/// Outcome of evaluating an [`AttributeAssignmentExpression`]
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeAssignmentResult {
    status: Status,
    assignments: Vec<AttributeAssignment>,
}

impl AttributeAssignmentResult {
    fn ok(assignments: Vec<AttributeAssignment>) -> Self {
        Self {
            status: Status::OK,
            assignments,
        }
    }

    fn error(status: Status) -> Self {
        Self {
            status,
            assignments: Vec::new(),
        }
    }

    /// Status of the evaluation
    #[must_use]
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Returns true if the evaluation succeeded
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// The produced assignments
    #[must_use]
    pub fn assignments(&self) -> &[AttributeAssignment] {
        &self.assignments
    }

    /// Consume the result, returning the assignments
    #[must_use]
    pub fn into_assignments(self) -> Vec<AttributeAssignment> {
        self.assignments
    }
}

/// Expression producing attribute assignments for an obligation or advice
#[derive(Debug, Clone)]
pub struct AttributeAssignmentExpression {
    attribute_id: Option<Identifier>,
    category: Option<Identifier>,
    issuer: Option<String>,
    expression: Expression,
}

impl AttributeAssignmentExpression {
    /// Create an assignment expression
    #[must_use]
    pub fn new(attribute_id: impl Into<Identifier>, expression: Expression) -> Self {
        Self {
            attribute_id: Some(attribute_id.into()),
            category: None,
            issuer: None,
            expression,
        }
    }

    /// Create an assignment expression without an attribute id
    ///
    /// Evaluating it always fails with a syntax error.
    #[must_use]
    pub fn anonymous(expression: Expression) -> Self {
        Self {
            attribute_id: None,
            category: None,
            issuer: None,
            expression,
        }
    }

    /// Set the category
    #[must_use]
    pub fn with_category(mut self, category: impl Into<Identifier>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the issuer
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Attribute identifier
    #[must_use]
    pub fn attribute_id(&self) -> Option<&Identifier> {
        self.attribute_id.as_ref()
    }

    /// The value expression
    #[must_use]
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// Evaluate into zero or more assignments
    ///
    /// A single value yields one assignment, a bag one per element, an empty
    /// bag one assignment without a value.
    #[must_use]
    pub fn evaluate(
        &self,
        context: &dyn EvaluationContext,
        defaults: &PolicyDefaults,
    ) -> AttributeAssignmentResult {
        let Some(attribute_id) = &self.attribute_id else {
            return AttributeAssignmentResult::error(Status::syntax_error(
                "Missing AttributeId in AttributeAssignmentExpression",
            ));
        };
        let assignment = |value| {
            AttributeAssignment::new(
                attribute_id.clone(),
                self.category.clone(),
                self.issuer.clone(),
                value,
            )
        };

        match self.expression.evaluate(context, defaults) {
            Err(err) => AttributeAssignmentResult::error(Status::processing_error(err.to_string())),
            Ok(ExpressionResult::Error(status)) => AttributeAssignmentResult::error(status),
            Ok(ExpressionResult::Single(value)) => {
                AttributeAssignmentResult::ok(vec![assignment(Some(value))])
            }
            Ok(ExpressionResult::EmptyBag) => AttributeAssignmentResult::ok(vec![assignment(None)]),
            Ok(ExpressionResult::Bag(bag)) if bag.is_empty() => {
                AttributeAssignmentResult::ok(vec![assignment(None)])
            }
            Ok(ExpressionResult::Bag(bag)) => AttributeAssignmentResult::ok(
                bag.into_iter().map(|value| assignment(Some(value))).collect(),
            ),
        }
    }
}
