//! Attribute designator over the request

use pdp_core::{
    AttributeKey, AttributeRetrieval, DataType, EvaluationContext, ExpressionResult, Identifier,
    PolicyDefaults, Status,
};

/// Looks up an attribute bag by category, id, data type and optional issuer
///
/// The bag comes from [`EvaluationContext::get_attributes`]. An empty bag is
/// returned as is unless the designator requires the attribute, in which
/// case it becomes a MissingAttribute status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDesignator {
    key: AttributeKey,
    must_be_present: bool,
}

impl AttributeDesignator {
    /// Create a designator that tolerates missing attributes
    #[must_use]
    pub fn new(
        category: impl Into<Identifier>,
        attribute_id: impl Into<Identifier>,
        data_type: DataType,
    ) -> Self {
        Self {
            key: AttributeKey::new(category, attribute_id, data_type),
            must_be_present: false,
        }
    }

    /// Only accept values from this issuer
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.key.issuer = Some(issuer.into());
        self
    }

    /// Treat an empty bag as a missing attribute
    #[must_use]
    pub const fn must_be_present(mut self, must_be_present: bool) -> Self {
        self.must_be_present = must_be_present;
        self
    }

    /// The lookup key
    #[must_use]
    pub fn key(&self) -> &AttributeKey {
        &self.key
    }

    /// Whether an empty bag is an error
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.must_be_present
    }
}

impl AttributeRetrieval for AttributeDesignator {
    fn evaluate(
        &self,
        context: &dyn EvaluationContext,
        _defaults: &PolicyDefaults,
    ) -> pdp_core::Result<ExpressionResult> {
        let bag = match context.get_attributes(&self.key) {
            Ok(bag) => bag,
            Err(status) => return Ok(status.into()),
        };
        if bag.is_empty() && self.must_be_present {
            return Ok(Status::missing_attribute(format!(
                "Missing required attribute {} in category {}",
                self.key.attribute_id, self.key.category
            ))
            .into());
        }
        Ok(ExpressionResult::bag(bag))
    }

    fn validate(&self) -> Result<(), Status> {
        if self.key.category.is_empty() {
            return Err(Status::syntax_error("Missing Category in AttributeDesignator"));
        }
        if self.key.attribute_id.is_empty() {
            return Err(Status::syntax_error("Missing AttributeId in AttributeDesignator"));
        }
        Ok(())
    }
}
