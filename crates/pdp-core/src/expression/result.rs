use crate::bag::Bag;
use crate::status::{Status, OK_STATUS};
use crate::value::AttributeValue;

/// Outcome of evaluating an expression
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionResult {
    /// Evaluation failed
    Error(Status),
    /// A single value
    Single(AttributeValue),
    /// A non-empty bag
    Bag(Bag),
    /// An empty bag
    EmptyBag,
}

impl ExpressionResult {
    /// Wrap a bag, normalizing empty bags to `EmptyBag`
    #[must_use]
    pub fn bag(bag: Bag) -> Self {
        if bag.is_empty() {
            Self::EmptyBag
        } else {
            Self::Bag(bag)
        }
    }

    /// Wrap a single boolean
    #[must_use]
    pub const fn boolean(value: bool) -> Self {
        Self::Single(AttributeValue::Boolean(value))
    }

    /// Create a processing-error result
    #[must_use]
    pub fn processing_error(message: impl Into<String>) -> Self {
        Self::Error(Status::processing_error(message))
    }

    /// The status: the error status, or Ok
    #[must_use]
    pub fn status(&self) -> &Status {
        match self {
            Self::Error(status) => status,
            _ => &OK_STATUS,
        }
    }

    /// Returns true unless this is an error
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        !matches!(self, Self::Error(_))
    }

    /// Returns true for bag results, empty or not
    #[must_use]
    pub const fn is_bag(&self) -> bool {
        matches!(self, Self::Bag(_) | Self::EmptyBag)
    }

    /// The single value, if this is a single-value result
    #[must_use]
    pub const fn value(&self) -> Option<&AttributeValue> {
        match self {
            Self::Single(value) => Some(value),
            _ => None,
        }
    }

    /// The bag, if this is a bag result
    #[must_use]
    pub fn get_bag(&self) -> Option<&Bag> {
        match self {
            Self::Bag(bag) => Some(bag),
            Self::EmptyBag => Some(Bag::empty()),
            _ => None,
        }
    }
}

impl From<AttributeValue> for ExpressionResult {
    fn from(value: AttributeValue) -> Self {
        Self::Single(value)
    }
}

impl From<Bag> for ExpressionResult {
    fn from(bag: Bag) -> Self {
        Self::bag(bag)
    }
}

impl From<Status> for ExpressionResult {
    fn from(status: Status) -> Self {
        Self::Error(status)
    }
}
