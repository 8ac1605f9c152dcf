//! Bags of attribute values

use crate::value::{AttributeValue, DataType};
use serde::{Deserialize, Serialize};

/// Ordered multiset of attribute values
///
/// Bags may be empty. [`Bag::empty`] returns a shared immutable empty bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bag {
    values: Vec<AttributeValue>,
}

static EMPTY_BAG: Bag = Bag { values: Vec::new() };

impl Bag {
    /// Create a new empty bag
    #[must_use]
    pub const fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// The shared empty bag
    #[must_use]
    pub fn empty() -> &'static Bag {
        &EMPTY_BAG
    }

    /// Add a value to the bag
    pub fn push(&mut self, value: AttributeValue) {
        self.values.push(value);
    }

    /// Number of values in the bag
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the bag has no values
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the values in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, AttributeValue> {
        self.values.iter()
    }

    /// Get the values as a slice
    #[must_use]
    pub fn values(&self) -> &[AttributeValue] {
        &self.values
    }

    /// Data type of the bag's first value, if any
    #[must_use]
    pub fn data_type(&self) -> Option<DataType> {
        self.values.first().map(AttributeValue::data_type)
    }

    /// Returns true if the bag contains a value equal to `value`
    #[must_use]
    pub fn contains(&self, value: &AttributeValue) -> bool {
        self.values.contains(value)
    }
}

impl From<Vec<AttributeValue>> for Bag {
    fn from(values: Vec<AttributeValue>) -> Self {
        Self { values }
    }
}

impl FromIterator<AttributeValue> for Bag {
    fn from_iter<I: IntoIterator<Item = AttributeValue>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Bag {
    type Item = &'a AttributeValue;
    type IntoIter = std::slice::Iter<'a, AttributeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl IntoIterator for Bag {
    type Item = AttributeValue;
    type IntoIter = std::vec::IntoIter<AttributeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}
