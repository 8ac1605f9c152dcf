//! Request attributes visible to attribute retrieval

use crate::bag::Bag;
use crate::identifier::Identifier;
use crate::value::{AttributeValue, DataType};
use serde::{Deserialize, Serialize};

/// Well-known attribute categories
pub mod category {
    /// `access-subject` category
    pub const ACCESS_SUBJECT: &str = "urn:oasis:names:tc:xacml:1.0:subject-category:access-subject";
    /// `resource` category
    pub const RESOURCE: &str = "urn:oasis:names:tc:xacml:3.0:attribute-category:resource";
    /// `action` category
    pub const ACTION: &str = "urn:oasis:names:tc:xacml:3.0:attribute-category:action";
    /// `environment` category
    pub const ENVIRONMENT: &str = "urn:oasis:names:tc:xacml:3.0:attribute-category:environment";
}

/// One request attribute with its values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    category: Identifier,
    attribute_id: Identifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    issuer: Option<String>,
    values: Vec<AttributeValue>,
}

impl Attribute {
    /// Create a new attribute
    #[must_use]
    pub fn new(
        category: impl Into<Identifier>,
        attribute_id: impl Into<Identifier>,
        values: Vec<AttributeValue>,
    ) -> Self {
        Self {
            category: category.into(),
            attribute_id: attribute_id.into(),
            issuer: None,
            values,
        }
    }

    /// Set the issuer
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Attribute category
    #[must_use]
    pub fn category(&self) -> &Identifier {
        &self.category
    }

    /// Attribute identifier
    #[must_use]
    pub fn attribute_id(&self) -> &Identifier {
        &self.attribute_id
    }

    /// Attribute issuer
    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    /// Attribute values
    #[must_use]
    pub fn values(&self) -> &[AttributeValue] {
        &self.values
    }
}

/// Key used to retrieve an attribute bag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeKey {
    /// Attribute category
    pub category: Identifier,
    /// Attribute identifier
    pub attribute_id: Identifier,
    /// Expected data type of the values
    pub data_type: DataType,
    /// Required issuer, if any
    pub issuer: Option<String>,
}

impl AttributeKey {
    /// Create a key without issuer constraint
    #[must_use]
    pub fn new(
        category: impl Into<Identifier>,
        attribute_id: impl Into<Identifier>,
        data_type: DataType,
    ) -> Self {
        Self {
            category: category.into(),
            attribute_id: attribute_id.into(),
            data_type,
            issuer: None,
        }
    }

    fn selects(&self, attribute: &Attribute) -> bool {
        attribute.category == self.category
            && attribute.attribute_id == self.attribute_id
            && self
                .issuer
                .as_deref()
                .map_or(true, |issuer| attribute.issuer() == Some(issuer))
    }
}

/// Access request as seen by the evaluation core
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    return_policy_id_list: Option<bool>,
    #[serde(default)]
    attributes: Vec<Attribute>,
}

impl Request {
    /// Create an empty request
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for the identifiers of applicable policies in the result
    #[must_use]
    pub fn with_return_policy_id_list(mut self, value: bool) -> Self {
        self.return_policy_id_list = Some(value);
        self
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Whether the caller asked for policy identifiers (false when unspecified)
    #[must_use]
    pub fn return_policy_id_list(&self) -> bool {
        self.return_policy_id_list.unwrap_or(false)
    }

    /// Whether the caller said anything about policy identifiers
    #[must_use]
    pub const fn return_policy_id_list_specified(&self) -> Option<bool> {
        self.return_policy_id_list
    }

    /// All request attributes
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Collect the values selected by `key` whose data type matches
    #[must_use]
    pub fn attribute_values(&self, key: &AttributeKey) -> Bag {
        self.attributes
            .iter()
            .filter(|attribute| key.selects(attribute))
            .flat_map(|attribute| attribute.values.iter())
            .filter(|value| value.data_type() == key.data_type)
            .cloned()
            .collect()
    }
}
