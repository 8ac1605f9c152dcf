//! Attribute values and their data types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Data types understood by the core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DataType {
    /// `xs:string`
    String,
    /// `xs:boolean`
    Boolean,
    /// `xs:integer`
    Integer,
    /// `xs:double`
    Double,
    /// `xs:anyURI`
    AnyUri,
}

impl DataType {
    /// The XML Schema identifier of this data type
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::String => "http://www.w3.org/2001/XMLSchema#string",
            Self::Boolean => "http://www.w3.org/2001/XMLSchema#boolean",
            Self::Integer => "http://www.w3.org/2001/XMLSchema#integer",
            Self::Double => "http://www.w3.org/2001/XMLSchema#double",
            Self::AnyUri => "http://www.w3.org/2001/XMLSchema#anyURI",
        }
    }

    /// Short name used in diagnostics
    #[must_use]
    pub const fn short_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Double => "double",
            Self::AnyUri => "anyURI",
        }
    }

    /// Look up a data type by its identifier
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        [
            Self::String,
            Self::Boolean,
            Self::Integer,
            Self::Double,
            Self::AnyUri,
        ]
        .into_iter()
        .find(|data_type| data_type.id() == id)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A typed attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// `xs:string` value
    String(String),
    /// `xs:boolean` value
    Boolean(bool),
    /// `xs:integer` value
    Integer(i64),
    /// `xs:double` value
    Double(f64),
    /// `xs:anyURI` value
    AnyUri(String),
}

impl AttributeValue {
    /// Create a string value
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Create an anyURI value
    #[must_use]
    pub fn any_uri(value: impl Into<String>) -> Self {
        Self::AnyUri(value.into())
    }

    /// The data type of this value
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        match self {
            Self::String(_) => DataType::String,
            Self::Boolean(_) => DataType::Boolean,
            Self::Integer(_) => DataType::Integer,
            Self::Double(_) => DataType::Double,
            Self::AnyUri(_) => DataType::AnyUri,
        }
    }

    /// The boolean payload, if this is a boolean value
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) | Self::AnyUri(value) => f.write_str(value),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Double(value) => write!(f, "{value}"),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// An `xs:anyURI` in native form
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uri(pub String);

/// Native Rust types that attribute values convert to and from
///
/// Conversion accepts a value of the exact data type and, like the XACML
/// data-type converters, the lexical string form of the type.
pub trait AttributeType: Sized {
    /// The data type this native type represents
    const DATA_TYPE: DataType;

    /// Convert an attribute value into this native type
    ///
    /// # Errors
    ///
    /// Returns a description of why the value cannot be converted
    fn from_attribute(value: &AttributeValue) -> Result<Self, String>;

    /// Wrap this native value back into an attribute value
    fn into_attribute(self) -> AttributeValue;
}

fn conversion_error(value: &AttributeValue, target: DataType) -> String {
    format!(
        "Cannot convert {} value \"{}\" to {}",
        value.data_type(),
        value,
        target
    )
}

impl AttributeType for String {
    const DATA_TYPE: DataType = DataType::String;

    fn from_attribute(value: &AttributeValue) -> Result<Self, String> {
        match value {
            AttributeValue::String(s) => Ok(s.clone()),
            other => Err(conversion_error(other, Self::DATA_TYPE)),
        }
    }

    fn into_attribute(self) -> AttributeValue {
        AttributeValue::String(self)
    }
}

impl AttributeType for bool {
    const DATA_TYPE: DataType = DataType::Boolean;

    fn from_attribute(value: &AttributeValue) -> Result<Self, String> {
        match value {
            AttributeValue::Boolean(b) => Ok(*b),
            AttributeValue::String(s) if s == "true" || s == "1" => Ok(true),
            AttributeValue::String(s) if s == "false" || s == "0" => Ok(false),
            other => Err(conversion_error(other, Self::DATA_TYPE)),
        }
    }

    fn into_attribute(self) -> AttributeValue {
        AttributeValue::Boolean(self)
    }
}

impl AttributeType for i64 {
    const DATA_TYPE: DataType = DataType::Integer;

    fn from_attribute(value: &AttributeValue) -> Result<Self, String> {
        match value {
            AttributeValue::Integer(i) => Ok(*i),
            AttributeValue::String(s) => s
                .trim()
                .parse()
                .map_err(|_| conversion_error(value, Self::DATA_TYPE)),
            other => Err(conversion_error(other, Self::DATA_TYPE)),
        }
    }

    fn into_attribute(self) -> AttributeValue {
        AttributeValue::Integer(self)
    }
}

impl AttributeType for f64 {
    const DATA_TYPE: DataType = DataType::Double;

    fn from_attribute(value: &AttributeValue) -> Result<Self, String> {
        match value {
            AttributeValue::Double(d) => Ok(*d),
            AttributeValue::String(s) => s
                .trim()
                .parse()
                .map_err(|_| conversion_error(value, Self::DATA_TYPE)),
            other => Err(conversion_error(other, Self::DATA_TYPE)),
        }
    }

    fn into_attribute(self) -> AttributeValue {
        AttributeValue::Double(self)
    }
}

impl AttributeType for Uri {
    const DATA_TYPE: DataType = DataType::AnyUri;

    fn from_attribute(value: &AttributeValue) -> Result<Self, String> {
        match value {
            AttributeValue::AnyUri(s) | AttributeValue::String(s) => Ok(Uri(s.clone())),
            other => Err(conversion_error(other, Self::DATA_TYPE)),
        }
    }

    fn into_attribute(self) -> AttributeValue {
        AttributeValue::AnyUri(self.0)
    }
}
