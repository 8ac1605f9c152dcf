//! URN identifiers for policies, rules, functions, algorithms and attributes

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Cheap-to-clone identifier (usually a URN)
///
/// Identifiers are compared by their full text. [`Identifier::short`] gives
/// the trailing segment used to prefix diagnostic messages, so that
/// `urn:oasis:names:tc:xacml:1.0:function:string-equal` reports itself as
/// `string-equal`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(Arc<str>);

impl Identifier {
    /// Create a new identifier
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Get the identifier text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last `:` or `#` separated segment of the identifier
    #[must_use]
    pub fn short(&self) -> &str {
        self.0
            .rsplit(|c| c == ':' || c == '#')
            .find(|segment| !segment.is_empty())
            .unwrap_or(self.as_str())
    }

    /// Returns true if the identifier text is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for Identifier {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}
