//! Inheritable policy defaults
//!
//! Each policy or policy set may declare defaults (today only the XPath
//! version). Lookups walk from the innermost scope outwards and fall back to
//! [`DEFAULT_XPATH_VERSION`].

use crate::identifier::Identifier;
use std::sync::Arc;

/// XPath version used when no scope declares one
pub const DEFAULT_XPATH_VERSION: &str = "http://www.w3.org/TR/1999/REC-xpath-19991116";

/// A scope of policy defaults linked to its enclosing scope
///
/// The parent link points at the enclosing scope's defaults only, never at
/// the enclosing policy node, so no ownership cycle exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyDefaults {
    xpath_version: Option<Identifier>,
    parent: Option<Arc<PolicyDefaults>>,
}

impl PolicyDefaults {
    /// Create a scope
    #[must_use]
    pub fn new(xpath_version: Option<Identifier>, parent: Option<Arc<PolicyDefaults>>) -> Self {
        Self {
            xpath_version,
            parent,
        }
    }

    /// Create a scope nested in `parent` that declares nothing itself
    #[must_use]
    pub fn inherit(parent: &Arc<PolicyDefaults>) -> Self {
        Self::new(None, Some(Arc::clone(parent)))
    }

    /// The XPath version of this scope, its nearest ancestor, or the default
    #[must_use]
    pub fn xpath_version(&self) -> &str {
        self.declared_xpath_version().unwrap_or(DEFAULT_XPATH_VERSION)
    }

    /// The XPath version declared by this scope or its nearest ancestor
    #[must_use]
    pub fn declared_xpath_version(&self) -> Option<&str> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(version) = &current.xpath_version {
                return Some(version.as_str());
            }
            scope = current.parent.as_deref();
        }
        None
    }

    /// This scope, or `root` when nothing on the chain declares a version
    ///
    /// Lets an evaluation context supply process-wide defaults underneath
    /// trees that were built without them.
    #[must_use]
    pub fn or_root<'a>(&'a self, root: Option<&'a PolicyDefaults>) -> &'a PolicyDefaults {
        match root {
            Some(root) if self.declared_xpath_version().is_none() => root,
            _ => self,
        }
    }

    /// The enclosing scope
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<PolicyDefaults>> {
        self.parent.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falls_back_to_default() {
        assert_eq!(PolicyDefaults::default().xpath_version(), DEFAULT_XPATH_VERSION);
    }

    #[test]
    fn test_walks_parent_chain() {
        let root = Arc::new(PolicyDefaults::new(
            Some(Identifier::new("http://www.w3.org/TR/2007/REC-xpath20-20070123")),
            None,
        ));
        let middle = Arc::new(PolicyDefaults::inherit(&root));
        let leaf = PolicyDefaults::inherit(&middle);

        assert_eq!(
            leaf.xpath_version(),
            "http://www.w3.org/TR/2007/REC-xpath20-20070123"
        );
    }

    #[test]
    fn test_innermost_scope_wins() {
        let root = Arc::new(PolicyDefaults::new(Some(Identifier::new("urn:outer")), None));
        let leaf = PolicyDefaults::new(Some(Identifier::new("urn:inner")), Some(root));
        assert_eq!(leaf.xpath_version(), "urn:inner");
    }

    #[test]
    fn test_root_only_fills_undeclared_chains() {
        let root = PolicyDefaults::new(Some(Identifier::new("urn:process")), None);
        let bare = Arc::new(PolicyDefaults::default());
        let nested = PolicyDefaults::inherit(&bare);
        let declared = PolicyDefaults::new(Some(Identifier::new("urn:policy")), None);

        assert_eq!(nested.declared_xpath_version(), None);
        assert_eq!(nested.or_root(Some(&root)).xpath_version(), "urn:process");
        assert_eq!(declared.or_root(Some(&root)).xpath_version(), "urn:policy");
        assert_eq!(nested.or_root(None).xpath_version(), DEFAULT_XPATH_VERSION);
    }
}
