//! # Registry
//!
//! Lookup table for functions and combining algorithms, keyed by identifier.
//! One registry is shared by every evaluation context that needs it; nothing
//! in the core reaches for process-wide state.
//!
//! ## Usage Example
//!
//! ```rust
//! use pdp_core::{
//!     ExpressionResult, EvaluationContext, FunctionArgument, FunctionDefinition, Identifier,
//!     Registry, DataType,
//! };
//! use std::sync::Arc;
//!
//! #[derive(Debug)]
//! struct AlwaysTrue(Identifier);
//!
//! impl FunctionDefinition for AlwaysTrue {
//!     fn id(&self) -> &Identifier {
//!         &self.0
//!     }
//!     fn data_type_id(&self) -> Option<DataType> {
//!         Some(DataType::Boolean)
//!     }
//!     fn returns_bag(&self) -> bool {
//!         false
//!     }
//!     fn evaluate(&self, _: &dyn EvaluationContext, _: &[FunctionArgument<'_>]) -> ExpressionResult {
//!         ExpressionResult::boolean(true)
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! registry.register_function(Arc::new(AlwaysTrue(Identifier::new("urn:example:always-true"))));
//! assert!(registry.has_function("urn:example:always-true"));
//! ```

use crate::combining::CombiningAlgorithm;
use crate::function::FunctionDefinition;
use crate::identifier::Identifier;
use crate::policy::PolicyNode;
use crate::rule::Rule;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Rule-combining algorithm handle
pub type RuleCombiningAlgorithm = Arc<dyn CombiningAlgorithm<Rule>>;

/// Policy-combining algorithm handle
pub type PolicyCombiningAlgorithm = Arc<dyn CombiningAlgorithm<PolicyNode>>;

/// Functions and combining algorithms by identifier
///
/// Rule-combining and policy-combining algorithms live in separate maps, so
/// the same URN suffix can name one of each.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    functions: BTreeMap<Identifier, Arc<dyn FunctionDefinition>>,
    rule_algorithms: BTreeMap<Identifier, RuleCombiningAlgorithm>,
    policy_algorithms: BTreeMap<Identifier, PolicyCombiningAlgorithm>,
}

impl Registry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function under its own id
    ///
    /// Returns the previously registered function with that id, if any.
    pub fn register_function(
        &mut self,
        function: Arc<dyn FunctionDefinition>,
    ) -> Option<Arc<dyn FunctionDefinition>> {
        self.functions.insert(function.id().clone(), function)
    }

    /// Register a rule-combining algorithm under its own id
    pub fn register_rule_algorithm(
        &mut self,
        algorithm: RuleCombiningAlgorithm,
    ) -> Option<RuleCombiningAlgorithm> {
        self.rule_algorithms.insert(algorithm.id().clone(), algorithm)
    }

    /// Register a policy-combining algorithm under its own id
    pub fn register_policy_algorithm(
        &mut self,
        algorithm: PolicyCombiningAlgorithm,
    ) -> Option<PolicyCombiningAlgorithm> {
        self.policy_algorithms
            .insert(algorithm.id().clone(), algorithm)
    }

    /// Remove a function
    pub fn unregister_function(&mut self, id: &str) -> Option<Arc<dyn FunctionDefinition>> {
        self.functions.remove(id)
    }

    /// Look up a function
    #[must_use]
    pub fn function(&self, id: &str) -> Option<Arc<dyn FunctionDefinition>> {
        self.functions.get(id).cloned()
    }

    /// Look up a rule-combining algorithm
    #[must_use]
    pub fn rule_combining_algorithm(&self, id: &str) -> Option<RuleCombiningAlgorithm> {
        self.rule_algorithms.get(id).cloned()
    }

    /// Look up a policy-combining algorithm
    #[must_use]
    pub fn policy_combining_algorithm(&self, id: &str) -> Option<PolicyCombiningAlgorithm> {
        self.policy_algorithms.get(id).cloned()
    }

    /// Check if a function is registered
    #[must_use]
    pub fn has_function(&self, id: &str) -> bool {
        self.functions.contains_key(id)
    }

    /// Check if a rule-combining algorithm is registered
    #[must_use]
    pub fn has_rule_algorithm(&self, id: &str) -> bool {
        self.rule_algorithms.contains_key(id)
    }

    /// Check if a policy-combining algorithm is registered
    #[must_use]
    pub fn has_policy_algorithm(&self, id: &str) -> bool {
        self.policy_algorithms.contains_key(id)
    }

    /// Ids of all registered functions, sorted
    #[must_use]
    pub fn list_functions(&self) -> Vec<Identifier> {
        self.functions.keys().cloned().collect()
    }

    /// Total number of registered entries
    #[must_use]
    pub fn count(&self) -> usize {
        self.functions.len() + self.rule_algorithms.len() + self.policy_algorithms.len()
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.functions.clear();
        self.rule_algorithms.clear();
        self.policy_algorithms.clear();
    }
}
