//! The standard registry

use crate::combining::{standard_policy_algorithms, standard_rule_algorithms};
use crate::functions::standard_functions;
use pdp_core::Registry;

/// A registry preloaded with every standard function and combining algorithm
#[must_use]
pub fn standard_registry() -> Registry {
    let mut registry = Registry::new();
    for function in standard_functions() {
        registry.register_function(function);
    }
    for algorithm in standard_rule_algorithms() {
        registry.register_rule_algorithm(algorithm);
    }
    for algorithm in standard_policy_algorithms() {
        registry.register_policy_algorithm(algorithm);
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combining::ids as algorithms;
    use crate::functions::ids as functions;

    #[test]
    fn test_standard_registry_contents() {
        let registry = standard_registry();

        assert!(registry.has_function(functions::STRING_EQUAL));
        assert!(registry.has_function(functions::INTEGER_IS_IN));
        assert!(registry.has_rule_algorithm(algorithms::RULE_DENY_OVERRIDES));
        assert!(registry.has_policy_algorithm(algorithms::POLICY_ONLY_ONE_APPLICABLE));
        assert!(!registry.has_rule_algorithm(algorithms::POLICY_ONLY_ONE_APPLICABLE));
    }

    #[test]
    fn test_no_duplicate_identifiers() {
        let registry = standard_registry();
        let expected = standard_functions().len()
            + standard_rule_algorithms().len()
            + standard_policy_algorithms().len();
        assert_eq!(registry.count(), expected);
    }
}
