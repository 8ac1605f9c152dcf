//! Builder pattern for ergonomic policy tree construction
//!
//! Builders only check that required fields are present. Whether identifiers
//! resolve against a registry is left to validation, so a tree built here and
//! a tree assembled by a loader fail the same way at evaluation time.

use crate::combining::{CombinerParameter, TargetedCombinerParameter};
use crate::defaults::PolicyDefaults;
use crate::error::BuildError;
use crate::expression::{Condition, VariableDefinition};
use crate::identifier::Identifier;
use crate::obligation::{AdviceExpression, ObligationExpression};
use crate::policy::{Policy, PolicyDef, PolicyNode, PolicySet};
use crate::result::Effect;
use crate::rule::Rule;
use crate::target::Target;
use crate::version::{IdReference, IdReferenceMatch, Version};
use std::sync::Arc;

/// Builder for [`Rule`]s
///
/// # Examples
///
/// ```
/// use pdp_core::{Effect, RuleBuilder};
///
/// let rule = RuleBuilder::new("urn:example:rule:allow-all")
///     .permit()
///     .description("allows everything")
///     .build()
///     .unwrap();
/// assert_eq!(rule.effect(), Effect::Permit);
/// ```
#[derive(Debug)]
pub struct RuleBuilder {
    id: Identifier,
    effect: Option<Effect>,
    description: Option<String>,
    target: Option<Target>,
    condition: Option<Condition>,
    obligations: Vec<ObligationExpression>,
    advice: Vec<AdviceExpression>,
}

impl RuleBuilder {
    /// Start a rule
    #[must_use]
    pub fn new(id: impl Into<Identifier>) -> Self {
        Self {
            id: id.into(),
            effect: None,
            description: None,
            target: None,
            condition: None,
            obligations: Vec::new(),
            advice: Vec::new(),
        }
    }

    /// Set the effect to Permit
    #[must_use]
    pub const fn permit(self) -> Self {
        self.effect(Effect::Permit)
    }

    /// Set the effect to Deny
    #[must_use]
    pub const fn deny(self) -> Self {
        self.effect(Effect::Deny)
    }

    /// Set the effect
    #[must_use]
    pub const fn effect(mut self, effect: Effect) -> Self {
        self.effect = Some(effect);
        self
    }

    /// Set the description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the target
    #[must_use]
    pub fn target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the condition
    #[must_use]
    pub fn condition(mut self, condition: impl Into<Condition>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Add an obligation expression
    #[must_use]
    pub fn obligation(mut self, obligation: ObligationExpression) -> Self {
        self.obligations.push(obligation);
        self
    }

    /// Add an advice expression
    #[must_use]
    pub fn advice(mut self, advice: AdviceExpression) -> Self {
        self.advice.push(advice);
        self
    }

    /// Build the rule
    ///
    /// # Errors
    ///
    /// Returns `BuildError::MissingField` if the id is empty or no effect was set
    pub fn build(self) -> Result<Rule, BuildError> {
        if self.id.is_empty() {
            return Err(BuildError::MissingField {
                element: "Rule",
                field: "id",
            });
        }
        let effect = self.effect.ok_or(BuildError::MissingField {
            element: "Rule",
            field: "effect",
        })?;

        let mut rule = Rule::new(self.id, effect);
        rule.description = self.description;
        rule.target = self.target;
        rule.condition = self.condition;
        rule.obligation_expressions = self.obligations;
        rule.advice_expressions = self.advice;
        Ok(rule)
    }
}

/// Fields shared by the policy and policy-set builders
#[derive(Debug)]
struct DefBuilder {
    element: &'static str,
    id: Identifier,
    version: Version,
    description: Option<String>,
    target: Option<Target>,
    defaults: Option<Arc<PolicyDefaults>>,
    combiner_parameters: Vec<CombinerParameter>,
    obligations: Vec<ObligationExpression>,
    advice: Vec<AdviceExpression>,
}

impl DefBuilder {
    fn new(element: &'static str, id: Identifier) -> Self {
        Self {
            element,
            id,
            version: Version::default(),
            description: None,
            target: None,
            defaults: None,
            combiner_parameters: Vec::new(),
            obligations: Vec::new(),
            advice: Vec::new(),
        }
    }

    fn scope(&mut self) -> Arc<PolicyDefaults> {
        Arc::clone(self.defaults.get_or_insert_with(Arc::default))
    }

    fn build(mut self) -> Result<PolicyDef, BuildError> {
        if self.id.is_empty() {
            return Err(BuildError::MissingField {
                element: self.element,
                field: "id",
            });
        }
        let defaults = self.scope();
        if let Some(target) = self.target.as_mut() {
            target.inherit_defaults(&defaults);
        }

        let mut def = PolicyDef::new(self.id, self.version, defaults);
        def.description = self.description;
        def.target = self.target;
        def.combiner_parameters = self.combiner_parameters;
        def.obligation_expressions = self.obligations;
        def.advice_expressions = self.advice;
        Ok(def)
    }
}

/// Builder for [`Policy`]s
///
/// # Examples
///
/// ```
/// use pdp_core::PolicyBuilder;
///
/// # fn example() -> Result<(), pdp_core::BuildError> {
/// let policy = PolicyBuilder::new("urn:example:policy:documents")
///     .version("1.2")?
///     .rule_combining_algorithm("urn:oasis:names:tc:xacml:3.0:rule-combining-algorithm:deny-overrides")
///     .add_rule_with("urn:example:rule:read", |rule| rule.permit())?
///     .build()?;
///
/// assert_eq!(policy.rules().len(), 1);
/// assert_eq!(policy.version().to_string(), "1.2");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PolicyBuilder {
    def: DefBuilder,
    algorithm: Option<Identifier>,
    rules: Vec<Rule>,
    rule_combiner_parameters: Vec<TargetedCombinerParameter>,
    variable_definitions: Vec<Arc<VariableDefinition>>,
}

impl PolicyBuilder {
    /// Start a policy
    #[must_use]
    pub fn new(id: impl Into<Identifier>) -> Self {
        Self {
            def: DefBuilder::new("Policy", id.into()),
            algorithm: None,
            rules: Vec::new(),
            rule_combiner_parameters: Vec::new(),
            variable_definitions: Vec::new(),
        }
    }

    /// Set the version (defaults to `1.0`)
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InvalidVersion` for a malformed version
    pub fn version(mut self, version: &str) -> Result<Self, BuildError> {
        self.def.version = Version::parse(version)?;
        Ok(self)
    }

    /// Set the rule-combining algorithm identifier
    #[must_use]
    pub fn rule_combining_algorithm(mut self, id: impl Into<Identifier>) -> Self {
        self.algorithm = Some(id.into());
        self
    }

    /// Set the description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.def.description = Some(description.into());
        self
    }

    /// Set the target
    #[must_use]
    pub fn target(mut self, target: Target) -> Self {
        self.def.target = Some(target);
        self
    }

    /// Set this policy's defaults scope
    #[must_use]
    pub fn defaults(mut self, defaults: Arc<PolicyDefaults>) -> Self {
        self.def.defaults = Some(defaults);
        self
    }

    /// Add a rule
    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Build and add a rule with a closure
    ///
    /// # Errors
    ///
    /// Propagates the rule builder's error
    pub fn add_rule_with<F>(mut self, id: impl Into<Identifier>, f: F) -> Result<Self, BuildError>
    where
        F: FnOnce(RuleBuilder) -> RuleBuilder,
    {
        self.rules.push(f(RuleBuilder::new(id)).build()?);
        Ok(self)
    }

    /// Replace the combiner parameters
    #[must_use]
    pub fn combiner_parameters(mut self, parameters: Vec<CombinerParameter>) -> Self {
        self.def.combiner_parameters = parameters;
        self
    }

    /// Add a combiner parameter
    #[must_use]
    pub fn combiner_parameter(mut self, parameter: CombinerParameter) -> Self {
        self.def.combiner_parameters.push(parameter);
        self
    }

    /// Add a combiner parameter addressed to one rule
    #[must_use]
    pub fn rule_combiner_parameter(mut self, parameter: TargetedCombinerParameter) -> Self {
        self.rule_combiner_parameters.push(parameter);
        self
    }

    /// Replace the variable definitions
    #[must_use]
    pub fn variable_definitions(mut self, definitions: Vec<Arc<VariableDefinition>>) -> Self {
        self.variable_definitions = definitions;
        self
    }

    /// Add a variable definition
    #[must_use]
    pub fn variable(mut self, definition: Arc<VariableDefinition>) -> Self {
        self.variable_definitions.push(definition);
        self
    }

    /// Add an obligation expression
    #[must_use]
    pub fn obligation(mut self, obligation: ObligationExpression) -> Self {
        self.def.obligations.push(obligation);
        self
    }

    /// Add an advice expression
    #[must_use]
    pub fn advice(mut self, advice: AdviceExpression) -> Self {
        self.def.advice.push(advice);
        self
    }

    /// Build the policy
    ///
    /// Every rule is pointed at the policy's defaults scope and records the
    /// policy's (id, version) as its owner.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::MissingField` if the id is empty
    pub fn build(self) -> Result<Policy, BuildError> {
        let def = self.def.build()?;
        let owner = IdReference::new(def.id.clone(), def.version.clone());
        let defaults = Arc::clone(&def.defaults);

        let mut policy = Policy::new(def);
        policy.rule_combining_algorithm_id = self.algorithm;
        policy.rules = self
            .rules
            .into_iter()
            .map(|mut rule| {
                rule.attach(&defaults, &owner);
                Arc::new(rule)
            })
            .collect();
        policy.rule_combiner_parameters = self.rule_combiner_parameters;
        policy.variable_definitions = self.variable_definitions;
        Ok(policy)
    }
}

/// Builder for [`PolicySet`]s
#[derive(Debug)]
pub struct PolicySetBuilder {
    def: DefBuilder,
    algorithm: Option<Identifier>,
    children: Vec<PolicyNode>,
    child_combiner_parameters: Vec<TargetedCombinerParameter>,
}

impl PolicySetBuilder {
    /// Start a policy set
    #[must_use]
    pub fn new(id: impl Into<Identifier>) -> Self {
        Self {
            def: DefBuilder::new("PolicySet", id.into()),
            algorithm: None,
            children: Vec::new(),
            child_combiner_parameters: Vec::new(),
        }
    }

    /// Set the version (defaults to `1.0`)
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InvalidVersion` for a malformed version
    pub fn version(mut self, version: &str) -> Result<Self, BuildError> {
        self.def.version = Version::parse(version)?;
        Ok(self)
    }

    /// Set the policy-combining algorithm identifier
    #[must_use]
    pub fn policy_combining_algorithm(mut self, id: impl Into<Identifier>) -> Self {
        self.algorithm = Some(id.into());
        self
    }

    /// Set the description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.def.description = Some(description.into());
        self
    }

    /// Set the target
    #[must_use]
    pub fn target(mut self, target: Target) -> Self {
        self.def.target = Some(target);
        self
    }

    /// Set this policy set's defaults scope
    ///
    /// Call this before [`add_policy_with`](Self::add_policy_with) so that
    /// nested policies inherit from it.
    #[must_use]
    pub fn defaults(mut self, defaults: Arc<PolicyDefaults>) -> Self {
        self.def.defaults = Some(defaults);
        self
    }

    /// Add any child
    #[must_use]
    pub fn child(mut self, child: impl Into<PolicyNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Add an inline policy
    #[must_use]
    pub fn policy(self, policy: Policy) -> Self {
        self.child(policy)
    }

    /// Add an inline policy set
    #[must_use]
    pub fn policy_set(self, policy_set: PolicySet) -> Self {
        self.child(policy_set)
    }

    /// Add a reference to a policy
    #[must_use]
    pub fn policy_reference(self, id_match: IdReferenceMatch) -> Self {
        self.child(PolicyNode::policy_reference(id_match))
    }

    /// Add a reference to a policy set
    #[must_use]
    pub fn policy_set_reference(self, id_match: IdReferenceMatch) -> Self {
        self.child(PolicyNode::policy_set_reference(id_match))
    }

    /// Build and add an inline policy whose defaults inherit from this set's scope
    ///
    /// # Errors
    ///
    /// Propagates the policy builder's error
    pub fn add_policy_with<F>(mut self, id: impl Into<Identifier>, f: F) -> Result<Self, BuildError>
    where
        F: FnOnce(PolicyBuilder) -> Result<PolicyBuilder, BuildError>,
    {
        let scope = Arc::new(PolicyDefaults::inherit(&self.def.scope()));
        let policy = f(PolicyBuilder::new(id).defaults(scope))?.build()?;
        Ok(self.policy(policy))
    }

    /// Replace the combiner parameters
    #[must_use]
    pub fn combiner_parameters(mut self, parameters: Vec<CombinerParameter>) -> Self {
        self.def.combiner_parameters = parameters;
        self
    }

    /// Add a combiner parameter
    #[must_use]
    pub fn combiner_parameter(mut self, parameter: CombinerParameter) -> Self {
        self.def.combiner_parameters.push(parameter);
        self
    }

    /// Add a combiner parameter addressed to one child
    #[must_use]
    pub fn child_combiner_parameter(mut self, parameter: TargetedCombinerParameter) -> Self {
        self.child_combiner_parameters.push(parameter);
        self
    }

    /// Add an obligation expression
    #[must_use]
    pub fn obligation(mut self, obligation: ObligationExpression) -> Self {
        self.def.obligations.push(obligation);
        self
    }

    /// Add an advice expression
    #[must_use]
    pub fn advice(mut self, advice: AdviceExpression) -> Self {
        self.def.advice.push(advice);
        self
    }

    /// Build the policy set
    ///
    /// # Errors
    ///
    /// Returns `BuildError::MissingField` if the id is empty
    pub fn build(self) -> Result<PolicySet, BuildError> {
        let mut policy_set = PolicySet::new(self.def.build()?);
        policy_set.policy_combining_algorithm_id = self.algorithm;
        policy_set.children = self.children;
        policy_set.child_combiner_parameters = self.child_combiner_parameters;
        Ok(policy_set)
    }
}
