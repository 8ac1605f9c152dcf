//! Policies, policy sets and the references between them
//!
//! [`PolicyNode`] is the closed set of children a policy set may hold. Each
//! variant runs the same cycle on every call to `evaluate`: validate, match
//! the target, combine the children, decorate a Permit or Deny with
//! obligations, advice and the contributing policy identifier.
//!
//! Everything computed lazily (resolved algorithms, combining-element lists,
//! resolved references) is a pure function of the immutable tree and the
//! registry or store behind the context, so racing evaluations may compute
//! it redundantly and keep whichever value lands first.

use crate::combining::{
    CombinerParameter, CombiningElement, Evaluatable, TargetedCombinerParameter,
};
use crate::context::{trace_result, EvaluationContext, NodeKind};
use crate::defaults::PolicyDefaults;
use crate::error::Result;
use crate::expression::VariableDefinition;
use crate::identifier::Identifier;
use crate::obligation::{AdviceExpression, ObligationExpression};
use crate::registry::{PolicyCombiningAlgorithm, Registry, RuleCombiningAlgorithm};
use crate::result::{Effect, EvaluationResult};
use crate::rule::Rule;
use crate::status::{validate_once, Status};
use crate::target::{MatchCode, MatchResult, Matchable, Target};
use crate::version::{IdReference, IdReferenceMatch, Version};
use std::cell::RefCell;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace};

/// State shared by policies and policy sets
#[derive(Debug, Clone)]
pub struct PolicyDef {
    pub(crate) id: Identifier,
    pub(crate) version: Version,
    pub(crate) description: Option<String>,
    pub(crate) target: Option<Target>,
    pub(crate) defaults: Arc<PolicyDefaults>,
    pub(crate) combiner_parameters: Vec<CombinerParameter>,
    pub(crate) obligation_expressions: Vec<ObligationExpression>,
    pub(crate) advice_expressions: Vec<AdviceExpression>,
}

impl PolicyDef {
    pub(crate) fn new(id: Identifier, version: Version, defaults: Arc<PolicyDefaults>) -> Self {
        Self {
            id,
            version,
            description: None,
            target: None,
            defaults,
            combiner_parameters: Vec::new(),
            obligation_expressions: Vec::new(),
            advice_expressions: Vec::new(),
        }
    }

    /// Identifier
    #[must_use]
    pub fn id(&self) -> &Identifier {
        &self.id
    }

    /// Version
    #[must_use]
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Description, if any
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Target, if any
    #[must_use]
    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    /// This node's defaults scope
    #[must_use]
    pub fn defaults(&self) -> &Arc<PolicyDefaults> {
        &self.defaults
    }

    /// Parameters passed to the combining algorithm
    #[must_use]
    pub fn combiner_parameters(&self) -> &[CombinerParameter] {
        &self.combiner_parameters
    }

    /// Obligation expressions
    #[must_use]
    pub fn obligation_expressions(&self) -> &[ObligationExpression] {
        &self.obligation_expressions
    }

    /// Advice expressions
    #[must_use]
    pub fn advice_expressions(&self) -> &[AdviceExpression] {
        &self.advice_expressions
    }

    /// The (id, version) pair reported in policy identifier lists
    #[must_use]
    pub fn id_reference(&self) -> IdReference {
        IdReference::new(self.id.clone(), self.version.clone())
    }

    fn validate(&self, registry: &Registry) -> std::result::Result<(), Status> {
        if self.id.is_empty() {
            return Err(Status::syntax_error("Missing identifier"));
        }
        match &self.target {
            Some(target) => target.validate(registry),
            None => Ok(()),
        }
    }

    fn match_target(&self, context: &dyn EvaluationContext) -> MatchResult {
        self.target
            .as_ref()
            .map_or_else(MatchResult::matched, |target| target.match_request(context))
    }

    // Attach obligations and advice to a decisive result. Returns whether the
    // caller should also record this node's identifier.
    fn decorate(
        &self,
        context: &dyn EvaluationContext,
        result: &mut EvaluationResult,
    ) -> Result<bool> {
        if !result.is_decisive() {
            return Ok(false);
        }
        let decision = result.decision();
        let defaults = self.defaults.or_root(context.root_defaults());
        result.add_obligations(ObligationExpression::evaluate_all(
            context,
            defaults,
            decision,
            &self.obligation_expressions,
        )?);
        result.add_advice(AdviceExpression::evaluate_all(
            context,
            defaults,
            decision,
            &self.advice_expressions,
        )?);
        Ok(context.request().return_policy_id_list())
    }
}

/// Pre-combination outcome of validate and match
enum Gate {
    Proceed,
    Done(EvaluationResult),
}

fn gate(
    def: &PolicyDef,
    context: &dyn EvaluationContext,
    validation: std::result::Result<(), Status>,
) -> Gate {
    if let Err(status) = validation {
        debug!(node = %def.id, %status, "failed validation");
        return Gate::Done(EvaluationResult::indeterminate(status));
    }
    let matched = def.match_target(context);
    match matched.code() {
        MatchCode::Match => Gate::Proceed,
        MatchCode::NoMatch => Gate::Done(EvaluationResult::not_applicable()),
        MatchCode::Indeterminate => Gate::Done(EvaluationResult::indeterminate(matched.into_status())),
    }
}

/// A policy: rules combined by a rule-combining algorithm
#[derive(Debug)]
pub struct Policy {
    pub(crate) def: PolicyDef,
    pub(crate) rule_combining_algorithm_id: Option<Identifier>,
    pub(crate) rules: Vec<Arc<Rule>>,
    pub(crate) rule_combiner_parameters: Vec<TargetedCombinerParameter>,
    pub(crate) variable_definitions: Vec<Arc<VariableDefinition>>,
    pub(crate) algorithm: OnceLock<RuleCombiningAlgorithm>,
    pub(crate) elements: OnceLock<Vec<CombiningElement<Rule>>>,
    pub(crate) validated: OnceLock<Status>,
}

impl Policy {
    pub(crate) fn new(def: PolicyDef) -> Self {
        Self {
            def,
            rule_combining_algorithm_id: None,
            rules: Vec::new(),
            rule_combiner_parameters: Vec::new(),
            variable_definitions: Vec::new(),
            algorithm: OnceLock::new(),
            elements: OnceLock::new(),
            validated: OnceLock::new(),
        }
    }

    /// Identifier
    #[must_use]
    pub fn id(&self) -> &Identifier {
        &self.def.id
    }

    /// Version
    #[must_use]
    pub fn version(&self) -> &Version {
        &self.def.version
    }

    /// Shared policy state
    #[must_use]
    pub fn def(&self) -> &PolicyDef {
        &self.def
    }

    /// Rule-combining algorithm identifier
    #[must_use]
    pub fn rule_combining_algorithm_id(&self) -> Option<&Identifier> {
        self.rule_combining_algorithm_id.as_ref()
    }

    /// The rules, in declaration order
    #[must_use]
    pub fn rules(&self) -> &[Arc<Rule>] {
        &self.rules
    }

    /// Combiner parameters addressed to individual rules
    #[must_use]
    pub fn rule_combiner_parameters(&self) -> &[TargetedCombinerParameter] {
        &self.rule_combiner_parameters
    }

    /// Variable definitions
    #[must_use]
    pub fn variable_definitions(&self) -> &[Arc<VariableDefinition>] {
        &self.variable_definitions
    }

    /// Look up a variable definition by id
    #[must_use]
    pub fn variable(&self, id: &str) -> Option<&Arc<VariableDefinition>> {
        self.variable_definitions
            .iter()
            .find(|definition| definition.id().as_str() == id)
    }

    fn algorithm(&self, registry: &Registry) -> std::result::Result<&RuleCombiningAlgorithm, Status> {
        if let Some(algorithm) = self.algorithm.get() {
            return Ok(algorithm);
        }
        let id = self
            .rule_combining_algorithm_id
            .as_ref()
            .ok_or_else(|| Status::syntax_error("Missing RuleCombiningAlgId"))?;
        let algorithm = registry.rule_combining_algorithm(id).ok_or_else(|| {
            Status::syntax_error(format!("Unknown RuleCombiningAlgorithm \"{id}\""))
        })?;
        Ok(self.algorithm.get_or_init(|| algorithm))
    }

    /// The rules wrapped with their combiner parameters, built on first use
    #[must_use]
    pub fn combining_elements(&self) -> &[CombiningElement<Rule>] {
        self.elements.get_or_init(|| {
            self.rules
                .iter()
                .map(|rule| {
                    CombiningElement::with_targeted(Arc::clone(rule), &self.rule_combiner_parameters)
                })
                .collect()
        })
    }

    /// Structural validation, cached after the first call
    ///
    /// # Errors
    ///
    /// Returns the syntax-error status of the first defect
    pub fn validate(&self, registry: &Registry) -> std::result::Result<(), Status> {
        validate_once(&self.validated, || {
            self.def.validate(registry)?;
            self.algorithm(registry)?;
            self.variable_definitions
                .iter()
                .try_for_each(|definition| definition.expression().validate(registry))
        })
    }

    fn evaluate_policy(&self, context: &dyn EvaluationContext) -> Result<EvaluationResult> {
        if let Gate::Done(result) = gate(&self.def, context, self.validate(context.registry())) {
            return Ok(result);
        }
        let algorithm = match self.algorithm(context.registry()) {
            Ok(algorithm) => algorithm,
            Err(status) => return Ok(EvaluationResult::indeterminate(status)),
        };
        let mut result =
            algorithm.combine(context, self.combining_elements(), &self.def.combiner_parameters)?;
        if self.def.decorate(context, &mut result)? {
            result.add_policy_identifier(self.def.id_reference());
        }
        Ok(result)
    }
}

impl Matchable for Policy {
    fn match_request(&self, context: &dyn EvaluationContext) -> MatchResult {
        if let Err(status) = self.validate(context.registry()) {
            return MatchResult::indeterminate(status);
        }
        self.def.match_target(context)
    }
}

impl Evaluatable for Policy {
    fn id(&self) -> &Identifier {
        &self.def.id
    }

    fn evaluate(&self, context: &dyn EvaluationContext) -> Result<EvaluationResult> {
        let result = self.evaluate_policy(context)?;
        trace!(policy = %self.def.id, decision = ?result.decision(), "policy evaluated");
        trace_result(context, NodeKind::Policy, &self.def.id, &result);
        Ok(result)
    }

    /// Known once the algorithm is resolved, if it can only decide one effect
    fn declared_effect(&self) -> Option<Effect> {
        self.algorithm
            .get()?
            .declared_effect(self.combining_elements())
    }
}

/// A policy set: policies, policy sets and references combined by a
/// policy-combining algorithm
#[derive(Debug)]
pub struct PolicySet {
    pub(crate) def: PolicyDef,
    pub(crate) policy_combining_algorithm_id: Option<Identifier>,
    pub(crate) children: Vec<PolicyNode>,
    pub(crate) child_combiner_parameters: Vec<TargetedCombinerParameter>,
    pub(crate) algorithm: OnceLock<PolicyCombiningAlgorithm>,
    pub(crate) elements: OnceLock<Vec<CombiningElement<PolicyNode>>>,
    pub(crate) validated: OnceLock<Status>,
}

impl PolicySet {
    pub(crate) fn new(def: PolicyDef) -> Self {
        Self {
            def,
            policy_combining_algorithm_id: None,
            children: Vec::new(),
            child_combiner_parameters: Vec::new(),
            algorithm: OnceLock::new(),
            elements: OnceLock::new(),
            validated: OnceLock::new(),
        }
    }

    /// Identifier
    #[must_use]
    pub fn id(&self) -> &Identifier {
        &self.def.id
    }

    /// Version
    #[must_use]
    pub fn version(&self) -> &Version {
        &self.def.version
    }

    /// Shared policy state
    #[must_use]
    pub fn def(&self) -> &PolicyDef {
        &self.def
    }

    /// Policy-combining algorithm identifier
    #[must_use]
    pub fn policy_combining_algorithm_id(&self) -> Option<&Identifier> {
        self.policy_combining_algorithm_id.as_ref()
    }

    /// Children, in declaration order
    #[must_use]
    pub fn children(&self) -> &[PolicyNode] {
        &self.children
    }

    /// Combiner parameters addressed to individual children
    #[must_use]
    pub fn child_combiner_parameters(&self) -> &[TargetedCombinerParameter] {
        &self.child_combiner_parameters
    }

    fn algorithm(
        &self,
        registry: &Registry,
    ) -> std::result::Result<&PolicyCombiningAlgorithm, Status> {
        if let Some(algorithm) = self.algorithm.get() {
            return Ok(algorithm);
        }
        let id = self
            .policy_combining_algorithm_id
            .as_ref()
            .ok_or_else(|| Status::syntax_error("Missing PolicyCombiningAlgId"))?;
        let algorithm = registry.policy_combining_algorithm(id).ok_or_else(|| {
            Status::syntax_error(format!("Unknown PolicyCombiningAlgorithm \"{id}\""))
        })?;
        Ok(self.algorithm.get_or_init(|| algorithm))
    }

    /// The children wrapped with their combiner parameters, built on first use
    #[must_use]
    pub fn combining_elements(&self) -> &[CombiningElement<PolicyNode>] {
        self.elements.get_or_init(|| {
            self.children
                .iter()
                .map(|child| {
                    CombiningElement::with_targeted(
                        Arc::new(child.clone()),
                        &self.child_combiner_parameters,
                    )
                })
                .collect()
        })
    }

    /// Structural validation, cached after the first call
    ///
    /// # Errors
    ///
    /// Returns the syntax-error status of the first defect
    pub fn validate(&self, registry: &Registry) -> std::result::Result<(), Status> {
        validate_once(&self.validated, || {
            self.def.validate(registry)?;
            self.algorithm(registry).map(|_| ())
        })
    }

    fn evaluate_policy_set(&self, context: &dyn EvaluationContext) -> Result<EvaluationResult> {
        if let Gate::Done(result) = gate(&self.def, context, self.validate(context.registry())) {
            return Ok(result);
        }
        let algorithm = match self.algorithm(context.registry()) {
            Ok(algorithm) => algorithm,
            Err(status) => return Ok(EvaluationResult::indeterminate(status)),
        };
        let mut result =
            algorithm.combine(context, self.combining_elements(), &self.def.combiner_parameters)?;
        if self.def.decorate(context, &mut result)? {
            result.add_policy_set_identifier(self.def.id_reference());
        }
        Ok(result)
    }
}

impl Matchable for PolicySet {
    fn match_request(&self, context: &dyn EvaluationContext) -> MatchResult {
        if let Err(status) = self.validate(context.registry()) {
            return MatchResult::indeterminate(status);
        }
        self.def.match_target(context)
    }
}

impl Evaluatable for PolicySet {
    fn id(&self) -> &Identifier {
        &self.def.id
    }

    fn evaluate(&self, context: &dyn EvaluationContext) -> Result<EvaluationResult> {
        let result = self.evaluate_policy_set(context)?;
        trace!(policy_set = %self.def.id, decision = ?result.decision(), "policy set evaluated");
        trace_result(context, NodeKind::PolicySet, &self.def.id, &result);
        Ok(result)
    }

    fn declared_effect(&self) -> Option<Effect> {
        self.algorithm
            .get()?
            .declared_effect(self.combining_elements())
    }
}

/// A policy or policy set that can be the target of an id reference
pub trait Referenceable: Evaluatable + Sized {
    /// Trace kind of a reference to this node type
    const REFERENCE_KIND: NodeKind;

    /// Ask the context for the node matching `id_match`
    ///
    /// # Errors
    ///
    /// Returns the status explaining why nothing was found
    fn resolve(
        context: &dyn EvaluationContext,
        id_match: &IdReferenceMatch,
    ) -> std::result::Result<Arc<Self>, Status>;

    /// Id and version of this node
    fn id_reference(&self) -> IdReference;
}

impl Referenceable for Policy {
    const REFERENCE_KIND: NodeKind = NodeKind::PolicyReference;

    fn resolve(
        context: &dyn EvaluationContext,
        id_match: &IdReferenceMatch,
    ) -> std::result::Result<Arc<Self>, Status> {
        context.get_policy(id_match)
    }

    fn id_reference(&self) -> IdReference {
        IdReference::new(self.id().clone(), self.version().clone())
    }
}

impl Referenceable for PolicySet {
    const REFERENCE_KIND: NodeKind = NodeKind::PolicySetReference;

    fn resolve(
        context: &dyn EvaluationContext,
        id_match: &IdReferenceMatch,
    ) -> std::result::Result<Arc<Self>, Status> {
        context.get_policy_set(id_match)
    }

    fn id_reference(&self) -> IdReference {
        IdReference::new(self.id().clone(), self.version().clone())
    }
}

/// An id reference to a policy or policy set, resolved through the context
///
/// A successful resolution is cached for the reference's lifetime; a failed
/// one is retried on the next evaluation.
pub struct Reference<T> {
    id_match: IdReferenceMatch,
    resolved: OnceLock<Arc<T>>,
}

/// Reference to a policy
pub type PolicyIdReference = Reference<Policy>;

/// Reference to a policy set
pub type PolicySetIdReference = Reference<PolicySet>;

impl<T: Referenceable> Reference<T> {
    /// Create an unresolved reference
    #[must_use]
    pub fn new(id_match: IdReferenceMatch) -> Self {
        Self {
            id_match,
            resolved: OnceLock::new(),
        }
    }

    /// The id/version constraints
    #[must_use]
    pub fn id_match(&self) -> &IdReferenceMatch {
        &self.id_match
    }

    /// The resolved target, if resolution already succeeded
    #[must_use]
    pub fn resolved(&self) -> Option<&Arc<T>> {
        self.resolved.get()
    }

    /// Resolve the reference, caching a success
    ///
    /// # Errors
    ///
    /// Returns the context's status prefixed with the referenced id
    pub fn resolve(&self, context: &dyn EvaluationContext) -> std::result::Result<&Arc<T>, Status> {
        if let Some(target) = self.resolved.get() {
            return Ok(target);
        }
        match T::resolve(context, &self.id_match) {
            Ok(target) => Ok(self.resolved.get_or_init(|| target)),
            Err(status) => {
                debug!(reference = %self.id_match, %status, "unresolved reference");
                Err(status.prefixed(self.id_match.id().short()))
            }
        }
    }
}

impl<T> fmt::Debug for Reference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reference")
            .field("id_match", &self.id_match)
            .field("resolved", &self.resolved.get().is_some())
            .finish()
    }
}

impl<T: Referenceable> Matchable for Reference<T> {
    fn match_request(&self, context: &dyn EvaluationContext) -> MatchResult {
        match self.resolve(context) {
            Ok(target) => target.match_request(context),
            Err(status) => MatchResult::indeterminate(status),
        }
    }
}

impl<T: Referenceable> Evaluatable for Reference<T> {
    fn id(&self) -> &Identifier {
        self.id_match.id()
    }

    fn evaluate(&self, context: &dyn EvaluationContext) -> Result<EvaluationResult> {
        let result = match self.resolve(context) {
            Ok(target) => {
                let entered = ActiveReference::enter(T::REFERENCE_KIND, target.id_reference());
                match entered {
                    Some(_active) => target.evaluate(context)?,
                    None => {
                        debug!(reference = %self.id_match, "circular reference");
                        let status = Status::processing_error(format!(
                            "Circular reference to {}",
                            self.id_match
                        ));
                        EvaluationResult::indeterminate(status.prefixed(self.id_match.id().short()))
                    }
                }
            }
            Err(status) => EvaluationResult::indeterminate(status),
        };
        trace_result(context, T::REFERENCE_KIND, self.id_match.id(), &result);
        Ok(result)
    }
}

thread_local! {
    // Nodes this thread is currently evaluating through a reference.
    static ACTIVE_REFERENCES: RefCell<Vec<(NodeKind, IdReference)>> =
        const { RefCell::new(Vec::new()) };
}

/// Marks a referenced node as entered until dropped
struct ActiveReference(NodeKind, IdReference);

impl ActiveReference {
    /// `None` when the node is already being evaluated further up the stack
    fn enter(kind: NodeKind, node: IdReference) -> Option<Self> {
        ACTIVE_REFERENCES.with(|active| {
            let mut active = active.borrow_mut();
            if active.iter().any(|(k, n)| *k == kind && *n == node) {
                return None;
            }
            active.push((kind, node.clone()));
            Some(Self(kind, node))
        })
    }
}

impl Drop for ActiveReference {
    fn drop(&mut self) {
        ACTIVE_REFERENCES.with(|active| {
            let mut active = active.borrow_mut();
            let entered = active
                .iter()
                .rposition(|(kind, node)| *kind == self.0 && *node == self.1);
            if let Some(position) = entered {
                active.remove(position);
            }
        });
    }
}

/// A child of a policy set
#[derive(Debug, Clone)]
pub enum PolicyNode {
    /// An inline policy
    Policy(Arc<Policy>),
    /// An inline policy set
    PolicySet(Arc<PolicySet>),
    /// A reference to a policy
    PolicyReference(Arc<PolicyIdReference>),
    /// A reference to a policy set
    PolicySetReference(Arc<PolicySetIdReference>),
}

impl PolicyNode {
    /// Identifier of the node (the referenced id for references)
    #[must_use]
    pub fn id(&self) -> &Identifier {
        match self {
            Self::Policy(policy) => policy.id(),
            Self::PolicySet(policy_set) => policy_set.id(),
            Self::PolicyReference(reference) => reference.id_match().id(),
            Self::PolicySetReference(reference) => reference.id_match().id(),
        }
    }

    /// Trace kind of the node
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Policy(_) => NodeKind::Policy,
            Self::PolicySet(_) => NodeKind::PolicySet,
            Self::PolicyReference(_) => NodeKind::PolicyReference,
            Self::PolicySetReference(_) => NodeKind::PolicySetReference,
        }
    }

    /// Reference to a policy
    #[must_use]
    pub fn policy_reference(id_match: IdReferenceMatch) -> Self {
        Self::PolicyReference(Arc::new(Reference::new(id_match)))
    }

    /// Reference to a policy set
    #[must_use]
    pub fn policy_set_reference(id_match: IdReferenceMatch) -> Self {
        Self::PolicySetReference(Arc::new(Reference::new(id_match)))
    }
}

impl From<Policy> for PolicyNode {
    fn from(policy: Policy) -> Self {
        Self::Policy(Arc::new(policy))
    }
}

impl From<Arc<Policy>> for PolicyNode {
    fn from(policy: Arc<Policy>) -> Self {
        Self::Policy(policy)
    }
}

impl From<PolicySet> for PolicyNode {
    fn from(policy_set: PolicySet) -> Self {
        Self::PolicySet(Arc::new(policy_set))
    }
}

impl From<Arc<PolicySet>> for PolicyNode {
    fn from(policy_set: Arc<PolicySet>) -> Self {
        Self::PolicySet(policy_set)
    }
}

impl Matchable for PolicyNode {
    fn match_request(&self, context: &dyn EvaluationContext) -> MatchResult {
        match self {
            Self::Policy(policy) => policy.match_request(context),
            Self::PolicySet(policy_set) => policy_set.match_request(context),
            Self::PolicyReference(reference) => reference.match_request(context),
            Self::PolicySetReference(reference) => reference.match_request(context),
        }
    }
}

impl Evaluatable for PolicyNode {
    fn id(&self) -> &Identifier {
        PolicyNode::id(self)
    }

    fn evaluate(&self, context: &dyn EvaluationContext) -> Result<EvaluationResult> {
        match self {
            Self::Policy(policy) => policy.evaluate(context),
            Self::PolicySet(policy_set) => policy_set.evaluate(context),
            Self::PolicyReference(reference) => reference.evaluate(context),
            Self::PolicySetReference(reference) => reference.evaluate(context),
        }
    }

    // References stay undeclared so a cyclic store cannot recurse here.
    fn declared_effect(&self) -> Option<Effect> {
        match self {
            Self::Policy(policy) => policy.declared_effect(),
            Self::PolicySet(policy_set) => policy_set.declared_effect(),
            Self::PolicyReference(_) | Self::PolicySetReference(_) => None,
        }
    }
}
