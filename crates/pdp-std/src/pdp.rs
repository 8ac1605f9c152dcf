//! A ready-to-use decision point over one root policy

use crate::config::PdpConfig;
use crate::context::MemoryContext;
use crate::registry::standard_registry;
use crate::store::PolicyStore;
use pdp_core::{Evaluatable, EvaluationResult, PolicyNode, Registry, Request};
use std::sync::Arc;
use tracing::debug;

/// Evaluates requests against a root policy or policy set
///
/// Cheap to clone; clones share the registry, the store and the policy tree,
/// and may evaluate concurrently.
///
/// # Example
///
/// ```
/// use pdp_core::{Decision, PolicyBuilder, Request};
/// use pdp_std::{combining::ids, Pdp};
///
/// let policy = PolicyBuilder::new("urn:example:policy")
///     .rule_combining_algorithm(ids::RULE_DENY_UNLESS_PERMIT)
///     .add_rule_with("urn:example:rule:permit-all", |rule| rule.permit())?
///     .build()?;
///
/// let pdp = Pdp::new(policy);
/// let result = pdp.evaluate(Request::new())?;
/// assert_eq!(result.decision(), Decision::Permit);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Pdp {
    root: PolicyNode,
    registry: Arc<Registry>,
    store: Arc<PolicyStore>,
    config: PdpConfig,
}

impl Pdp {
    /// Create a decision point with the standard registry, an empty store and
    /// the default configuration
    #[must_use]
    pub fn new(root: impl Into<PolicyNode>) -> Self {
        Self {
            root: root.into(),
            registry: Arc::new(standard_registry()),
            store: Arc::default(),
            config: PdpConfig::default(),
        }
    }

    /// Use another registry
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    /// Resolve references against `store`
    #[must_use]
    pub fn with_store(mut self, store: Arc<PolicyStore>) -> Self {
        self.store = store;
        self
    }

    /// Use another configuration
    #[must_use]
    pub fn with_config(mut self, config: PdpConfig) -> Self {
        self.config = config;
        self
    }

    /// The root node
    #[must_use]
    pub fn root(&self) -> &PolicyNode {
        &self.root
    }

    /// The context `request` would be evaluated in
    #[must_use]
    pub fn context(&self, request: Request) -> MemoryContext {
        MemoryContext::new(
            request,
            Arc::clone(&self.registry),
            Arc::clone(&self.store),
            self.config.clone(),
        )
    }

    /// Evaluate one request
    ///
    /// # Errors
    ///
    /// Returns `EvaluationError` when an obligation or advice expression is
    /// structurally invalid, or when a collaborator fails fatally
    pub fn evaluate(&self, request: Request) -> pdp_core::Result<EvaluationResult> {
        let context = self.context(request);
        let result = self.root.evaluate(&context)?;
        debug!(
            root = self.root.id().short(),
            decision = ?result.decision(),
            status = %result.status(),
            "request evaluated"
        );
        Ok(result)
    }
}
