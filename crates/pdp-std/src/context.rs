//! In-memory evaluation context

use crate::config::PdpConfig;
use crate::registry::standard_registry;
use crate::store::PolicyStore;
use pdp_core::{
    EvaluationContext, IdReferenceMatch, Policy, PolicyDefaults, PolicySet, Registry, Request,
    Status, TraceEvent,
};
use std::sync::Arc;
use tracing::debug;

/// Evaluation context for one request against a shared registry and store
///
/// Attributes come from the request alone. The configured XPath version
/// roots every defaults chain that declares none. Trace events are forwarded
/// to `tracing` at debug level when the configuration enables tracing.
#[derive(Debug, Clone)]
pub struct MemoryContext {
    request: Request,
    registry: Arc<Registry>,
    store: Arc<PolicyStore>,
    config: PdpConfig,
    root_defaults: Arc<PolicyDefaults>,
}

impl MemoryContext {
    /// Create a context
    ///
    /// A request that does not say whether it wants policy identifiers gets
    /// the configured default.
    #[must_use]
    pub fn new(
        request: Request,
        registry: Arc<Registry>,
        store: Arc<PolicyStore>,
        config: PdpConfig,
    ) -> Self {
        let request = match request.return_policy_id_list_specified() {
            Some(_) => request,
            None => request.with_return_policy_id_list(config.return_policy_id_list()),
        };
        Self {
            request,
            registry,
            store,
            root_defaults: config.root_defaults(),
            config,
        }
    }

    /// Context over the standard registry, an empty store and default configuration
    #[must_use]
    pub fn with_request(request: Request) -> Self {
        Self::new(
            request,
            Arc::new(standard_registry()),
            Arc::default(),
            PdpConfig::default(),
        )
    }

    /// The policy store
    #[must_use]
    pub fn store(&self) -> &Arc<PolicyStore> {
        &self.store
    }

    /// The configuration
    #[must_use]
    pub fn config(&self) -> &PdpConfig {
        &self.config
    }
}

impl Default for MemoryContext {
    fn default() -> Self {
        Self::with_request(Request::new())
    }
}

impl EvaluationContext for MemoryContext {
    fn request(&self) -> &Request {
        &self.request
    }

    fn registry(&self) -> &Registry {
        &self.registry
    }

    fn get_policy(&self, id_match: &IdReferenceMatch) -> Result<Arc<Policy>, Status> {
        self.store.find_policy(id_match)
    }

    fn get_policy_set(&self, id_match: &IdReferenceMatch) -> Result<Arc<PolicySet>, Status> {
        self.store.find_policy_set(id_match)
    }

    fn root_defaults(&self) -> Option<&PolicyDefaults> {
        Some(&self.root_defaults)
    }

    fn is_tracing(&self) -> bool {
        self.config.trace()
    }

    fn trace(&self, event: TraceEvent) {
        debug!(kind = %event.kind, id = %event.id, "{}", event.message);
    }
}
