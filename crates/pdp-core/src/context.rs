//! The evaluation context: everything a policy tree needs from its caller

use crate::bag::Bag;
use crate::defaults::PolicyDefaults;
use crate::identifier::Identifier;
use crate::policy::{Policy, PolicySet};
use crate::registry::Registry;
use crate::request::{AttributeKey, Request};
use crate::result::EvaluationResult;
use crate::status::Status;
use crate::version::IdReferenceMatch;
use std::fmt;
use std::sync::Arc;

/// Per-request collaborator handed to every `evaluate` call
///
/// One context serves exactly one request. The policy tree itself holds no
/// per-request state, so any number of contexts may evaluate the same tree
/// concurrently.
pub trait EvaluationContext {
    /// The request being evaluated
    fn request(&self) -> &Request;

    /// Function and combining-algorithm lookup
    fn registry(&self) -> &Registry;

    /// Resolve a policy reference
    ///
    /// # Errors
    ///
    /// Returns the status explaining why no policy could be found
    fn get_policy(&self, id_match: &IdReferenceMatch) -> Result<Arc<Policy>, Status>;

    /// Resolve a policy-set reference
    ///
    /// # Errors
    ///
    /// Returns the status explaining why no policy set could be found
    fn get_policy_set(&self, id_match: &IdReferenceMatch) -> Result<Arc<PolicySet>, Status>;

    /// Retrieve the bag of values for an attribute
    ///
    /// The default reads the request only. Contexts backed by attribute
    /// sources override this; it may block.
    ///
    /// # Errors
    ///
    /// Returns the status of a failed retrieval
    fn get_attributes(&self, key: &AttributeKey) -> Result<Bag, Status> {
        Ok(self.request().attribute_values(key))
    }

    /// Outermost defaults scope, used underneath trees that declare none
    fn root_defaults(&self) -> Option<&PolicyDefaults> {
        None
    }

    /// Whether trace events should be produced
    fn is_tracing(&self) -> bool {
        false
    }

    /// Receive a trace event
    fn trace(&self, _event: TraceEvent) {}
}

/// Kind of node that produced a trace event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A rule
    Rule,
    /// A policy
    Policy,
    /// A policy set
    PolicySet,
    /// A policy id reference
    PolicyReference,
    /// A policy-set id reference
    PolicySetReference,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Rule => "Rule",
            Self::Policy => "Policy",
            Self::PolicySet => "PolicySet",
            Self::PolicyReference => "PolicyIdReference",
            Self::PolicySetReference => "PolicySetIdReference",
        };
        f.write_str(name)
    }
}

/// A trace event describing the outcome of one node's evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEvent {
    /// Node kind
    pub kind: NodeKind,
    /// Node identifier
    pub id: Identifier,
    /// Human-readable description
    pub message: String,
}

/// Emit a trace event for a node result, only building it when tracing is on
pub(crate) fn trace_result(
    context: &dyn EvaluationContext,
    kind: NodeKind,
    id: &Identifier,
    result: &EvaluationResult,
) {
    if context.is_tracing() {
        let message = if result.status().is_ok() {
            format!("{:?}", result.decision())
        } else {
            format!("{:?} ({})", result.decision(), result.status())
        };
        context.trace(TraceEvent {
            kind,
            id: id.clone(),
            message,
        });
    }
}
