//! Test fixtures shared by the integration tests
//!
//! Small fake collaborators: a context backed by in-memory policy lists, a
//! retrieval returning a fixed result, a handful of functions and a
//! first-applicable algorithm.

#![allow(dead_code)]

use pdp_core::{
    AttributeRetrieval, AttributeValue, Bag, CombinerParameter, CombiningAlgorithm,
    CombiningElement, DataType, Decision, Evaluatable, EvaluationContext, EvaluationError,
    EvaluationResult, ExpressionResult, FunctionArgument, FunctionDefinition, IdReferenceMatch,
    Identifier, Match, Policy, PolicyDefaults, PolicyNode, PolicySet, Registry, Request, Rule,
    Status, TraceEvent,
};
use std::cell::{Cell, RefCell};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Send the engine's `tracing` output to the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("trace"))
        .with_test_writer()
        .try_init();
}

pub const SCRIPTED: &str = "urn:test:function:scripted";
pub const STRING_EQUAL: &str = "urn:test:function:string-equal";
pub const BAG_OF: &str = "urn:test:function:bag-of";
pub const FIRST_APPLICABLE: &str = "urn:test:combining-algorithm:first-applicable";

/// Retrieval returning a clone of a fixed result, counting its calls
#[derive(Debug)]
pub struct FixedRetrieval {
    result: ExpressionResult,
    calls: Arc<AtomicUsize>,
}

impl FixedRetrieval {
    pub fn new(result: impl Into<ExpressionResult>) -> Self {
        Self {
            result: result.into(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn string(value: &str) -> Self {
        Self::new(AttributeValue::string(value))
    }

    pub fn strings(values: &[&str]) -> Self {
        Self::new(ExpressionResult::bag(
            values.iter().map(|v| AttributeValue::string(*v)).collect(),
        ))
    }

    /// Shared call counter, readable after the retrieval was moved into a tree
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl AttributeRetrieval for FixedRetrieval {
    fn evaluate(
        &self,
        _context: &dyn EvaluationContext,
        _defaults: &PolicyDefaults,
    ) -> pdp_core::Result<ExpressionResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.result.clone())
    }
}

/// Retrieval that always fails with a collaborator fault
#[derive(Debug)]
pub struct FailingRetrieval;

impl AttributeRetrieval for FailingRetrieval {
    fn evaluate(
        &self,
        _context: &dyn EvaluationContext,
        _defaults: &PolicyDefaults,
    ) -> pdp_core::Result<ExpressionResult> {
        Err(EvaluationError::processing("attribute source unavailable"))
    }
}

/// Retrieval yielding the XPath version in scope
#[derive(Debug)]
pub struct XPathVersionRetrieval;

impl AttributeRetrieval for XPathVersionRetrieval {
    fn evaluate(
        &self,
        _context: &dyn EvaluationContext,
        defaults: &PolicyDefaults,
    ) -> pdp_core::Result<ExpressionResult> {
        Ok(AttributeValue::string(defaults.xpath_version()).into())
    }
}

/// Match function whose result is dictated by its literal argument:
/// `"match"` is true, `"nomatch"` false, anything else an error carrying the literal
#[derive(Debug)]
pub struct Scripted(Identifier);

impl FunctionDefinition for Scripted {
    fn id(&self) -> &Identifier {
        &self.0
    }

    fn data_type_id(&self) -> Option<DataType> {
        Some(DataType::Boolean)
    }

    fn returns_bag(&self) -> bool {
        false
    }

    fn evaluate(
        &self,
        _context: &dyn EvaluationContext,
        arguments: &[FunctionArgument<'_>],
    ) -> ExpressionResult {
        match arguments.first().and_then(FunctionArgument::value) {
            Some(AttributeValue::String(s)) if s == "match" => ExpressionResult::boolean(true),
            Some(AttributeValue::String(s)) if s == "nomatch" => ExpressionResult::boolean(false),
            Some(other) => Status::processing_error(other.to_string())
                .prefixed(self.short_id())
                .into(),
            None => ExpressionResult::processing_error("no literal"),
        }
    }
}

/// String equality over exactly two single-value arguments
#[derive(Debug)]
pub struct StringEqual(Identifier);

impl FunctionDefinition for StringEqual {
    fn id(&self) -> &Identifier {
        &self.0
    }

    fn data_type_id(&self) -> Option<DataType> {
        Some(DataType::Boolean)
    }

    fn returns_bag(&self) -> bool {
        false
    }

    fn evaluate(
        &self,
        _context: &dyn EvaluationContext,
        arguments: &[FunctionArgument<'_>],
    ) -> ExpressionResult {
        if let Err(status) = pdp_core::expect_arguments(&self.0, arguments, 2) {
            return status.into();
        }
        let converted: Result<Vec<String>, Status> = arguments
            .iter()
            .map(|argument| pdp_core::ConvertedArgument::<String>::scalar(&self.0, argument))
            .collect();
        match converted {
            Ok(values) => ExpressionResult::boolean(values[0] == values[1]),
            Err(status) => status.into(),
        }
    }
}

/// Returns its arguments as a bag; declared as bag-returning
#[derive(Debug)]
pub struct BagOf(Identifier);

impl FunctionDefinition for BagOf {
    fn id(&self) -> &Identifier {
        &self.0
    }

    fn data_type_id(&self) -> Option<DataType> {
        Some(DataType::Boolean)
    }

    fn returns_bag(&self) -> bool {
        true
    }

    fn evaluate(
        &self,
        _context: &dyn EvaluationContext,
        arguments: &[FunctionArgument<'_>],
    ) -> ExpressionResult {
        arguments
            .iter()
            .filter_map(FunctionArgument::value)
            .cloned()
            .collect::<Bag>()
            .into()
    }
}

/// First child whose decision is not NotApplicable wins
#[derive(Debug)]
pub struct FirstApplicable(Identifier);

impl FirstApplicable {
    pub fn new() -> Self {
        Self(Identifier::new(FIRST_APPLICABLE))
    }
}

impl<T: Evaluatable + ?Sized> CombiningAlgorithm<T> for FirstApplicable {
    fn id(&self) -> &Identifier {
        &self.0
    }

    fn combine(
        &self,
        context: &dyn EvaluationContext,
        elements: &[CombiningElement<T>],
        _parameters: &[CombinerParameter],
    ) -> pdp_core::Result<EvaluationResult> {
        for element in elements {
            let result = element.evaluate(context)?;
            if result.decision() != Decision::NotApplicable {
                return Ok(result);
            }
        }
        Ok(EvaluationResult::not_applicable())
    }
}

pub fn registry() -> Arc<Registry> {
    let mut registry = Registry::new();
    registry.register_function(Arc::new(Scripted(Identifier::new(SCRIPTED))));
    registry.register_function(Arc::new(StringEqual(Identifier::new(STRING_EQUAL))));
    registry.register_function(Arc::new(BagOf(Identifier::new(BAG_OF))));
    registry.register_rule_algorithm(Arc::new(FirstApplicable::new()));
    registry.register_policy_algorithm(Arc::new(FirstApplicable::new()));
    Arc::new(registry)
}

/// A match whose outcome is fixed by `script` (`"match"`, `"nomatch"` or an error message)
pub fn scripted(script: &str) -> Match {
    Match::new(
        SCRIPTED,
        AttributeValue::string(script),
        FixedRetrieval::string("ignored"),
    )
}

/// Context over in-memory policy lists, recording trace events and lookups
pub struct TestContext {
    request: Request,
    registry: Arc<Registry>,
    policies: Vec<Arc<Policy>>,
    policy_sets: Vec<Arc<PolicySet>>,
    tracing: bool,
    pub events: RefCell<Vec<TraceEvent>>,
    pub lookups: Cell<usize>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_request(Request::new())
    }

    pub fn with_request(request: Request) -> Self {
        Self {
            request,
            registry: registry(),
            policies: Vec::new(),
            policy_sets: Vec::new(),
            tracing: false,
            events: RefCell::new(Vec::new()),
            lookups: Cell::new(0),
        }
    }

    pub fn with_policy(mut self, policy: Arc<Policy>) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn with_policy_set(mut self, policy_set: Arc<PolicySet>) -> Self {
        self.policy_sets.push(policy_set);
        self
    }

    pub fn tracing(mut self) -> Self {
        self.tracing = true;
        self
    }
}

impl EvaluationContext for TestContext {
    fn request(&self) -> &Request {
        &self.request
    }

    fn registry(&self) -> &Registry {
        &self.registry
    }

    fn get_policy(&self, id_match: &IdReferenceMatch) -> Result<Arc<Policy>, Status> {
        self.lookups.set(self.lookups.get() + 1);
        self.policies
            .iter()
            .find(|p| id_match.matches(p.id(), p.version()))
            .cloned()
            .ok_or_else(|| Status::processing_error(format!("No matching policy found for {id_match}")))
    }

    fn get_policy_set(&self, id_match: &IdReferenceMatch) -> Result<Arc<PolicySet>, Status> {
        self.lookups.set(self.lookups.get() + 1);
        self.policy_sets
            .iter()
            .find(|p| id_match.matches(p.id(), p.version()))
            .cloned()
            .ok_or_else(|| {
                Status::processing_error(format!("No matching policy set found for {id_match}"))
            })
    }

    fn is_tracing(&self) -> bool {
        self.tracing
    }

    fn trace(&self, event: TraceEvent) {
        self.events.borrow_mut().push(event);
    }
}

pub fn permit_rule(id: &str) -> Rule {
    Rule::new(id, pdp_core::Effect::Permit)
}

pub fn node(policy: Policy) -> PolicyNode {
    PolicyNode::from(policy)
}
