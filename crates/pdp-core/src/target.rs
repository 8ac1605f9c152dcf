//! Applicability matching: Target, AnyOf, AllOf, Match
//!
//! Matching is three-valued. A [`Target`] is a conjunction of [`AnyOf`]s, an
//! `AnyOf` a disjunction of [`AllOf`]s, an `AllOf` a conjunction of
//! [`Match`]es. Children are scanned in order; the first decisive child
//! short-circuits and otherwise the *first* Indeterminate child is reported,
//! so the status a caller sees depends on child order.

use crate::context::EvaluationContext;
use crate::defaults::PolicyDefaults;
use crate::expression::{AttributeRetrieval, ExpressionResult, FunctionArgument};
use crate::function::FunctionDefinition;
use crate::identifier::Identifier;
use crate::registry::Registry;
use crate::status::{validate_once, Status};
use crate::value::{AttributeValue, DataType};
use std::sync::{Arc, OnceLock};

/// Outcome code of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchCode {
    /// Applies
    Match,
    /// Does not apply
    NoMatch,
    /// Applicability could not be determined
    Indeterminate,
}

/// Result of matching a node against the request
///
/// An Indeterminate result always carries a non-Ok status; Match and NoMatch
/// always carry Ok.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    code: MatchCode,
    status: Status,
}

impl MatchResult {
    /// A Match result
    #[must_use]
    pub const fn matched() -> Self {
        Self {
            code: MatchCode::Match,
            status: Status::OK,
        }
    }

    /// A NoMatch result
    #[must_use]
    pub const fn no_match() -> Self {
        Self {
            code: MatchCode::NoMatch,
            status: Status::OK,
        }
    }

    /// An Indeterminate result with its cause
    #[must_use]
    pub fn indeterminate(status: Status) -> Self {
        let status = if status.is_ok() {
            Status::processing_error("Indeterminate match")
        } else {
            status
        };
        Self {
            code: MatchCode::Indeterminate,
            status,
        }
    }

    /// The match code
    #[must_use]
    pub const fn code(&self) -> MatchCode {
        self.code
    }

    /// The status
    #[must_use]
    pub const fn status(&self) -> &Status {
        &self.status
    }

    /// Consume the result, returning its status
    #[must_use]
    pub fn into_status(self) -> Status {
        self.status
    }
}

/// Something that can decide whether it applies to the current request
pub trait Matchable {
    /// Match against the request held by `context`
    fn match_request(&self, context: &dyn EvaluationContext) -> MatchResult;
}

/// One applicability test: `function(literal, attribute)`
#[derive(Debug, Clone)]
pub struct Match {
    match_id: Identifier,
    attribute_value: AttributeValue,
    retrieval: Option<Arc<dyn AttributeRetrieval>>,
    defaults: Arc<PolicyDefaults>,
    function: OnceLock<Arc<dyn FunctionDefinition>>,
    validated: OnceLock<Status>,
}

impl Match {
    /// Create a match
    #[must_use]
    pub fn new(
        match_id: impl Into<Identifier>,
        attribute_value: AttributeValue,
        retrieval: impl AttributeRetrieval + 'static,
    ) -> Self {
        Self::with_retrieval(match_id, attribute_value, Some(Arc::new(retrieval)))
    }

    /// Create a match from an already shared retrieval (or none, which fails validation)
    #[must_use]
    pub fn with_retrieval(
        match_id: impl Into<Identifier>,
        attribute_value: AttributeValue,
        retrieval: Option<Arc<dyn AttributeRetrieval>>,
    ) -> Self {
        Self {
            match_id: match_id.into(),
            attribute_value,
            retrieval,
            defaults: Arc::default(),
            function: OnceLock::new(),
            validated: OnceLock::new(),
        }
    }

    /// The match function identifier
    #[must_use]
    pub fn match_id(&self) -> &Identifier {
        &self.match_id
    }

    /// The literal attribute value
    #[must_use]
    pub fn attribute_value(&self) -> &AttributeValue {
        &self.attribute_value
    }

    /// The defaults in scope for this match
    #[must_use]
    pub fn defaults(&self) -> &Arc<PolicyDefaults> {
        &self.defaults
    }

    fn inherit_defaults(&mut self, defaults: &Arc<PolicyDefaults>) {
        self.defaults = Arc::clone(defaults);
    }

    fn function(&self, registry: &Registry) -> Result<&Arc<dyn FunctionDefinition>, Status> {
        if let Some(function) = self.function.get() {
            return Ok(function);
        }
        let function = registry
            .function(&self.match_id)
            .ok_or_else(|| Status::syntax_error(format!("Unknown MatchId \"{}\"", self.match_id)))?;
        Ok(self.function.get_or_init(|| function))
    }

    /// Structural validation, cached after the first call
    ///
    /// The match function must exist and be declared to return a single boolean.
    ///
    /// # Errors
    ///
    /// Returns a syntax-error status describing the defect
    pub fn validate(&self, registry: &Registry) -> Result<(), Status> {
        validate_once(&self.validated, || self.check(registry))
    }

    fn check(&self, registry: &Registry) -> Result<(), Status> {
        let retrieval = self.retrieval.as_ref().ok_or_else(|| {
            Status::syntax_error("Missing AttributeDesignator or AttributeSelector")
        })?;
        let function = self.function(registry)?;
        if function.returns_bag() || function.data_type_id() != Some(DataType::Boolean) {
            return Err(Status::syntax_error(format!(
                "Match function \"{}\" does not return a single boolean",
                self.match_id
            )));
        }
        retrieval.validate()
    }

    fn apply(
        &self,
        context: &dyn EvaluationContext,
        function: &dyn FunctionDefinition,
        value: &AttributeValue,
    ) -> MatchResult {
        let arguments = [
            FunctionArgument::Value(&self.attribute_value),
            FunctionArgument::Value(value),
        ];
        match function.evaluate(context, &arguments) {
            ExpressionResult::Error(status) => MatchResult::indeterminate(status),
            ExpressionResult::Single(AttributeValue::Boolean(true)) => MatchResult::matched(),
            ExpressionResult::Single(AttributeValue::Boolean(false)) => MatchResult::no_match(),
            _ => MatchResult::indeterminate(
                Status::processing_error("Non-boolean result from Match function")
                    .prefixed(function.short_id()),
            ),
        }
    }
}

impl Matchable for Match {
    fn match_request(&self, context: &dyn EvaluationContext) -> MatchResult {
        if let Err(status) = self.validate(context.registry()) {
            return MatchResult::indeterminate(status);
        }
        let (Some(retrieval), Ok(function)) =
            (self.retrieval.as_ref(), self.function(context.registry()))
        else {
            return MatchResult::indeterminate(Status::syntax_error("Incomplete Match"));
        };

        let defaults = self.defaults.or_root(context.root_defaults());
        let retrieved = match retrieval.evaluate(context, defaults) {
            Ok(result) => result,
            Err(err) => return MatchResult::indeterminate(Status::processing_error(err.to_string())),
        };

        match retrieved {
            ExpressionResult::Error(status) => MatchResult::indeterminate(status),
            ExpressionResult::Single(value) => self.apply(context, function.as_ref(), &value),
            ExpressionResult::EmptyBag => MatchResult::no_match(),
            ExpressionResult::Bag(bag) => {
                let mut fall_through = MatchResult::no_match();
                for value in &bag {
                    let result = self.apply(context, function.as_ref(), value);
                    match result.code() {
                        MatchCode::Match => return result,
                        MatchCode::Indeterminate if fall_through.code() == MatchCode::NoMatch => {
                            fall_through = result;
                        }
                        _ => {}
                    }
                }
                fall_through
            }
        }
    }
}

/// Conjunction of matches
#[derive(Debug, Clone, Default)]
pub struct AllOf {
    matches: Vec<Match>,
}

impl AllOf {
    /// Create a conjunction; an empty one fails validation
    #[must_use]
    pub fn new(matches: Vec<Match>) -> Self {
        Self { matches }
    }

    /// The matches
    #[must_use]
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Structural validation
    ///
    /// # Errors
    ///
    /// Returns a syntax error for an empty conjunction or an invalid match
    pub fn validate(&self, registry: &Registry) -> Result<(), Status> {
        if self.matches.is_empty() {
            return Err(Status::syntax_error("Missing Match in AllOf"));
        }
        self.matches.iter().try_for_each(|m| m.validate(registry))
    }
}

impl Matchable for AllOf {
    fn match_request(&self, context: &dyn EvaluationContext) -> MatchResult {
        if self.matches.is_empty() {
            return MatchResult::indeterminate(Status::syntax_error("Missing Match in AllOf"));
        }
        let mut first_indeterminate = None;
        for m in &self.matches {
            let result = m.match_request(context);
            match result.code() {
                MatchCode::NoMatch => return result,
                MatchCode::Indeterminate => {
                    first_indeterminate.get_or_insert(result);
                }
                MatchCode::Match => {}
            }
        }
        first_indeterminate.unwrap_or_else(MatchResult::matched)
    }
}

/// Disjunction of conjunctions
#[derive(Debug, Clone, Default)]
pub struct AnyOf {
    all_ofs: Vec<AllOf>,
}

impl AnyOf {
    /// Create a disjunction; an empty one never matches
    #[must_use]
    pub fn new(all_ofs: Vec<AllOf>) -> Self {
        Self { all_ofs }
    }

    /// The conjunctions
    #[must_use]
    pub fn all_ofs(&self) -> &[AllOf] {
        &self.all_ofs
    }

    /// Structural validation
    ///
    /// # Errors
    ///
    /// Returns the first invalid conjunction's status
    pub fn validate(&self, registry: &Registry) -> Result<(), Status> {
        self.all_ofs.iter().try_for_each(|a| a.validate(registry))
    }
}

impl Matchable for AnyOf {
    fn match_request(&self, context: &dyn EvaluationContext) -> MatchResult {
        let mut first_indeterminate = None;
        for all_of in &self.all_ofs {
            let result = all_of.match_request(context);
            match result.code() {
                MatchCode::Match => return result,
                MatchCode::Indeterminate => {
                    first_indeterminate.get_or_insert(result);
                }
                MatchCode::NoMatch => {}
            }
        }
        first_indeterminate.unwrap_or_else(MatchResult::no_match)
    }
}

/// Applicability filter of a rule, policy or policy set
///
/// An empty target matches every request.
#[derive(Debug, Clone, Default)]
pub struct Target {
    any_ofs: Vec<AnyOf>,
}

impl Target {
    /// Create a target
    #[must_use]
    pub fn new(any_ofs: Vec<AnyOf>) -> Self {
        Self { any_ofs }
    }

    /// A target matching everything
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// A target with a single match
    #[must_use]
    pub fn single(m: Match) -> Self {
        Self::new(vec![AnyOf::new(vec![AllOf::new(vec![m])])])
    }

    /// The disjunctions
    #[must_use]
    pub fn any_ofs(&self) -> &[AnyOf] {
        &self.any_ofs
    }

    /// Returns true if the target has no AnyOf
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.any_ofs.is_empty()
    }

    /// Point every match at the defaults scope of the owning node
    pub fn inherit_defaults(&mut self, defaults: &Arc<PolicyDefaults>) {
        self.any_ofs
            .iter_mut()
            .flat_map(|any_of| any_of.all_ofs.iter_mut())
            .flat_map(|all_of| all_of.matches.iter_mut())
            .for_each(|m| m.inherit_defaults(defaults));
    }

    /// Structural validation
    ///
    /// # Errors
    ///
    /// Returns the first invalid disjunction's status
    pub fn validate(&self, registry: &Registry) -> Result<(), Status> {
        self.any_ofs.iter().try_for_each(|a| a.validate(registry))
    }
}

impl Matchable for Target {
    fn match_request(&self, context: &dyn EvaluationContext) -> MatchResult {
        let mut result = MatchResult::matched();
        for any_of in &self.any_ofs {
            result = any_of.match_request(context);
            if result.code() != MatchCode::Match {
                return result;
            }
        }
        result
    }
}
