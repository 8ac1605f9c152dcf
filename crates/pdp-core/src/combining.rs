//! The combining-algorithm contract
//!
//! A Policy hands its rules, and a PolicySet its children, to a
//! [`CombiningAlgorithm`] as a slice of [`CombiningElement`]s. The algorithm
//! evaluates elements as lazily as its semantics allow and folds the
//! results into one [`EvaluationResult`]. It never mutates the slice.

use crate::context::EvaluationContext;
use crate::error::Result;
use crate::identifier::Identifier;
use crate::result::{Effect, EvaluationResult};
use crate::target::{MatchResult, Matchable};
use crate::value::AttributeValue;
use std::fmt;
use std::sync::Arc;

/// A named parameter passed to a combining algorithm
#[derive(Debug, Clone, PartialEq)]
pub struct CombinerParameter {
    name: String,
    value: AttributeValue,
}

impl CombinerParameter {
    /// Create a parameter
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parameter name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter value
    #[must_use]
    pub fn value(&self) -> &AttributeValue {
        &self.value
    }
}

/// A combiner parameter addressed to one child (rule, policy or policy set) by id
#[derive(Debug, Clone, PartialEq)]
pub struct TargetedCombinerParameter {
    target_id: Identifier,
    parameter: CombinerParameter,
}

impl TargetedCombinerParameter {
    /// Create a targeted parameter
    #[must_use]
    pub fn new(target_id: impl Into<Identifier>, parameter: CombinerParameter) -> Self {
        Self {
            target_id: target_id.into(),
            parameter,
        }
    }

    /// Id of the child the parameter belongs to
    #[must_use]
    pub fn target_id(&self) -> &Identifier {
        &self.target_id
    }

    /// The parameter
    #[must_use]
    pub fn parameter(&self) -> &CombinerParameter {
        &self.parameter
    }
}

/// A node that combining algorithms can evaluate
pub trait Evaluatable: Matchable + fmt::Debug + Send + Sync {
    /// Identifier of the node
    fn id(&self) -> &Identifier;

    /// Run the validate/match/combine/decorate cycle
    ///
    /// # Errors
    ///
    /// Returns a fatal `EvaluationError`; ordinary failures are Indeterminate results
    fn evaluate(&self, context: &dyn EvaluationContext) -> Result<EvaluationResult>;

    /// The effect this node can produce, when it is statically known
    ///
    /// A Rule always knows its effect. Algorithms use it to tell an
    /// Indeterminate{P} from an Indeterminate{D}.
    fn declared_effect(&self) -> Option<Effect> {
        None
    }
}

/// A child wrapped together with the combiner parameters addressed to it
#[derive(Debug)]
pub struct CombiningElement<T: ?Sized> {
    evaluatable: Arc<T>,
    parameters: Vec<CombinerParameter>,
}

impl<T: ?Sized> Clone for CombiningElement<T> {
    fn clone(&self) -> Self {
        Self {
            evaluatable: Arc::clone(&self.evaluatable),
            parameters: self.parameters.clone(),
        }
    }
}

impl<T: Evaluatable + ?Sized> CombiningElement<T> {
    /// Wrap a child
    #[must_use]
    pub fn new(evaluatable: Arc<T>, parameters: Vec<CombinerParameter>) -> Self {
        Self {
            evaluatable,
            parameters,
        }
    }

    /// Wrap a child, picking its parameters out of a list of targeted ones
    #[must_use]
    pub fn with_targeted(evaluatable: Arc<T>, targeted: &[TargetedCombinerParameter]) -> Self {
        let parameters = targeted
            .iter()
            .filter(|p| p.target_id() == evaluatable.id())
            .map(|p| p.parameter().clone())
            .collect();
        Self::new(evaluatable, parameters)
    }

    /// The wrapped child
    #[must_use]
    pub fn evaluatable(&self) -> &Arc<T> {
        &self.evaluatable
    }

    /// Parameters addressed to this child
    #[must_use]
    pub fn parameters(&self) -> &[CombinerParameter] {
        &self.parameters
    }

    /// Evaluate the child
    ///
    /// # Errors
    ///
    /// Propagates the child's fatal error
    pub fn evaluate(&self, context: &dyn EvaluationContext) -> Result<EvaluationResult> {
        self.evaluatable.evaluate(context)
    }

    /// Match the child's target
    #[must_use]
    pub fn match_request(&self, context: &dyn EvaluationContext) -> MatchResult {
        self.evaluatable.match_request(context)
    }
}

/// Folds child decisions into one
///
/// `T` is the element type: [`Rule`](crate::Rule) for rule-combining
/// algorithms, [`PolicyNode`](crate::PolicyNode) for policy-combining ones.
pub trait CombiningAlgorithm<T: ?Sized>: fmt::Debug + Send + Sync {
    /// Algorithm identifier
    fn id(&self) -> &Identifier;

    /// Combine the elements
    ///
    /// # Errors
    ///
    /// Propagates a fatal error from a child's evaluation
    fn combine(
        &self,
        context: &dyn EvaluationContext,
        elements: &[CombiningElement<T>],
        parameters: &[CombinerParameter],
    ) -> Result<EvaluationResult>;

    /// The only effect a combination of `elements` can decide, if there is one
    ///
    /// The default fits algorithms that only ever pass a child's effect
    /// through: when every element declares the same effect, no other is
    /// possible. An algorithm that can decide an effect none of its children
    /// declared must return `None`.
    fn declared_effect(&self, elements: &[CombiningElement<T>]) -> Option<Effect>
    where
        T: Evaluatable,
    {
        let mut effects = elements
            .iter()
            .map(|element| element.evaluatable().declared_effect());
        let first = effects.next()??;
        effects.all(|effect| effect == Some(first)).then_some(first)
    }
}
