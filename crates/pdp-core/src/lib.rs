// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 P47H Team <https://p47h.com>

//! # pdp-core
//!
//! XACML policy evaluation engine.
//!
//! This crate provides the decision tree and the logic that walks it:
//! - Three-valued target matching (Target, AnyOf, AllOf, Match)
//! - Rules, policies, policy sets and id references
//! - The combining-algorithm contract
//! - Expressions, conditions, bags and typed function arguments
//! - Obligations, advice and inheritable policy defaults
//!
//! Function bodies, combining algorithms, attribute sources and policy
//! storage are collaborators plugged in through [`Registry`] and
//! [`EvaluationContext`]; the `pdp-std` crate ships a standard set.
//!
//! ## Concurrency
//!
//! A built tree is read-only. Lazily computed state (resolved functions,
//! algorithms and references, combining-element lists, validation results)
//! lives in `OnceLock`s, so one tree can be evaluated from many threads,
//! each with its own context.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod assignment;
pub mod bag;
pub mod builder;
pub mod combining;
pub mod context;
pub mod defaults;
pub mod error;
pub mod expression;
pub mod function;
pub mod identifier;
pub mod obligation;
pub mod policy;
pub mod registry;
pub mod request;
pub mod result;
pub mod rule;
pub mod status;
pub mod target;
pub mod value;
pub mod version;

pub use assignment::{AttributeAssignment, AttributeAssignmentExpression, AttributeAssignmentResult};
pub use bag::Bag;
pub use builder::{PolicyBuilder, PolicySetBuilder, RuleBuilder};
pub use combining::{
    CombinerParameter, CombiningAlgorithm, CombiningElement, Evaluatable,
    TargetedCombinerParameter,
};
pub use context::{EvaluationContext, NodeKind, TraceEvent};
pub use defaults::{PolicyDefaults, DEFAULT_XPATH_VERSION};
/// Re-export commonly used types
pub use error::{BuildError, EvaluationError, Result};
pub use expression::{
    Apply, ArgumentExpression, AttributeRetrieval, Condition, ConvertedArgument, Expression,
    ExpressionResult, FunctionArgument, VariableDefinition,
};
pub use function::{expect_arguments, FunctionDefinition};
pub use identifier::Identifier;
pub use obligation::{Advice, AdviceExpression, Obligation, ObligationExpression};
pub use policy::{
    PolicyDef, Policy, PolicyIdReference, PolicyNode, PolicySet, PolicySetIdReference, Reference,
    Referenceable,
};
pub use registry::{PolicyCombiningAlgorithm, Registry, RuleCombiningAlgorithm};
pub use request::{category, Attribute, AttributeKey, Request};
pub use result::{Decision, Effect, EvaluationResult};
pub use rule::Rule;
pub use status::{Status, StatusCode};
pub use target::{AllOf, AnyOf, Match, MatchCode, MatchResult, Matchable, Target};
pub use value::{AttributeType, AttributeValue, DataType, Uri};
pub use version::{IdReference, IdReferenceMatch, Version, VersionMatch};
