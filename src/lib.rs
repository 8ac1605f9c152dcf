// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 P47H Team <https://p47h.com>

//! # xacml-pdp
//!
//! XACML policy decision point: the evaluation core plus a standard set of
//! collaborators.
//!
//! - **Evaluation core**: targets, rules, policies, policy sets, references,
//!   obligations and the combining contract
//! - **Standard library**: functions, combining algorithms, attribute
//!   designator, in-memory store and context, TOML configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use xacml_pdp::{Decision, Pdp, PolicyBuilder, Request};
//! use xacml_pdp::std_lib::combining::ids;
//!
//! let policy = PolicyBuilder::new("urn:example:policy")
//!     .rule_combining_algorithm(ids::RULE_PERMIT_UNLESS_DENY)
//!     .build()?;
//!
//! let result = Pdp::new(policy).evaluate(Request::new())?;
//! assert_eq!(result.decision(), Decision::Permit);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! This facade crate re-exports the following modules:
//!
//! - [`core`] - Evaluation engine (from `pdp-core`)
//! - [`std_lib`] - Standard collaborators (from `pdp-std`)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Evaluation engine module.
///
/// Re-exports `pdp_core`: the decision tree, matching and the combining contract.
pub mod core {
    pub use pdp_core::*;
}

/// Standard collaborators module.
///
/// Re-exports `pdp_std`: functions, combining algorithms, context, store and configuration.
pub mod std_lib {
    pub use pdp_std::*;
}

// Convenience re-exports at root level
pub use pdp_core::{
    Attribute, AttributeValue, DataType, Decision, Effect, EvaluationError, EvaluationResult,
    Expression, PolicyBuilder, PolicySetBuilder, Request, RuleBuilder, Status, StatusCode,
};
pub use pdp_std::{AttributeDesignator, Pdp, PdpConfig, PolicyStore};
