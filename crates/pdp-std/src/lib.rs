// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 P47H Team <https://p47h.com>

//! # pdp-std
//!
//! Standard collaborators for `pdp-core`:
//! - A small XACML function library ([`functions`])
//! - The standard rule- and policy-combining algorithms ([`combining`])
//! - An attribute designator reading the request ([`AttributeDesignator`])
//! - An in-memory policy store and evaluation context
//! - TOML configuration ([`PdpConfig`])
//!
//! [`Pdp`] ties them together:
//!
//! ```
//! use pdp_core::{category, Attribute, DataType, Decision, Expression, PolicyBuilder, Request};
//! use pdp_std::{combining, functions, AttributeDesignator, Pdp};
//!
//! let is_admin = Expression::apply(
//!     functions::ids::STRING_IS_IN,
//!     vec![
//!         Expression::value("admin"),
//!         Expression::retrieval(AttributeDesignator::new(
//!             category::ACCESS_SUBJECT,
//!             "role",
//!             DataType::String,
//!         )),
//!     ],
//! );
//! let policy = PolicyBuilder::new("urn:example:admins")
//!     .rule_combining_algorithm(combining::ids::RULE_DENY_UNLESS_PERMIT)
//!     .add_rule_with("urn:example:rule:admin", |rule| rule.permit().condition(is_admin))?
//!     .build()?;
//!
//! let request = Request::new().with_attribute(Attribute::new(
//!     category::ACCESS_SUBJECT,
//!     "role",
//!     vec!["admin".into()],
//! ));
//! assert_eq!(Pdp::new(policy).evaluate(request)?.decision(), Decision::Permit);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod combining;
pub mod config;
pub mod context;
pub mod designator;
pub mod error;
pub mod functions;
pub mod pdp;
pub mod registry;
pub mod store;

pub use config::PdpConfig;
pub use context::MemoryContext;
pub use designator::AttributeDesignator;
pub use error::{ConfigError, Result};
pub use pdp::Pdp;
pub use registry::standard_registry;
pub use store::PolicyStore;
