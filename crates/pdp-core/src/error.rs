//! Error types for pdp-core
//!
//! Most evaluation failures are not errors at all: they travel as a
//! [`Status`](crate::Status) inside an Indeterminate result. The types here
//! cover what cannot be expressed that way.

use thiserror::Error;

/// Result type alias for evaluation operations
pub type Result<T, E = EvaluationError> = std::result::Result<T, E>;

/// Fatal evaluation errors that abort the whole request
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// An obligation expression is structurally incomplete
    #[error("Invalid obligation expression: {0}")]
    InvalidObligation(String),

    /// An advice expression is structurally incomplete
    #[error("Invalid advice expression: {0}")]
    InvalidAdvice(String),

    /// A collaborator (attribute retrieval, function, algorithm) failed
    #[error("Evaluation failed: {0}")]
    Processing(String),
}

impl EvaluationError {
    /// Create a processing error
    pub fn processing(message: impl Into<String>) -> Self {
        Self::Processing(message.into())
    }
}

/// Errors raised while assembling a policy tree
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// A required field was not supplied
    #[error("{element} is missing required field `{field}`")]
    MissingField {
        /// Element being built
        element: &'static str,
        /// Missing field
        field: &'static str,
    },

    /// Malformed version string
    #[error("Invalid version \"{0}\"")]
    InvalidVersion(String),

    /// Malformed version-match pattern
    #[error("Invalid version match \"{0}\"")]
    InvalidVersionMatch(String),
}
