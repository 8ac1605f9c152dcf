//! Evaluation status carried by Indeterminate results

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// XACML status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCode {
    /// Evaluation succeeded
    Ok,
    /// A required attribute was not available
    MissingAttribute,
    /// Static structural defect in the policy
    SyntaxError,
    /// Runtime evaluation fault
    ProcessingError,
}

impl StatusCode {
    /// The XACML URN for this status code
    #[must_use]
    pub const fn urn(&self) -> &'static str {
        match self {
            Self::Ok => "urn:oasis:names:tc:xacml:1.0:status:ok",
            Self::MissingAttribute => "urn:oasis:names:tc:xacml:1.0:status:missing-attribute",
            Self::SyntaxError => "urn:oasis:names:tc:xacml:1.0:status:syntax-error",
            Self::ProcessingError => "urn:oasis:names:tc:xacml:1.0:status:processing-error",
        }
    }
}

/// Status of an evaluation step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    code: StatusCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

pub(crate) static OK_STATUS: Status = Status::OK;

impl Status {
    /// The Ok status
    pub const OK: Status = Status {
        code: StatusCode::Ok,
        message: None,
    };

    /// Create a status with a code and message
    #[must_use]
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }

    /// Create a syntax-error status
    #[must_use]
    pub fn syntax_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SyntaxError, message)
    }

    /// Create a processing-error status
    #[must_use]
    pub fn processing_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::ProcessingError, message)
    }

    /// Create a missing-attribute status
    #[must_use]
    pub fn missing_attribute(message: impl Into<String>) -> Self {
        Self::new(StatusCode::MissingAttribute, message)
    }

    /// Get the status code
    #[must_use]
    pub const fn code(&self) -> StatusCode {
        self.code
    }

    /// Get the status message
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns true for `StatusCode::Ok`
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == StatusCode::Ok
    }

    /// Return this status with `prefix: ` in front of its message
    ///
    /// Used to record the short id of every node or function a failure passes
    /// through on its way up.
    #[must_use]
    pub fn prefixed(self, prefix: &str) -> Self {
        let message = match self.message {
            Some(message) => format!("{prefix}: {message}"),
            None => prefix.to_string(),
        };
        Self {
            code: self.code,
            message: Some(message),
        }
    }
}

/// Run `validate` at most once per node and replay its outcome afterwards
///
/// Concurrent first calls block on the cell until one of them has finished.
pub(crate) fn validate_once(
    cell: &OnceLock<Status>,
    validate: impl FnOnce() -> Result<(), Status>,
) -> Result<(), Status> {
    let status = cell.get_or_init(|| validate().err().unwrap_or(Status::OK));
    if status.is_ok() {
        Ok(())
    } else {
        Err(status.clone())
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::OK
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{:?}: {}", self.code, message),
            None => write!(f, "{:?}", self.code),
        }
    }
}
