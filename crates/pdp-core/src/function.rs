//! The function contract
//!
//! Function bodies live outside the core (see `pdp-std`). The core invokes
//! them uniformly from [`Match`](crate::Match) and [`Apply`](crate::Apply):
//! resolve by identifier through the [`Registry`](crate::Registry), wrap each
//! argument as a [`FunctionArgument`], call [`FunctionDefinition::evaluate`].

use crate::context::EvaluationContext;
use crate::expression::{ExpressionResult, FunctionArgument};
use crate::identifier::Identifier;
use crate::status::Status;
use crate::value::DataType;
use std::fmt;

/// A pluggable function
///
/// Implementations validate their own argument count and types, typically
/// with [`ConvertedArgument`](crate::ConvertedArgument), and report failures
/// as an `ExpressionResult::Error` whose message is prefixed with
/// [`FunctionDefinition::short_id`].
pub trait FunctionDefinition: fmt::Debug + Send + Sync {
    /// Function identifier
    fn id(&self) -> &Identifier;

    /// Declared return data type (`None` for functions that return functions)
    fn data_type_id(&self) -> Option<DataType>;

    /// Whether the function returns a bag
    fn returns_bag(&self) -> bool;

    /// Evaluate the function
    fn evaluate(
        &self,
        context: &dyn EvaluationContext,
        arguments: &[FunctionArgument<'_>],
    ) -> ExpressionResult;

    /// Short identifier used as prefix in diagnostics
    fn short_id(&self) -> &str {
        self.id().short()
    }
}

/// Check that a function received exactly `expected` arguments
///
/// # Errors
///
/// Returns a processing-error status prefixed with the function's short id
pub fn expect_arguments(
    function_id: &Identifier,
    arguments: &[FunctionArgument<'_>],
    expected: usize,
) -> Result<(), Status> {
    if arguments.len() == expected {
        Ok(())
    } else {
        Err(Status::processing_error(format!(
            "Expected {} arguments, got {}",
            expected,
            arguments.len()
        ))
        .prefixed(function_id.short()))
    }
}
