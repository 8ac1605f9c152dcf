use super::{Expression, ExpressionResult, FunctionArgument};
use crate::context::EvaluationContext;
use crate::defaults::PolicyDefaults;
use crate::error::Result;
use crate::function::FunctionDefinition;
use crate::identifier::Identifier;
use crate::registry::Registry;
use crate::status::Status;
use std::sync::{Arc, OnceLock};

/// Application of a function to argument expressions
#[derive(Debug, Clone)]
pub struct Apply {
    function_id: Identifier,
    arguments: Vec<Expression>,
    description: Option<String>,
    function: OnceLock<Arc<dyn FunctionDefinition>>,
}

impl Apply {
    /// Create a function application
    #[must_use]
    pub fn new(function_id: impl Into<Identifier>, arguments: Vec<Expression>) -> Self {
        Self {
            function_id: function_id.into(),
            arguments,
            description: None,
            function: OnceLock::new(),
        }
    }

    /// Attach a description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The function identifier
    #[must_use]
    pub fn function_id(&self) -> &Identifier {
        &self.function_id
    }

    /// The argument expressions
    #[must_use]
    pub fn arguments(&self) -> &[Expression] {
        &self.arguments
    }

    /// The description, if any
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    // Racing evaluations may both look the function up; the registry lookup
    // is pure so whichever value lands first is as good as the other.
    fn function(&self, registry: &Registry) -> Result<&Arc<dyn FunctionDefinition>, Status> {
        if let Some(function) = self.function.get() {
            return Ok(function);
        }
        let function = registry.function(&self.function_id).ok_or_else(|| {
            Status::syntax_error(format!("Unknown Function \"{}\"", self.function_id))
        })?;
        Ok(self.function.get_or_init(|| function))
    }

    pub(super) fn validate(&self, registry: &Registry) -> Result<(), Status> {
        self.function(registry)?;
        self.arguments
            .iter()
            .try_for_each(|argument| argument.validate(registry))
    }

    pub(super) fn evaluate(
        &self,
        context: &dyn EvaluationContext,
        defaults: &PolicyDefaults,
    ) -> Result<ExpressionResult> {
        let function = match self.function(context.registry()) {
            Ok(function) => function,
            Err(status) => return Ok(ExpressionResult::Error(status)),
        };
        let arguments: Vec<FunctionArgument<'_>> = self
            .arguments
            .iter()
            .map(|argument| FunctionArgument::expression(argument, context, defaults))
            .collect();
        Ok(function.evaluate(context, &arguments))
    }
}
