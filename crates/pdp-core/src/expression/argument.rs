use super::{Expression, ExpressionResult};
use crate::bag::Bag;
use crate::context::EvaluationContext;
use crate::defaults::PolicyDefaults;
use crate::identifier::Identifier;
use crate::status::{Status, OK_STATUS};
use crate::value::{AttributeType, AttributeValue};
use std::cell::OnceCell;
use std::fmt;

/// An argument handed to a function
///
/// Literal values, bags and unevaluated expressions are passed uniformly.
/// An expression argument is evaluated on first access and the result is
/// kept, so a function that never looks at an argument never evaluates it
/// and one that looks twice evaluates it once.
#[derive(Debug)]
pub enum FunctionArgument<'a> {
    /// A literal value
    Value(&'a AttributeValue),
    /// A bag of values
    Bag(&'a Bag),
    /// An expression, evaluated lazily
    Expression(ArgumentExpression<'a>),
}

impl<'a> FunctionArgument<'a> {
    /// Wrap an expression for lazy evaluation
    #[must_use]
    pub fn expression(
        expression: &'a Expression,
        context: &'a dyn EvaluationContext,
        defaults: &'a PolicyDefaults,
    ) -> Self {
        Self::Expression(ArgumentExpression {
            expression,
            context,
            defaults,
            result: OnceCell::new(),
        })
    }

    /// The status of the argument, evaluating it if necessary
    #[must_use]
    pub fn status(&self) -> &Status {
        match self {
            Self::Value(_) | Self::Bag(_) => &OK_STATUS,
            Self::Expression(expression) => expression.result().status(),
        }
    }

    /// Returns true unless evaluating the argument failed
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status().is_ok()
    }

    /// Returns true if the argument is a bag
    #[must_use]
    pub fn is_bag(&self) -> bool {
        match self {
            Self::Value(_) => false,
            Self::Bag(_) => true,
            Self::Expression(expression) => expression.result().is_bag(),
        }
    }

    /// The single value, if the argument is one
    #[must_use]
    pub fn value(&self) -> Option<&AttributeValue> {
        match self {
            Self::Value(value) => Some(*value),
            Self::Bag(_) => None,
            Self::Expression(expression) => expression.result().value(),
        }
    }

    /// The bag, if the argument is one
    #[must_use]
    pub fn bag(&self) -> Option<&Bag> {
        match self {
            Self::Value(_) => None,
            Self::Bag(bag) => Some(*bag),
            Self::Expression(expression) => expression.result().get_bag(),
        }
    }
}

/// An unevaluated expression argument with its memoized result
pub struct ArgumentExpression<'a> {
    expression: &'a Expression,
    context: &'a dyn EvaluationContext,
    defaults: &'a PolicyDefaults,
    result: OnceCell<ExpressionResult>,
}

impl ArgumentExpression<'_> {
    fn result(&self) -> &ExpressionResult {
        self.result.get_or_init(|| {
            self.expression
                .evaluate(self.context, self.defaults)
                .unwrap_or_else(|err| ExpressionResult::processing_error(err.to_string()))
        })
    }
}

impl fmt::Debug for ArgumentExpression<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentExpression")
            .field("expression", self.expression)
            .field("result", &self.result.get())
            .finish_non_exhaustive()
    }
}

/// A function argument converted to the native type a function expects
///
/// Conversion failures are reported as a processing-error status whose
/// message starts with the short identifier of the function, e.g.
/// `integer-add: Expected a simple value, saw a bag`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertedArgument<T> {
    /// A converted single value
    Value(T),
    /// A converted bag
    Bag(Vec<T>),
}

impl<T: AttributeType> ConvertedArgument<T> {
    /// Convert `argument`, expecting a bag when `expect_bag` is set
    ///
    /// # Errors
    ///
    /// Returns the argument's own failure status or a conversion error, both
    /// prefixed with the function's short id
    pub fn new(
        function_id: &Identifier,
        argument: &FunctionArgument<'_>,
        expect_bag: bool,
    ) -> Result<Self, Status> {
        let prefix = function_id.short();
        if !argument.is_ok() {
            return Err(argument.status().clone().prefixed(prefix));
        }

        if expect_bag {
            let bag = argument.bag().ok_or_else(|| {
                Status::processing_error("Expected a bag, saw a simple value").prefixed(prefix)
            })?;
            bag.iter()
                .map(|value| convert::<T>(value, prefix))
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Bag)
        } else {
            if argument.is_bag() {
                return Err(
                    Status::processing_error("Expected a simple value, saw a bag").prefixed(prefix)
                );
            }
            let value = argument
                .value()
                .ok_or_else(|| Status::processing_error("Got null argument").prefixed(prefix))?;
            convert::<T>(value, prefix).map(Self::Value)
        }
    }

    /// Convert a single-value argument
    ///
    /// # Errors
    ///
    /// See [`ConvertedArgument::new`]
    pub fn scalar(function_id: &Identifier, argument: &FunctionArgument<'_>) -> Result<T, Status> {
        match Self::new(function_id, argument, false)? {
            Self::Value(value) => Ok(value),
            Self::Bag(_) => Err(Status::processing_error("Expected a simple value, saw a bag")
                .prefixed(function_id.short())),
        }
    }

    /// Convert a bag argument
    ///
    /// # Errors
    ///
    /// See [`ConvertedArgument::new`]
    pub fn bag(function_id: &Identifier, argument: &FunctionArgument<'_>) -> Result<Vec<T>, Status> {
        match Self::new(function_id, argument, true)? {
            Self::Bag(values) => Ok(values),
            Self::Value(_) => Err(Status::processing_error("Expected a bag, saw a simple value")
                .prefixed(function_id.short())),
        }
    }
}

fn convert<T: AttributeType>(value: &AttributeValue, prefix: &str) -> Result<T, Status> {
    if value.data_type() != T::DATA_TYPE && value.data_type() != crate::value::DataType::String {
        return Err(Status::processing_error(format!(
            "Expected data type '{}' saw '{}'",
            T::DATA_TYPE,
            value.data_type()
        ))
        .prefixed(prefix));
    }
    T::from_attribute(value).map_err(|message| Status::processing_error(message).prefixed(prefix))
}
