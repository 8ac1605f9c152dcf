use crate::functions::ids;
use pdp_core::{
    expect_arguments, ConvertedArgument, DataType, EvaluationContext, ExpressionResult,
    FunctionArgument, FunctionDefinition, Identifier,
};

/// Walk the arguments until one equals `decisive`; arguments after it are never evaluated
fn short_circuit(
    id: &Identifier,
    arguments: &[FunctionArgument<'_>],
    decisive: bool,
) -> ExpressionResult {
    for argument in arguments {
        match ConvertedArgument::<bool>::scalar(id, argument) {
            Ok(value) if value == decisive => return ExpressionResult::boolean(decisive),
            Ok(_) => {}
            Err(status) => return status.into(),
        }
    }
    ExpressionResult::boolean(!decisive)
}

/// `and`: true when every argument is true, and for zero arguments
#[derive(Debug)]
pub struct And {
    id: Identifier,
}

impl And {
    /// Create the function
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Identifier::new(ids::AND),
        }
    }
}

impl Default for And {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionDefinition for And {
    fn id(&self) -> &Identifier {
        &self.id
    }

    fn data_type_id(&self) -> Option<DataType> {
        Some(DataType::Boolean)
    }

    fn returns_bag(&self) -> bool {
        false
    }

    fn evaluate(
        &self,
        _context: &dyn EvaluationContext,
        arguments: &[FunctionArgument<'_>],
    ) -> ExpressionResult {
        short_circuit(&self.id, arguments, false)
    }
}

/// `or`: true when some argument is true; false for zero arguments
#[derive(Debug)]
pub struct Or {
    id: Identifier,
}

impl Or {
    /// Create the function
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Identifier::new(ids::OR),
        }
    }
}

impl Default for Or {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionDefinition for Or {
    fn id(&self) -> &Identifier {
        &self.id
    }

    fn data_type_id(&self) -> Option<DataType> {
        Some(DataType::Boolean)
    }

    fn returns_bag(&self) -> bool {
        false
    }

    fn evaluate(
        &self,
        _context: &dyn EvaluationContext,
        arguments: &[FunctionArgument<'_>],
    ) -> ExpressionResult {
        short_circuit(&self.id, arguments, true)
    }
}

/// `not`
#[derive(Debug)]
pub struct Not {
    id: Identifier,
}

impl Not {
    /// Create the function
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Identifier::new(ids::NOT),
        }
    }
}

impl Default for Not {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionDefinition for Not {
    fn id(&self) -> &Identifier {
        &self.id
    }

    fn data_type_id(&self) -> Option<DataType> {
        Some(DataType::Boolean)
    }

    fn returns_bag(&self) -> bool {
        false
    }

    fn evaluate(
        &self,
        _context: &dyn EvaluationContext,
        arguments: &[FunctionArgument<'_>],
    ) -> ExpressionResult {
        if let Err(status) = expect_arguments(&self.id, arguments, 1) {
            return status.into();
        }
        match ConvertedArgument::<bool>::scalar(&self.id, &arguments[0]) {
            Ok(value) => ExpressionResult::boolean(!value),
            Err(status) => status.into(),
        }
    }
}
