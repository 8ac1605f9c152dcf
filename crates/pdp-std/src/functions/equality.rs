use pdp_core::{
    expect_arguments, AttributeType, ConvertedArgument, DataType, EvaluationContext,
    ExpressionResult, FunctionArgument, FunctionDefinition, Identifier,
};
use std::fmt;
use std::marker::PhantomData;

/// `<type>-equal`: two single values of the same type
pub struct EqualFunction<T> {
    id: Identifier,
    _marker: PhantomData<fn() -> T>,
}

impl<T> EqualFunction<T> {
    /// Create the function under `id`
    #[must_use]
    pub fn new(id: impl Into<Identifier>) -> Self {
        Self {
            id: id.into(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for EqualFunction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EqualFunction").field(&self.id).finish()
    }
}

impl<T: AttributeType + PartialEq> FunctionDefinition for EqualFunction<T> {
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
        if let Err(status) = expect_arguments(&self.id, arguments, 2) {
            return status.into();
        }
        let left = match ConvertedArgument::<T>::scalar(&self.id, &arguments[0]) {
            Ok(value) => value,
            Err(status) => return status.into(),
        };
        match ConvertedArgument::<T>::scalar(&self.id, &arguments[1]) {
            Ok(right) => ExpressionResult::boolean(left == right),
            Err(status) => status.into(),
        }
    }
}
