use pdp_core::{
    expect_arguments, AttributeType, ConvertedArgument, DataType, EvaluationContext,
    ExpressionResult, FunctionArgument, FunctionDefinition, Identifier,
};
use std::fmt;
use std::marker::PhantomData;

/// Ordering test applied by a [`CompareFunction`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `a > b`
    GreaterThan,
    /// `a >= b`
    GreaterThanOrEqual,
    /// `a < b`
    LessThan,
    /// `a <= b`
    LessThanOrEqual,
}

impl Comparison {
    fn holds<T: PartialOrd>(self, left: &T, right: &T) -> bool {
        match self {
            Self::GreaterThan => left > right,
            Self::GreaterThanOrEqual => left >= right,
            Self::LessThan => left < right,
            Self::LessThanOrEqual => left <= right,
        }
    }
}

/// `<type>-greater-than` and friends over two single values
pub struct CompareFunction<T> {
    id: Identifier,
    comparison: Comparison,
    _marker: PhantomData<fn() -> T>,
}

impl<T> CompareFunction<T> {
    /// Create the function under `id`
    #[must_use]
    pub fn new(id: impl Into<Identifier>, comparison: Comparison) -> Self {
        Self {
            id: id.into(),
            comparison,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for CompareFunction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompareFunction")
            .field("id", &self.id)
            .field("comparison", &self.comparison)
            .finish()
    }
}

impl<T: AttributeType + PartialOrd> FunctionDefinition for CompareFunction<T> {
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
            Ok(right) => ExpressionResult::boolean(self.comparison.holds(&left, &right)),
            Err(status) => status.into(),
        }
    }
}
