use pdp_core::{
    expect_arguments, AttributeType, AttributeValue, Bag, ConvertedArgument, DataType,
    EvaluationContext, ExpressionResult, FunctionArgument, FunctionDefinition, Identifier, Status,
};
use std::fmt;
use std::marker::PhantomData;

macro_rules! typed_function {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name<T> {
            id: Identifier,
            _marker: PhantomData<fn() -> T>,
        }

        impl<T> $name<T> {
            /// Create the function under `id`
            #[must_use]
            pub fn new(id: impl Into<Identifier>) -> Self {
                Self {
                    id: id.into(),
                    _marker: PhantomData,
                }
            }
        }

        impl<T> fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.id).finish()
            }
        }
    };
}

typed_function!(
    /// `<type>-one-and-only`: the single element of a one-element bag
    OneAndOnly
);
typed_function!(
    /// `<type>-bag-size`: number of elements in a bag
    BagSize
);
typed_function!(
    /// `<type>-is-in`: whether a value occurs in a bag
    IsIn
);
typed_function!(
    /// `<type>-bag`: a bag made of the arguments
    BagFunction
);

impl<T: AttributeType> FunctionDefinition for OneAndOnly<T> {
    fn id(&self) -> &Identifier {
        &self.id
    }

    fn data_type_id(&self) -> Option<DataType> {
        Some(T::DATA_TYPE)
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
        let mut values = match ConvertedArgument::<T>::bag(&self.id, &arguments[0]) {
            Ok(values) => values,
            Err(status) => return status.into(),
        };
        if values.len() != 1 {
            return Status::processing_error(format!(
                "Expected bag of size 1, got {}",
                values.len()
            ))
            .prefixed(self.id.short())
            .into();
        }
        match values.pop() {
            Some(value) => value.into_attribute().into(),
            None => Status::processing_error("Got empty bag")
                .prefixed(self.id.short())
                .into(),
        }
    }
}

impl<T: AttributeType> FunctionDefinition for BagSize<T> {
    fn id(&self) -> &Identifier {
        &self.id
    }

    fn data_type_id(&self) -> Option<DataType> {
        Some(DataType::Integer)
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
        match ConvertedArgument::<T>::bag(&self.id, &arguments[0]) {
            Ok(values) => match i64::try_from(values.len()) {
                Ok(size) => AttributeValue::Integer(size).into(),
                Err(_) => Status::processing_error("Bag too large")
                    .prefixed(self.id.short())
                    .into(),
            },
            Err(status) => status.into(),
        }
    }
}

impl<T: AttributeType + PartialEq> FunctionDefinition for IsIn<T> {
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
        let needle = match ConvertedArgument::<T>::scalar(&self.id, &arguments[0]) {
            Ok(value) => value,
            Err(status) => return status.into(),
        };
        match ConvertedArgument::<T>::bag(&self.id, &arguments[1]) {
            Ok(values) => ExpressionResult::boolean(values.contains(&needle)),
            Err(status) => status.into(),
        }
    }
}

impl<T: AttributeType> FunctionDefinition for BagFunction<T> {
    fn id(&self) -> &Identifier {
        &self.id
    }

    fn data_type_id(&self) -> Option<DataType> {
        Some(T::DATA_TYPE)
    }

    fn returns_bag(&self) -> bool {
        true
    }

    fn evaluate(
        &self,
        _context: &dyn EvaluationContext,
        arguments: &[FunctionArgument<'_>],
    ) -> ExpressionResult {
        let values: Result<Bag, Status> = arguments
            .iter()
            .map(|argument| {
                ConvertedArgument::<T>::scalar(&self.id, argument).map(T::into_attribute)
            })
            .collect();
        match values {
            Ok(bag) => ExpressionResult::bag(bag),
            Err(status) => status.into(),
        }
    }
}
