//! Standard function library
//!
//! A small subset of the XACML 3.0 functions: typed equality, numeric
//! comparison, boolean logic and the bag helpers needed to turn attribute
//! bags into single values.

mod bag;
mod comparison;
mod equality;
mod logical;

pub use bag::{BagFunction, BagSize, IsIn, OneAndOnly};
pub use comparison::{Comparison, CompareFunction};
pub use equality::EqualFunction;
pub use logical::{And, Not, Or};

use pdp_core::{FunctionDefinition, Uri};
use std::sync::Arc;

/// Function identifiers
pub mod ids {
    /// `string-equal`
    pub const STRING_EQUAL: &str = "urn:oasis:names:tc:xacml:1.0:function:string-equal";
    /// `boolean-equal`
    pub const BOOLEAN_EQUAL: &str = "urn:oasis:names:tc:xacml:1.0:function:boolean-equal";
    /// `integer-equal`
    pub const INTEGER_EQUAL: &str = "urn:oasis:names:tc:xacml:1.0:function:integer-equal";
    /// `double-equal`
    pub const DOUBLE_EQUAL: &str = "urn:oasis:names:tc:xacml:1.0:function:double-equal";
    /// `anyURI-equal`
    pub const ANY_URI_EQUAL: &str = "urn:oasis:names:tc:xacml:1.0:function:anyURI-equal";

    /// `integer-greater-than`
    pub const INTEGER_GREATER_THAN: &str =
        "urn:oasis:names:tc:xacml:1.0:function:integer-greater-than";
    /// `integer-greater-than-or-equal`
    pub const INTEGER_GREATER_THAN_OR_EQUAL: &str =
        "urn:oasis:names:tc:xacml:1.0:function:integer-greater-than-or-equal";
    /// `integer-less-than`
    pub const INTEGER_LESS_THAN: &str = "urn:oasis:names:tc:xacml:1.0:function:integer-less-than";
    /// `integer-less-than-or-equal`
    pub const INTEGER_LESS_THAN_OR_EQUAL: &str =
        "urn:oasis:names:tc:xacml:1.0:function:integer-less-than-or-equal";
    /// `double-greater-than`
    pub const DOUBLE_GREATER_THAN: &str = "urn:oasis:names:tc:xacml:1.0:function:double-greater-than";
    /// `double-greater-than-or-equal`
    pub const DOUBLE_GREATER_THAN_OR_EQUAL: &str =
        "urn:oasis:names:tc:xacml:1.0:function:double-greater-than-or-equal";
    /// `double-less-than`
    pub const DOUBLE_LESS_THAN: &str = "urn:oasis:names:tc:xacml:1.0:function:double-less-than";
    /// `double-less-than-or-equal`
    pub const DOUBLE_LESS_THAN_OR_EQUAL: &str =
        "urn:oasis:names:tc:xacml:1.0:function:double-less-than-or-equal";

    /// `and`
    pub const AND: &str = "urn:oasis:names:tc:xacml:1.0:function:and";
    /// `or`
    pub const OR: &str = "urn:oasis:names:tc:xacml:1.0:function:or";
    /// `not`
    pub const NOT: &str = "urn:oasis:names:tc:xacml:1.0:function:not";

    /// `string-one-and-only`
    pub const STRING_ONE_AND_ONLY: &str = "urn:oasis:names:tc:xacml:1.0:function:string-one-and-only";
    /// `string-bag-size`
    pub const STRING_BAG_SIZE: &str = "urn:oasis:names:tc:xacml:1.0:function:string-bag-size";
    /// `string-is-in`
    pub const STRING_IS_IN: &str = "urn:oasis:names:tc:xacml:1.0:function:string-is-in";
    /// `string-bag`
    pub const STRING_BAG: &str = "urn:oasis:names:tc:xacml:1.0:function:string-bag";
    /// `integer-one-and-only`
    pub const INTEGER_ONE_AND_ONLY: &str =
        "urn:oasis:names:tc:xacml:1.0:function:integer-one-and-only";
    /// `integer-bag-size`
    pub const INTEGER_BAG_SIZE: &str = "urn:oasis:names:tc:xacml:1.0:function:integer-bag-size";
    /// `integer-is-in`
    pub const INTEGER_IS_IN: &str = "urn:oasis:names:tc:xacml:1.0:function:integer-is-in";
    /// `integer-bag`
    pub const INTEGER_BAG: &str = "urn:oasis:names:tc:xacml:1.0:function:integer-bag";
}

/// Every function of the standard library
#[must_use]
pub fn standard_functions() -> Vec<Arc<dyn FunctionDefinition>> {
    use comparison::Comparison::{GreaterThan, GreaterThanOrEqual, LessThan, LessThanOrEqual};

    vec![
        Arc::new(EqualFunction::<String>::new(ids::STRING_EQUAL)),
        Arc::new(EqualFunction::<bool>::new(ids::BOOLEAN_EQUAL)),
        Arc::new(EqualFunction::<i64>::new(ids::INTEGER_EQUAL)),
        Arc::new(EqualFunction::<f64>::new(ids::DOUBLE_EQUAL)),
        Arc::new(EqualFunction::<Uri>::new(ids::ANY_URI_EQUAL)),
        Arc::new(CompareFunction::<i64>::new(ids::INTEGER_GREATER_THAN, GreaterThan)),
        Arc::new(CompareFunction::<i64>::new(
            ids::INTEGER_GREATER_THAN_OR_EQUAL,
            GreaterThanOrEqual,
        )),
        Arc::new(CompareFunction::<i64>::new(ids::INTEGER_LESS_THAN, LessThan)),
        Arc::new(CompareFunction::<i64>::new(
            ids::INTEGER_LESS_THAN_OR_EQUAL,
            LessThanOrEqual,
        )),
        Arc::new(CompareFunction::<f64>::new(ids::DOUBLE_GREATER_THAN, GreaterThan)),
        Arc::new(CompareFunction::<f64>::new(
            ids::DOUBLE_GREATER_THAN_OR_EQUAL,
            GreaterThanOrEqual,
        )),
        Arc::new(CompareFunction::<f64>::new(ids::DOUBLE_LESS_THAN, LessThan)),
        Arc::new(CompareFunction::<f64>::new(
            ids::DOUBLE_LESS_THAN_OR_EQUAL,
            LessThanOrEqual,
        )),
        Arc::new(And::new()),
        Arc::new(Or::new()),
        Arc::new(Not::new()),
        Arc::new(OneAndOnly::<String>::new(ids::STRING_ONE_AND_ONLY)),
        Arc::new(BagSize::<String>::new(ids::STRING_BAG_SIZE)),
        Arc::new(IsIn::<String>::new(ids::STRING_IS_IN)),
        Arc::new(BagFunction::<String>::new(ids::STRING_BAG)),
        Arc::new(OneAndOnly::<i64>::new(ids::INTEGER_ONE_AND_ONLY)),
        Arc::new(BagSize::<i64>::new(ids::INTEGER_BAG_SIZE)),
        Arc::new(IsIn::<i64>::new(ids::INTEGER_IS_IN)),
        Arc::new(BagFunction::<i64>::new(ids::INTEGER_BAG)),
    ]
}
