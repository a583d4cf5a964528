//! Operator compatibility matrix.
//!
//! Maps a column's semantic type to its legal filter operators (with UI
//! labels) and decides operator arity. The matrix and the arity predicates
//! must stay consistent: `between` appears only for types whose operators
//! accept two values.

use crate::model::{ColumnType, FilterOperator};

/// An operator with its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorOption {
    pub operator: FilterOperator,
    pub label: &'static str,
}

const STRING_OPERATORS: &[OperatorOption] = &[
    OperatorOption { operator: FilterOperator::Equals, label: "Equals" },
    OperatorOption { operator: FilterOperator::NotEquals, label: "Not Equals" },
    OperatorOption { operator: FilterOperator::Contains, label: "Contains" },
    OperatorOption { operator: FilterOperator::NotContains, label: "Does Not Contain" },
    OperatorOption { operator: FilterOperator::StartsWith, label: "Starts With" },
    OperatorOption { operator: FilterOperator::EndsWith, label: "Ends With" },
    OperatorOption { operator: FilterOperator::IsEmpty, label: "Is Empty" },
    OperatorOption { operator: FilterOperator::IsNotEmpty, label: "Is Not Empty" },
    OperatorOption { operator: FilterOperator::In, label: "In List" },
];

const NUMERIC_OPERATORS: &[OperatorOption] = &[
    OperatorOption { operator: FilterOperator::Equals, label: "Equals" },
    OperatorOption { operator: FilterOperator::NotEquals, label: "Not Equals" },
    OperatorOption { operator: FilterOperator::Gt, label: "Greater Than" },
    OperatorOption { operator: FilterOperator::Gte, label: "Greater Than or Equal" },
    OperatorOption { operator: FilterOperator::Lt, label: "Less Than" },
    OperatorOption { operator: FilterOperator::Lte, label: "Less Than or Equal" },
    OperatorOption { operator: FilterOperator::Between, label: "Between" },
    OperatorOption { operator: FilterOperator::IsNull, label: "Is Null" },
    OperatorOption { operator: FilterOperator::IsNotNull, label: "Is Not Null" },
];

const DATE_OPERATORS: &[OperatorOption] = &[
    OperatorOption { operator: FilterOperator::Equals, label: "On Date" },
    OperatorOption { operator: FilterOperator::NotEquals, label: "Not On Date" },
    OperatorOption { operator: FilterOperator::Gt, label: "After" },
    OperatorOption { operator: FilterOperator::Gte, label: "On or After" },
    OperatorOption { operator: FilterOperator::Lt, label: "Before" },
    OperatorOption { operator: FilterOperator::Lte, label: "On or Before" },
    OperatorOption { operator: FilterOperator::Between, label: "Between Dates" },
    OperatorOption { operator: FilterOperator::IsNull, label: "Is Null" },
    OperatorOption { operator: FilterOperator::IsNotNull, label: "Is Not Null" },
    OperatorOption { operator: FilterOperator::Today, label: "Is Today" },
    OperatorOption { operator: FilterOperator::ThisWeek, label: "This Week" },
    OperatorOption { operator: FilterOperator::ThisMonth, label: "This Month" },
    OperatorOption { operator: FilterOperator::ThisYear, label: "This Year" },
];

const BOOLEAN_OPERATORS: &[OperatorOption] = &[
    OperatorOption { operator: FilterOperator::Equals, label: "Is" },
    OperatorOption { operator: FilterOperator::IsNull, label: "Is Null" },
    OperatorOption { operator: FilterOperator::IsNotNull, label: "Is Not Null" },
];

/// Operators offered when a column's type cannot be resolved.
pub const FALLBACK_OPERATORS: &[OperatorOption] = &[
    OperatorOption { operator: FilterOperator::Equals, label: "Equals" },
    OperatorOption { operator: FilterOperator::NotEquals, label: "Not Equals" },
    OperatorOption { operator: FilterOperator::Contains, label: "Contains" },
    OperatorOption { operator: FilterOperator::IsNull, label: "Is Null" },
    OperatorOption { operator: FilterOperator::IsNotNull, label: "Is Not Null" },
];

/// Legal filter operators for a column type, in UI order.
pub fn operators_for(column_type: ColumnType) -> &'static [OperatorOption] {
    match column_type {
        ColumnType::String => STRING_OPERATORS,
        ColumnType::Number | ColumnType::Currency => NUMERIC_OPERATORS,
        ColumnType::Date => DATE_OPERATORS,
        ColumnType::Boolean => BOOLEAN_OPERATORS,
    }
}

/// The operator a fresh filter on a column of `column_type` starts with.
pub fn default_operator(column_type: ColumnType) -> FilterOperator {
    operators_for(column_type)[0].operator
}

/// Whether `operator` is legal for columns of `column_type`.
pub fn is_legal(operator: FilterOperator, column_type: ColumnType) -> bool {
    operators_for(column_type)
        .iter()
        .any(|o| o.operator == operator)
}

impl FilterOperator {
    /// Whether this operator takes a user-supplied value.
    pub fn needs_value_input(&self) -> bool {
        !matches!(
            self,
            FilterOperator::IsNull
                | FilterOperator::IsNotNull
                | FilterOperator::IsEmpty
                | FilterOperator::IsNotEmpty
                | FilterOperator::Today
                | FilterOperator::ThisWeek
                | FilterOperator::ThisMonth
                | FilterOperator::ThisYear
        )
    }

    /// Whether this operator takes two values (range operators).
    pub fn needs_two_values(&self) -> bool {
        matches!(self, FilterOperator::Between)
    }
}
