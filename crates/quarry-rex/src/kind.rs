//! Expression kind tags.
//!
//! Every row-expression node reports a [`SqlKind`]. Consumers that need a
//! discriminator without dispatching a visitor (rule operand matching,
//! statistics, explain output) switch on it.
//!
//! # Invariant
//!
//! The discriminant values must match the `SQL_KIND_NAMES` array indices.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a row-expression node or call operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SqlKind {
    // Leaves
    /// Constant value
    Literal = 0,
    /// Reference to a field of the operator's input row
    InputRef = 1,
    /// Reference to the current row of an enclosing query block
    CorrelVariable = 2,

    // Field access
    /// Named field of the value produced by another expression
    FieldAccess = 3,

    // Comparison
    Equals = 4,
    NotEquals = 5,
    LessThan = 6,
    GreaterThan = 7,

    // Logic
    And = 8,
    Or = 9,
    Not = 10,

    // Null tests
    IsNull = 11,
    IsNotNull = 12,

    // Arithmetic
    Plus = 13,
    Minus = 14,
    Times = 15,

    /// Any other function call
    OtherFunction = 16,
}

/// Upper-snake names, indexed by discriminant.
const SQL_KIND_NAMES: &[&str] = &[
    "LITERAL",         // 0: Literal
    "INPUT_REF",       // 1: InputRef
    "CORREL_VARIABLE", // 2: CorrelVariable
    "FIELD_ACCESS",    // 3: FieldAccess
    "EQUALS",          // 4: Equals
    "NOT_EQUALS",      // 5: NotEquals
    "LESS_THAN",       // 6: LessThan
    "GREATER_THAN",    // 7: GreaterThan
    "AND",             // 8: And
    "OR",              // 9: Or
    "NOT",             // 10: Not
    "IS_NULL",         // 11: IsNull
    "IS_NOT_NULL",     // 12: IsNotNull
    "PLUS",            // 13: Plus
    "MINUS",           // 14: Minus
    "TIMES",           // 15: Times
    "OTHER_FUNCTION",  // 16: OtherFunction
];

impl SqlKind {
    /// Stable upper-snake name of this kind.
    pub fn name(self) -> &'static str {
        SQL_KIND_NAMES[self as usize]
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            SqlKind::Equals | SqlKind::NotEquals | SqlKind::LessThan | SqlKind::GreaterThan
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, SqlKind::And | SqlKind::Or | SqlKind::Not)
    }

    pub fn is_null_test(self) -> bool {
        matches!(self, SqlKind::IsNull | SqlKind::IsNotNull)
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(self, SqlKind::Plus | SqlKind::Minus | SqlKind::Times)
    }
}

impl fmt::Display for SqlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_discriminants() {
        assert_eq!(SqlKind::Literal.name(), "LITERAL");
        assert_eq!(SqlKind::FieldAccess.name(), "FIELD_ACCESS");
        assert_eq!(SqlKind::CorrelVariable.name(), "CORREL_VARIABLE");
        assert_eq!(SqlKind::OtherFunction.name(), "OTHER_FUNCTION");
        assert_eq!(SQL_KIND_NAMES.len(), SqlKind::OtherFunction as usize + 1);
    }

    #[test]
    fn classification_is_disjoint() {
        let kinds = [
            SqlKind::Equals,
            SqlKind::And,
            SqlKind::IsNull,
            SqlKind::Plus,
            SqlKind::FieldAccess,
        ];
        for kind in kinds {
            let classes = [
                kind.is_comparison(),
                kind.is_logical(),
                kind.is_null_test(),
                kind.is_arithmetic(),
            ];
            assert!(classes.iter().filter(|c| **c).count() <= 1, "{kind}");
        }
        assert!(!SqlKind::FieldAccess.is_comparison());
    }
}
