//! Operator calls.
//!
//! All operators, comparisons and functions are represented as a
//! [`RexCall`] of a [`SqlOperator`] to operand expressions.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::kind::SqlKind;
use crate::node::RexNode;
use crate::types::RelDataType;
use crate::visitor::RexVisitor;

/// Number of operands an operator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperandCount {
    Exactly(usize),
    AtLeast(usize),
}

impl OperandCount {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            OperandCount::Exactly(n) => count == n,
            OperandCount::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for OperandCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperandCount::Exactly(n) => write!(f, "exactly {n}"),
            OperandCount::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// How a call of an operator is written in a digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlSyntax {
    /// `name(a, b)`
    Function,
    /// Bare `name` when called without operands, e.g. `CURRENT_DATE`.
    FunctionId,
}

/// An operator or function that a [`RexCall`] applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SqlOperator {
    name: Cow<'static, str>,
    kind: SqlKind,
    operands: OperandCount,
    syntax: SqlSyntax,
}

impl SqlOperator {
    pub const EQUALS: SqlOperator = SqlOperator::builtin("=", SqlKind::Equals, 2);
    pub const NOT_EQUALS: SqlOperator = SqlOperator::builtin("<>", SqlKind::NotEquals, 2);
    pub const LESS_THAN: SqlOperator = SqlOperator::builtin("<", SqlKind::LessThan, 2);
    pub const GREATER_THAN: SqlOperator = SqlOperator::builtin(">", SqlKind::GreaterThan, 2);
    pub const AND: SqlOperator = SqlOperator {
        name: Cow::Borrowed("AND"),
        kind: SqlKind::And,
        operands: OperandCount::AtLeast(2),
        syntax: SqlSyntax::Function,
    };
    pub const OR: SqlOperator = SqlOperator {
        name: Cow::Borrowed("OR"),
        kind: SqlKind::Or,
        operands: OperandCount::AtLeast(2),
        syntax: SqlSyntax::Function,
    };
    pub const NOT: SqlOperator = SqlOperator::builtin("NOT", SqlKind::Not, 1);
    pub const IS_NULL: SqlOperator = SqlOperator::builtin("IS NULL", SqlKind::IsNull, 1);
    pub const IS_NOT_NULL: SqlOperator = SqlOperator::builtin("IS NOT NULL", SqlKind::IsNotNull, 1);
    pub const PLUS: SqlOperator = SqlOperator::builtin("+", SqlKind::Plus, 2);
    pub const MINUS: SqlOperator = SqlOperator::builtin("-", SqlKind::Minus, 2);
    pub const TIMES: SqlOperator = SqlOperator::builtin("*", SqlKind::Times, 2);

    const fn builtin(name: &'static str, kind: SqlKind, operands: usize) -> Self {
        Self {
            name: Cow::Borrowed(name),
            kind,
            operands: OperandCount::Exactly(operands),
            syntax: SqlSyntax::Function,
        }
    }

    /// A user or library function. Its kind is [`SqlKind::OtherFunction`].
    pub fn function(name: impl Into<String>, operands: OperandCount) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            kind: SqlKind::OtherFunction,
            operands,
            syntax: SqlSyntax::Function,
        }
    }

    /// A niladic function written without parentheses, such as
    /// `CURRENT_DATE` or a named row source.
    pub fn identifier(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            kind: SqlKind::OtherFunction,
            operands: OperandCount::Exactly(0),
            syntax: SqlSyntax::FunctionId,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SqlKind {
        self.kind
    }

    pub fn operand_count(&self) -> OperandCount {
        self.operands
    }

    pub fn syntax(&self) -> SqlSyntax {
        self.syntax
    }
}

impl fmt::Display for SqlOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Application of an operator to operands.
///
/// Digest: `<operator name>(<operand digests joined by ", ">)`, e.g.
/// `=($1, $cor0.deptno)`. A [`SqlSyntax::FunctionId`] operator called
/// without operands is just its name.
#[derive(Debug, Clone)]
pub struct RexCall {
    op: SqlOperator,
    operands: Vec<Arc<RexNode>>,
    ty: RelDataType,
    digest: String,
}

impl RexCall {
    /// Create a call. Operand count and result type are the builder's concern.
    pub fn new(op: SqlOperator, operands: Vec<Arc<RexNode>>, ty: RelDataType) -> Self {
        let digest = Self::compute_digest(&op, &operands);
        Self {
            op,
            operands,
            ty,
            digest,
        }
    }

    fn compute_digest(op: &SqlOperator, operands: &[Arc<RexNode>]) -> String {
        if op.syntax() == SqlSyntax::FunctionId && operands.is_empty() {
            return op.name().to_string();
        }
        let args: Vec<&str> = operands.iter().map(|o| o.digest()).collect();
        format!("{}({})", op.name(), args.join(", "))
    }

    pub fn operator(&self) -> &SqlOperator {
        &self.op
    }

    pub fn operands(&self) -> &[Arc<RexNode>] {
        &self.operands
    }

    /// Same operator and type over new operands.
    pub fn with_operands(&self, operands: Vec<Arc<RexNode>>) -> Self {
        Self::new(self.op.clone(), operands, self.ty.clone())
    }

    pub fn kind(&self) -> SqlKind {
        self.op.kind()
    }

    pub fn ty(&self) -> &RelDataType {
        &self.ty
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn accept<R, V: RexVisitor<R> + ?Sized>(&self, visitor: &mut V) -> R {
        visitor.visit_call(self)
    }
}

impl fmt::Display for RexCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::{LiteralValue, RexInputRef, RexLiteral};
    use crate::types::SqlTypeName;

    fn int_ref(index: usize) -> Arc<RexNode> {
        Arc::new(RexInputRef::new(index, RelDataType::not_null(SqlTypeName::Integer)).into())
    }

    #[test]
    fn digest_lists_operands() {
        let int = RelDataType::not_null(SqlTypeName::Integer);
        let one: Arc<RexNode> = Arc::new(RexLiteral::new(LiteralValue::Integer(1), int).into());
        let call = RexCall::new(
            SqlOperator::PLUS,
            vec![int_ref(0), one],
            RelDataType::not_null(SqlTypeName::Integer),
        );
        assert_eq!(call.digest(), "+($0, 1)");
        assert_eq!(call.kind(), SqlKind::Plus);
    }

    #[test]
    fn with_operands_recomputes_digest() {
        let call = RexCall::new(
            SqlOperator::EQUALS,
            vec![int_ref(0), int_ref(1)],
            RelDataType::not_null(SqlTypeName::Boolean),
        );
        let swapped = call.with_operands(vec![int_ref(1), int_ref(0)]);
        assert_eq!(call.digest(), "=($0, $1)");
        assert_eq!(swapped.digest(), "=($1, $0)");
        assert_eq!(swapped.ty(), call.ty());
    }

    #[test]
    fn operand_counts() {
        assert!(SqlOperator::EQUALS.operand_count().accepts(2));
        assert!(!SqlOperator::EQUALS.operand_count().accepts(3));
        assert!(SqlOperator::AND.operand_count().accepts(5));
        assert!(!SqlOperator::AND.operand_count().accepts(1));
    }

    #[test]
    fn function_operator_is_other_function() {
        let upper = SqlOperator::function("UPPER", OperandCount::Exactly(1));
        assert_eq!(upper.kind(), SqlKind::OtherFunction);
        assert_eq!(upper.to_string(), "UPPER");
    }

    #[test]
    fn function_id_without_operands_is_bare_name() {
        let today = RexCall::new(
            SqlOperator::identifier("CURRENT_DATE"),
            Vec::new(),
            RelDataType::not_null(SqlTypeName::Date),
        );
        let niladic = RexCall::new(
            SqlOperator::function("RAND", OperandCount::Exactly(0)),
            Vec::new(),
            RelDataType::not_null(SqlTypeName::Double),
        );
        assert_eq!(today.digest(), "CURRENT_DATE");
        assert_eq!(niladic.digest(), "RAND()");
    }
}
