//! Construction of row expressions.
//!
//! [`RexBuilder`] is the entry point compiler passes use to create nodes. It
//! performs the checks the nodes themselves leave out:
//!
//! - field accesses resolve the field by name against the reference's row type
//! - input references stay inside their row type
//! - calls get the right operand count and a result type
//!
//! When [`RexConfig::share_common_subexpressions`] is set, every node is
//! interned in a [`DigestCache`] so expressions built by the same builder
//! with equal digests and equal types are the same `Arc`.
//!
//! # Call result types
//!
//! | Operator kind | Result type |
//! |---------------|-------------|
//! | comparison, `AND`, `OR`, `NOT` | BOOLEAN, nullable if any operand is |
//! | `IS NULL`, `IS NOT NULL` | BOOLEAN NOT NULL |
//! | `+`, `-`, `*` | first operand's type, nullable if any operand is |
//! | other functions | supplied by the caller ([`RexBuilder::make_call_with_type`]) |

use std::sync::Arc;

use quarry_foundation::CorrelationId;
use tracing::trace;

use crate::call::{RexCall, SqlOperator};
use crate::config::RexConfig;
use crate::digest_cache::DigestCache;
use crate::error::{Result, RexError};
use crate::field_access::RexFieldAccess;
use crate::leaf::{LiteralValue, RexCorrelVariable, RexInputRef, RexLiteral};
use crate::node::RexNode;
use crate::types::{RelDataType, RowType, SqlTypeName};

/// Factory for row expressions.
#[derive(Debug)]
pub struct RexBuilder {
    config: RexConfig,
    cache: DigestCache,
}

impl RexBuilder {
    /// Create a builder after validating `config`.
    pub fn new(config: RexConfig) -> Result<Self> {
        config.validate()?;
        let cache = DigestCache::new(config.max_cache_entries);
        Ok(Self { config, cache })
    }

    pub fn config(&self) -> &RexConfig {
        &self.config
    }

    /// Nodes interned so far.
    pub fn cache(&self) -> &DigestCache {
        &self.cache
    }

    fn register(&mut self, node: RexNode) -> Arc<RexNode> {
        trace!(kind = %node.kind(), digest = %node.digest(), "rex node built");
        if self.config.share_common_subexpressions {
            self.cache.intern(node)
        } else {
            Arc::new(node)
        }
    }

    /// Reference to input field `index` of `row_type`.
    pub fn make_input_ref(&mut self, row_type: &RelDataType, index: usize) -> Result<Arc<RexNode>> {
        let row = row_of(row_type, &format!("${index}"))?;
        let field = row.field_at(index).ok_or_else(|| RexError::InputOutOfRange {
            index,
            count: row.field_count(),
            row_type: row_type.to_string(),
        })?;
        let ty = field.ty().clone();
        Ok(self.register(RexInputRef::new(index, ty).into()))
    }

    /// Integer literal; INTEGER when it fits in 32 bits, BIGINT otherwise.
    pub fn make_literal_int(&mut self, value: i64) -> Arc<RexNode> {
        let name = if i32::try_from(value).is_ok() {
            SqlTypeName::Integer
        } else {
            SqlTypeName::Bigint
        };
        self.register(
            RexLiteral::new(LiteralValue::Integer(value), RelDataType::not_null(name)).into(),
        )
    }

    /// Exact decimal literal from its text, e.g. `-12.50`.
    pub fn make_literal_decimal(&mut self, text: &str) -> Result<Arc<RexNode>> {
        if !is_decimal_text(text) {
            return Err(RexError::invalid_argument(format!(
                "'{text}' is not a decimal literal"
            )));
        }
        Ok(self.register(
            RexLiteral::new(
                LiteralValue::Decimal(text.to_string()),
                RelDataType::not_null(SqlTypeName::Decimal),
            )
            .into(),
        ))
    }

    pub fn make_literal_bool(&mut self, value: bool) -> Arc<RexNode> {
        self.register(
            RexLiteral::new(
                LiteralValue::Boolean(value),
                RelDataType::not_null(SqlTypeName::Boolean),
            )
            .into(),
        )
    }

    pub fn make_literal_string(&mut self, value: impl Into<String>) -> Arc<RexNode> {
        self.register(
            RexLiteral::new(
                LiteralValue::String(value.into()),
                RelDataType::not_null(SqlTypeName::Varchar),
            )
            .into(),
        )
    }

    /// Null of the given scalar type.
    pub fn make_null_literal(&mut self, name: SqlTypeName) -> Arc<RexNode> {
        self.register(RexLiteral::new(LiteralValue::Null, RelDataType::nullable(name)).into())
    }

    /// Correlation variable `id` ranging over rows of `row_type`.
    pub fn make_correl(&mut self, id: CorrelationId, row_type: RelDataType) -> Arc<RexNode> {
        self.register(RexCorrelVariable::new(id, row_type).into())
    }

    /// Call of a builtin operator with a derived result type.
    pub fn make_call(
        &mut self,
        op: SqlOperator,
        operands: Vec<Arc<RexNode>>,
    ) -> Result<Arc<RexNode>> {
        check_operand_count(&op, &operands)?;
        let ty = derive_call_type(&op, &operands)?;
        Ok(self.register(RexCall::new(op, operands, ty).into()))
    }

    /// Call with an explicit result type.
    pub fn make_call_with_type(
        &mut self,
        op: SqlOperator,
        operands: Vec<Arc<RexNode>>,
        ty: RelDataType,
    ) -> Result<Arc<RexNode>> {
        check_operand_count(&op, &operands)?;
        Ok(self.register(RexCall::new(op, operands, ty).into()))
    }

    /// Access field `name` of `expr`, resolved against `expr`'s row type.
    ///
    /// Names are matched according to [`RexConfig::case_sensitive`].
    pub fn make_field_access(&mut self, expr: Arc<RexNode>, name: &str) -> Result<Arc<RexNode>> {
        let row = row_of(expr.ty(), name)?;
        let field = row
            .field(name, self.config.case_sensitive)
            .ok_or_else(|| RexError::FieldNotFound {
                row_type: expr.ty().to_string(),
                field: name.to_string(),
            })?;
        let field = Arc::clone(field);
        Ok(self.register(RexFieldAccess::new(expr, field).into()))
    }

    /// Access the field at ordinal `index` of `expr`'s row type.
    pub fn make_field_access_by_index(
        &mut self,
        expr: Arc<RexNode>,
        index: usize,
    ) -> Result<Arc<RexNode>> {
        let row = row_of(expr.ty(), &format!("#{index}"))?;
        let field = row.field_at(index).ok_or_else(|| RexError::InputOutOfRange {
            index,
            count: row.field_count(),
            row_type: expr.ty().to_string(),
        })?;
        let field = Arc::clone(field);
        Ok(self.register(RexFieldAccess::new(expr, field).into()))
    }
}

impl Default for RexBuilder {
    fn default() -> Self {
        let config = RexConfig::default();
        let cache = DigestCache::new(config.max_cache_entries);
        Self { config, cache }
    }
}

fn row_of<'a>(ty: &'a RelDataType, field: &str) -> Result<&'a RowType> {
    ty.as_row().ok_or_else(|| RexError::NotARowType {
        ty: ty.to_string(),
        field: field.to_string(),
    })
}

fn check_operand_count(op: &SqlOperator, operands: &[Arc<RexNode>]) -> Result<()> {
    if op.operand_count().accepts(operands.len()) {
        Ok(())
    } else {
        Err(RexError::invalid_argument(format!(
            "operator '{}' takes {} operands, got {}",
            op.name(),
            op.operand_count(),
            operands.len()
        )))
    }
}

fn derive_call_type(op: &SqlOperator, operands: &[Arc<RexNode>]) -> Result<RelDataType> {
    let kind = op.kind();
    let any_nullable = operands.iter().any(|o| o.ty().is_nullable());

    if kind.is_null_test() {
        return Ok(RelDataType::not_null(SqlTypeName::Boolean));
    }
    if kind.is_comparison() || kind.is_logical() {
        return Ok(RelDataType::Scalar {
            name: SqlTypeName::Boolean,
            nullable: any_nullable,
        });
    }
    if kind.is_arithmetic() {
        if let Some(first) = operands.first() {
            return Ok(first.ty().with_nullability(any_nullable));
        }
    }
    Err(RexError::invalid_argument(format!(
        "cannot derive the result type of '{}'; supply it with make_call_with_type",
        op.name()
    )))
}

/// `-?digits(.digits)?`
fn is_decimal_text(text: &str) -> bool {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    all_digits(int_part) && frac_part.map_or(true, all_digits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::OperandCount;
    use crate::kind::SqlKind;

    fn emp_row() -> RelDataType {
        RelDataType::row(vec![
            ("empno".to_string(), RelDataType::not_null(SqlTypeName::Integer)),
            ("deptno".to_string(), RelDataType::nullable(SqlTypeName::Integer)),
            ("gender".to_string(), RelDataType::not_null(SqlTypeName::Varchar)),
        ])
    }

    #[test]
    fn input_ref_takes_field_type() {
        let mut b = RexBuilder::default();
        let r = b.make_input_ref(&emp_row(), 1).unwrap();
        assert_eq!(r.digest(), "$1");
        assert!(r.ty().is_nullable());
    }

    #[test]
    fn input_ref_out_of_range() {
        let mut b = RexBuilder::default();
        let err = b.make_input_ref(&emp_row(), 3).unwrap_err();
        assert!(matches!(err, RexError::InputOutOfRange { index: 3, count: 3, .. }));
    }

    #[test]
    fn field_access_resolves_by_name() {
        let mut b = RexBuilder::default();
        let cor = b.make_correl(CorrelationId::new(0), emp_row());
        let access = b.make_field_access(cor, "deptno").unwrap();

        assert_eq!(access.digest(), "$cor0.deptno");
        assert_eq!(access.kind(), SqlKind::FieldAccess);
        assert_eq!(access.as_field_access().unwrap().field().index(), 1);
    }

    #[test]
    fn field_access_unknown_field() {
        let mut b = RexBuilder::default();
        let cor = b.make_correl(CorrelationId::new(0), emp_row());
        let err = b.make_field_access(cor, "DEPTNO").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Type 'RecordType(INTEGER NOT NULL empno, INTEGER deptno, VARCHAR NOT NULL gender)' \
             has no field 'DEPTNO'"
        );
    }

    #[test]
    fn field_access_case_insensitive() {
        let config = RexConfig {
            case_sensitive: false,
            ..RexConfig::default()
        };
        let mut b = RexBuilder::new(config).unwrap();
        let cor = b.make_correl(CorrelationId::new(0), emp_row());
        let access = b.make_field_access(cor, "DEPTNO").unwrap();
        // the digest uses the declared name
        assert_eq!(access.digest(), "$cor0.deptno");
    }

    #[test]
    fn field_access_on_scalar_fails() {
        let mut b = RexBuilder::default();
        let one = b.make_literal_int(1);
        let err = b.make_field_access(one, "x").unwrap_err();
        assert!(matches!(err, RexError::NotARowType { .. }));
    }

    #[test]
    fn field_access_by_index() {
        let mut b = RexBuilder::default();
        let cor = b.make_correl(CorrelationId::new(2), emp_row());
        let access = b.make_field_access_by_index(Arc::clone(&cor), 2).unwrap();
        assert_eq!(access.digest(), "$cor2.gender");
        assert!(b.make_field_access_by_index(cor, 9).is_err());
    }

    #[test]
    fn sharing_interns_equal_nodes() {
        let mut b = RexBuilder::default();
        let cor = b.make_correl(CorrelationId::new(0), emp_row());
        let a = b.make_field_access(Arc::clone(&cor), "deptno").unwrap();
        let c = b.make_field_access(cor, "deptno").unwrap();
        assert!(Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn integer_and_decimal_with_same_digest_keep_their_types() {
        let mut b = RexBuilder::default();
        let int = b.make_literal_int(1);
        let dec = b.make_literal_decimal("1").unwrap();

        assert_eq!(int.digest(), dec.digest());
        assert_eq!(int.ty(), &RelDataType::not_null(SqlTypeName::Integer));
        assert_eq!(dec.ty(), &RelDataType::not_null(SqlTypeName::Decimal));
        assert!(!Arc::ptr_eq(&int, &dec));
    }

    #[test]
    fn input_refs_over_different_rows_keep_their_types() {
        let mut b = RexBuilder::default();
        let ints = RelDataType::row(vec![(
            "x".to_string(),
            RelDataType::not_null(SqlTypeName::Integer),
        )]);
        let strings = RelDataType::row(vec![(
            "y".to_string(),
            RelDataType::nullable(SqlTypeName::Varchar),
        )]);

        let x = b.make_input_ref(&ints, 0).unwrap();
        let y = b.make_input_ref(&strings, 0).unwrap();

        assert_eq!(x.digest(), "$0");
        assert_eq!(y.digest(), "$0");
        assert_eq!(x.ty(), &RelDataType::not_null(SqlTypeName::Integer));
        assert_eq!(y.ty(), &RelDataType::nullable(SqlTypeName::Varchar));
    }

    #[test]
    fn correlation_variables_of_different_rows_resolve_their_own_fields() {
        let mut b = RexBuilder::default();
        let dept = RelDataType::row(vec![(
            "dname".to_string(),
            RelDataType::not_null(SqlTypeName::Varchar),
        )]);

        let as_emp = b.make_correl(CorrelationId::new(0), emp_row());
        let as_dept = b.make_correl(CorrelationId::new(0), dept);

        assert!(!Arc::ptr_eq(&as_emp, &as_dept));
        assert!(b.make_field_access(as_emp, "deptno").is_ok());
        let dname = b.make_field_access(as_dept, "dname").unwrap();
        assert_eq!(dname.digest(), "$cor0.dname");
    }

    #[test]
    fn explicit_call_types_are_not_merged() {
        let mut b = RexBuilder::default();
        let rand = SqlOperator::function("RAND", OperandCount::Exactly(0));
        let double = b
            .make_call_with_type(rand.clone(), vec![], RelDataType::not_null(SqlTypeName::Double))
            .unwrap();
        let decimal = b
            .make_call_with_type(rand, vec![], RelDataType::not_null(SqlTypeName::Decimal))
            .unwrap();

        assert_eq!(double.ty(), &RelDataType::not_null(SqlTypeName::Double));
        assert_eq!(decimal.ty(), &RelDataType::not_null(SqlTypeName::Decimal));
        assert_eq!(b.cache().len(), 2);
    }

    #[test]
    fn sharing_can_be_disabled() {
        let config = RexConfig {
            share_common_subexpressions: false,
            ..RexConfig::default()
        };
        let mut b = RexBuilder::new(config).unwrap();
        let a = b.make_literal_int(5);
        let c = b.make_literal_int(5);
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(a, c);
        assert!(b.cache().is_empty());
    }

    #[test]
    fn invalid_config_rejected() {
        let config = RexConfig {
            max_cache_entries: 0,
            ..RexConfig::default()
        };
        assert!(matches!(
            RexBuilder::new(config).unwrap_err(),
            RexError::InvalidConfig(_)
        ));
    }

    #[test]
    fn literal_types() {
        let mut b = RexBuilder::default();
        assert_eq!(
            b.make_literal_int(7).ty(),
            &RelDataType::not_null(SqlTypeName::Integer)
        );
        assert_eq!(
            b.make_literal_int(i64::from(i32::MAX) + 1).ty(),
            &RelDataType::not_null(SqlTypeName::Bigint)
        );
        assert_eq!(b.make_literal_string("F").digest(), "'F'");
        assert_eq!(b.make_null_literal(SqlTypeName::Date).digest(), "null:DATE");
        assert_eq!(b.make_literal_bool(true).digest(), "true");
        assert_eq!(b.make_literal_decimal("-12.50").unwrap().digest(), "-12.50");
    }

    #[test]
    fn malformed_decimal_rejected() {
        let mut b = RexBuilder::default();
        for text in ["", "-", "1.", ".5", "1e3", "12a"] {
            assert!(b.make_literal_decimal(text).is_err(), "{text}");
        }
    }

    #[test]
    fn comparison_nullability_follows_operands() {
        let mut b = RexBuilder::default();
        let row = emp_row();
        let empno = b.make_input_ref(&row, 0).unwrap();
        let deptno = b.make_input_ref(&row, 1).unwrap();
        let one = b.make_literal_int(1);

        let strict = b
            .make_call(SqlOperator::EQUALS, vec![Arc::clone(&empno), Arc::clone(&one)])
            .unwrap();
        let lenient = b.make_call(SqlOperator::EQUALS, vec![deptno, one]).unwrap();

        assert_eq!(strict.ty(), &RelDataType::not_null(SqlTypeName::Boolean));
        assert_eq!(lenient.ty(), &RelDataType::nullable(SqlTypeName::Boolean));
    }

    #[test]
    fn null_test_is_never_null() {
        let mut b = RexBuilder::default();
        let deptno = b.make_input_ref(&emp_row(), 1).unwrap();
        let test = b.make_call(SqlOperator::IS_NULL, vec![deptno]).unwrap();
        assert_eq!(test.digest(), "IS NULL($1)");
        assert!(!test.ty().is_nullable());
    }

    #[test]
    fn arithmetic_takes_first_operand_type() {
        let mut b = RexBuilder::default();
        let deptno = b.make_input_ref(&emp_row(), 1).unwrap();
        let ten = b.make_literal_int(10);
        let sum = b.make_call(SqlOperator::PLUS, vec![ten, deptno]).unwrap();
        assert_eq!(sum.ty(), &RelDataType::nullable(SqlTypeName::Integer));
    }

    #[test]
    fn wrong_operand_count_rejected() {
        let mut b = RexBuilder::default();
        let one = b.make_literal_int(1);
        let err = b.make_call(SqlOperator::NOT, vec![Arc::clone(&one), one]).unwrap_err();
        assert!(matches!(err, RexError::InvalidArgument(_)));
    }

    #[test]
    fn functions_need_explicit_type() {
        let mut b = RexBuilder::default();
        let name = b.make_literal_string("smith");
        let upper = SqlOperator::function("UPPER", OperandCount::Exactly(1));

        assert!(b.make_call(upper.clone(), vec![Arc::clone(&name)]).is_err());

        let call = b
            .make_call_with_type(upper, vec![name], RelDataType::not_null(SqlTypeName::Varchar))
            .unwrap();
        assert_eq!(call.digest(), "UPPER('smith')");
    }
}
