//! Leaf expressions: literals, input references and correlation variables.

use std::fmt;

use quarry_foundation::CorrelationId;
use serde::{Deserialize, Serialize};

use crate::kind::SqlKind;
use crate::types::RelDataType;
use crate::visitor::RexVisitor;

/// Value of a literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    /// Typed null; the type lives on the literal
    Null,
    Boolean(bool),
    Integer(i64),
    /// Exact decimal, kept as its canonical text
    Decimal(String),
    String(String),
}

/// Constant value.
///
/// Digest rules:
///
/// | Value | Digest |
/// |-------|--------|
/// | `Integer(10)` | `10` |
/// | `Decimal("2.50")` | `2.50` |
/// | `Boolean(true)` | `true` |
/// | `String("O'Brien")` | `'O''Brien'` |
/// | `Null` of type INTEGER | `null:INTEGER` |
#[derive(Debug, Clone)]
pub struct RexLiteral {
    value: LiteralValue,
    ty: RelDataType,
    digest: String,
}

impl RexLiteral {
    pub fn new(value: LiteralValue, ty: RelDataType) -> Self {
        let digest = Self::compute_digest(&value, &ty);
        Self { value, ty, digest }
    }

    fn compute_digest(value: &LiteralValue, ty: &RelDataType) -> String {
        match value {
            LiteralValue::Null => match ty.sql_type_name() {
                Some(name) => format!("null:{name}"),
                None => "null".to_string(),
            },
            LiteralValue::Boolean(b) => b.to_string(),
            LiteralValue::Integer(i) => i.to_string(),
            LiteralValue::Decimal(d) => d.clone(),
            LiteralValue::String(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }

    pub fn value(&self) -> &LiteralValue {
        &self.value
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, LiteralValue::Null)
    }

    pub fn kind(&self) -> SqlKind {
        SqlKind::Literal
    }

    pub fn ty(&self) -> &RelDataType {
        &self.ty
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn accept<R, V: RexVisitor<R> + ?Sized>(&self, visitor: &mut V) -> R {
        visitor.visit_literal(self)
    }
}

impl fmt::Display for RexLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digest)
    }
}

/// Reference to a field of the input row of the enclosing relational operator.
///
/// This is how plain column references (`emp.empno` in `SELECT emp.empno FROM
/// emp`) are represented. Digest: `$<index>`.
#[derive(Debug, Clone)]
pub struct RexInputRef {
    index: usize,
    ty: RelDataType,
    digest: String,
}

impl RexInputRef {
    pub fn new(index: usize, ty: RelDataType) -> Self {
        Self {
            index,
            ty,
            digest: format!("${index}"),
        }
    }

    /// Ordinal of the referenced input field.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> SqlKind {
        SqlKind::InputRef
    }

    pub fn ty(&self) -> &RelDataType {
        &self.ty
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn accept<R, V: RexVisitor<R> + ?Sized>(&self, visitor: &mut V) -> R {
        visitor.visit_input_ref(self)
    }
}

impl fmt::Display for RexInputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digest)
    }
}

/// The current row of an enclosing query block, seen from a correlated subquery.
///
/// Its type is the row type of that block; fields are read with a
/// [`RexFieldAccess`](crate::field_access::RexFieldAccess). Digest: the
/// variable name, e.g. `$cor0`.
#[derive(Debug, Clone)]
pub struct RexCorrelVariable {
    id: CorrelationId,
    ty: RelDataType,
    digest: String,
}

impl RexCorrelVariable {
    pub fn new(id: CorrelationId, ty: RelDataType) -> Self {
        Self {
            id,
            ty,
            digest: id.name(),
        }
    }

    pub fn id(&self) -> CorrelationId {
        self.id
    }

    pub fn kind(&self) -> SqlKind {
        SqlKind::CorrelVariable
    }

    pub fn ty(&self) -> &RelDataType {
        &self.ty
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn accept<R, V: RexVisitor<R> + ?Sized>(&self, visitor: &mut V) -> R {
        visitor.visit_correl_variable(self)
    }
}

impl fmt::Display for RexCorrelVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digest)
    }
}
