//! Field access: "take field F of the value produced by expression E".
//!
//! Plain column references into an operator's input are [`RexInputRef`]s.
//! A field access is mostly used to read fields of a correlation variable,
//! e.g. `dept.deptno` in
//!
//! ```sql
//! SELECT ename
//! FROM dept
//! WHERE EXISTS (
//!     SELECT NULL
//!     FROM emp
//!     WHERE emp.deptno = dept.deptno
//!     AND gender = 'F')
//! ```
//!
//! where `dept` is the correlation variable `$cor0` and the access digests as
//! `$cor0.deptno`.
//!
//! # Invariants
//!
//! 1. The field descriptor is fixed at construction.
//! 2. The reference expression can be replaced, and every replacement
//!    recomputes the digest before the call returns.
//! 3. The static type is the field's type, read through the descriptor and
//!    never stored separately.
//! 4. The digest is `<reference digest>.<field name>`.
//!
//! The node does not check that the reference's type contains the field;
//! [`RexBuilder::make_field_access`](crate::builder::RexBuilder::make_field_access)
//! does that lookup.
//!
//! [`RexInputRef`]: crate::leaf::RexInputRef

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, RexError};
use crate::kind::SqlKind;
use crate::node::RexNode;
use crate::types::{RelDataType, RelDataTypeField};
use crate::visitor::RexVisitor;

/// Separator between the reference digest and the field name.
pub const DIGEST_SEPARATOR: char = '.';

/// Access to a named field of a row-valued expression.
#[derive(Debug)]
pub struct RexFieldAccess {
    expr: Arc<RexNode>,
    field: Arc<RelDataTypeField>,
    digest: String,
}

impl RexFieldAccess {
    pub fn new(expr: Arc<RexNode>, field: Arc<RelDataTypeField>) -> Self {
        let digest = Self::compute_digest(&expr, &field);
        Self {
            expr,
            field,
            digest,
        }
    }

    /// Build from parts that may be missing.
    ///
    /// Used by callers that assemble a field access from optional pieces, such
    /// as rewrite passes that resolve the reference and the field separately.
    /// No partial node is ever returned.
    pub fn try_from_parts(
        expr: Option<Arc<RexNode>>,
        field: Option<Arc<RelDataTypeField>>,
    ) -> Result<Self> {
        let expr = expr.ok_or_else(|| {
            RexError::invalid_argument("field access requires a reference expression")
        })?;
        let field =
            field.ok_or_else(|| RexError::invalid_argument("field access requires a field"))?;
        Ok(Self::new(expr, field))
    }

    fn compute_digest(expr: &RexNode, field: &RelDataTypeField) -> String {
        let reference = expr.digest();
        let name = field.name();
        let mut digest = String::with_capacity(reference.len() + 1 + name.len());
        digest.push_str(reference);
        digest.push(DIGEST_SEPARATOR);
        digest.push_str(name);
        digest
    }

    /// The field being accessed.
    pub fn field(&self) -> &Arc<RelDataTypeField> {
        &self.field
    }

    /// Name of the field being accessed.
    pub fn name(&self) -> &str {
        self.field.name()
    }

    /// The expression whose field is being accessed.
    pub fn reference_expr(&self) -> &Arc<RexNode> {
        &self.expr
    }

    /// Replace the expression whose field is being accessed.
    ///
    /// The digest is recomputed before returning. This is the only mutation a
    /// field access supports; taking `&mut self` means nobody else can be
    /// reading this node while it happens. To rewrite a node that may be
    /// shared, use [`RexFieldAccess::with_reference_expr`] or
    /// [`RexNode::replace_reference_expr`].
    pub fn set_reference_expr(&mut self, expr: Arc<RexNode>) {
        self.digest = Self::compute_digest(&expr, &self.field);
        self.expr = expr;
    }

    /// A new field access of the same field over a different expression.
    pub fn with_reference_expr(&self, expr: Arc<RexNode>) -> Self {
        Self::new(expr, Arc::clone(&self.field))
    }

    pub fn kind(&self) -> SqlKind {
        SqlKind::FieldAccess
    }

    pub fn ty(&self) -> &RelDataType {
        self.field.ty()
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn accept<R, V: RexVisitor<R> + ?Sized>(&self, visitor: &mut V) -> R {
        visitor.visit_field_access(self)
    }
}

/// Shallow copy: the clone shares the reference expression and the field.
impl Clone for RexFieldAccess {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.expr), Arc::clone(&self.field))
    }
}

impl fmt::Display for RexFieldAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digest)
    }
}
