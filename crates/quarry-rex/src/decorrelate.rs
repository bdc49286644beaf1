//! Correlation analysis and rewriting.
//!
//! A correlated subquery reads the current row of an enclosing query block
//! through a correlation variable, e.g. `$cor0.deptno` in
//! `AND(=($1, $cor0.deptno), =($2, 'F'))`. Decorrelation replaces that
//! variable with an expression over the subquery's own inputs (typically a
//! join input) so the subquery can run as a join.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use quarry_foundation::CorrelationId;
use tracing::{debug, warn};

use crate::error::{Result, RexError};
use crate::field_access::RexFieldAccess;
use crate::node::RexNode;
use crate::types::RelDataTypeField;
use crate::visitor::{walk_rex, RexShuttle};

/// Replaces correlation variable `id` under field accesses with another
/// row-typed expression.
///
/// Each rewritten field access reads the field of the same name from the
/// replacement's row type, so its ordinal and type follow the replacement's
/// layout. [`CorrelationRewriter::rewrite`] checks up front that every such
/// field exists; [`RexShuttle::apply`] leaves an access to a missing field
/// unchanged. Nodes are rebuilt, so an input tree that is shared elsewhere is
/// never modified.
#[derive(Debug)]
pub struct CorrelationRewriter {
    id: CorrelationId,
    replacement: Arc<RexNode>,
    rewrites: usize,
}

impl CorrelationRewriter {
    /// Fails with [`RexError::InvalidArgument`] unless `replacement` is
    /// row-typed.
    pub fn new(id: CorrelationId, replacement: Arc<RexNode>) -> Result<Self> {
        if !replacement.ty().is_row() {
            return Err(RexError::invalid_argument(format!(
                "replacement for {id} must be row-typed, got '{}' of type '{}'",
                replacement.digest(),
                replacement.ty()
            )));
        }
        Ok(Self {
            id,
            replacement,
            rewrites: 0,
        })
    }

    /// Field accesses rewritten so far.
    pub fn rewrite_count(&self) -> usize {
        self.rewrites
    }

    /// Rewrite `node` after checking that the replacement's row type has
    /// every field read through the correlation variable.
    ///
    /// Fails with [`RexError::FieldNotFound`] naming the first missing field.
    pub fn rewrite(&mut self, node: &Arc<RexNode>) -> Result<Arc<RexNode>> {
        for field in correlated_fields(node, self.id) {
            if self.replacement_field(field.name()).is_none() {
                return Err(RexError::FieldNotFound {
                    row_type: self.replacement.ty().to_string(),
                    field: field.name().to_string(),
                });
            }
        }
        Ok(self.apply(node))
    }

    fn replacement_field(&self, name: &str) -> Option<&Arc<RelDataTypeField>> {
        self.replacement.ty().as_row()?.field(name, true)
    }

    fn references_id(&self, node: &RexNode) -> bool {
        node.as_correl_variable()
            .is_some_and(|variable| variable.id() == self.id)
    }
}

impl RexShuttle for CorrelationRewriter {
    fn visit_field_access(
        &mut self,
        node: &Arc<RexNode>,
        field_access: &RexFieldAccess,
    ) -> Arc<RexNode> {
        if !self.references_id(field_access.reference_expr()) {
            let reference = self.apply(field_access.reference_expr());
            if Arc::ptr_eq(&reference, field_access.reference_expr()) {
                return Arc::clone(node);
            }
            return Arc::new(RexNode::FieldAccess(field_access.with_reference_expr(reference)));
        }

        let Some(field) = self.replacement_field(field_access.name()) else {
            warn!(
                digest = %field_access.digest(),
                replacement = %self.replacement.ty(),
                "replacement has no such field, access left unchanged"
            );
            return Arc::clone(node);
        };
        let rewritten = RexFieldAccess::new(Arc::clone(&self.replacement), Arc::clone(field));
        debug!(
            from = %field_access.digest(),
            to = %rewritten.digest(),
            "rewrote correlated field access"
        );
        self.rewrites += 1;
        Arc::new(RexNode::FieldAccess(rewritten))
    }
}

/// Correlation variables referenced anywhere in `node`, in first-seen order.
pub fn collect_correlation_ids(node: &RexNode) -> IndexSet<CorrelationId> {
    let mut ids = IndexSet::new();
    walk_rex(node, &mut |n: &RexNode| {
        if let Some(variable) = n.as_correl_variable() {
            ids.insert(variable.id());
        }
    });
    ids
}

/// Fields read directly through correlation variable `id`, in first-seen
/// order, each listed once.
pub fn correlated_fields(node: &RexNode, id: CorrelationId) -> Vec<Arc<RelDataTypeField>> {
    let mut fields: IndexMap<String, Arc<RelDataTypeField>> = IndexMap::new();
    walk_rex(node, &mut |n: &RexNode| {
        let Some(field_access) = n.as_field_access() else {
            return;
        };
        let through_id = field_access
            .reference_expr()
            .as_correl_variable()
            .is_some_and(|variable| variable.id() == id);
        if through_id {
            fields
                .entry(field_access.digest().to_string())
                .or_insert_with(|| Arc::clone(field_access.field()));
        }
    });
    fields.into_values().collect()
}
