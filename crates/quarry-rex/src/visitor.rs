//! Traversal over row expressions.
//!
//! Three tools, from most to least structured:
//!
//! - [`RexVisitor`]: double dispatch. One required handler per variant, so
//!   adding a variant breaks every visitor until it handles the new case.
//! - [`RexShuttle`]: rewriting traversal that rebuilds only the nodes whose
//!   children changed, keeping unchanged subtrees shared.
//! - [`walk_rex`]: closure-based pre-order walk for analysis passes that
//!   only need to look at nodes.
//!
//! # Examples
//!
//! ```rust,ignore
//! struct CountFieldAccesses(usize);
//!
//! impl RexVisitor<()> for CountFieldAccesses {
//!     fn visit_field_access(&mut self, field_access: &RexFieldAccess) {
//!         self.0 += 1;
//!         field_access.reference_expr().accept(self);
//!     }
//!     // ... one handler per variant
//! }
//! ```

use std::sync::Arc;

use crate::call::RexCall;
use crate::field_access::RexFieldAccess;
use crate::leaf::{RexCorrelVariable, RexInputRef, RexLiteral};
use crate::node::RexNode;

/// Visitor over the closed set of row-expression variants.
///
/// `node.accept(visitor)` calls exactly the handler matching `node.kind()`,
/// passes the node itself, and returns the handler's result unchanged.
pub trait RexVisitor<R> {
    fn visit_input_ref(&mut self, input_ref: &RexInputRef) -> R;

    fn visit_literal(&mut self, literal: &RexLiteral) -> R;

    fn visit_correl_variable(&mut self, variable: &RexCorrelVariable) -> R;

    fn visit_call(&mut self, call: &RexCall) -> R;

    fn visit_field_access(&mut self, field_access: &RexFieldAccess) -> R;
}

/// Rewriting traversal.
///
/// Each handler receives the `Arc` holding the node and the node's variant,
/// and returns the replacement. The default handlers rewrite children and
/// return the original `Arc` when no child changed (by pointer identity), so
/// a shuttle that rewrites nothing returns its input unchanged.
pub trait RexShuttle {
    /// Rewrite `node` by dispatching on its variant.
    fn apply(&mut self, node: &Arc<RexNode>) -> Arc<RexNode> {
        match node.as_ref() {
            RexNode::Literal(literal) => self.visit_literal(node, literal),
            RexNode::InputRef(input_ref) => self.visit_input_ref(node, input_ref),
            RexNode::CorrelVariable(variable) => self.visit_correl_variable(node, variable),
            RexNode::Call(call) => self.visit_call(node, call),
            RexNode::FieldAccess(field_access) => self.visit_field_access(node, field_access),
        }
    }

    fn visit_literal(&mut self, node: &Arc<RexNode>, _literal: &RexLiteral) -> Arc<RexNode> {
        Arc::clone(node)
    }

    fn visit_input_ref(&mut self, node: &Arc<RexNode>, _input_ref: &RexInputRef) -> Arc<RexNode> {
        Arc::clone(node)
    }

    fn visit_correl_variable(
        &mut self,
        node: &Arc<RexNode>,
        _variable: &RexCorrelVariable,
    ) -> Arc<RexNode> {
        Arc::clone(node)
    }

    fn visit_call(&mut self, node: &Arc<RexNode>, call: &RexCall) -> Arc<RexNode> {
        let operands: Vec<Arc<RexNode>> = call.operands().iter().map(|o| self.apply(o)).collect();
        let changed = operands
            .iter()
            .zip(call.operands())
            .any(|(new, old)| !Arc::ptr_eq(new, old));
        if changed {
            Arc::new(RexNode::Call(call.with_operands(operands)))
        } else {
            Arc::clone(node)
        }
    }

    fn visit_field_access(
        &mut self,
        node: &Arc<RexNode>,
        field_access: &RexFieldAccess,
    ) -> Arc<RexNode> {
        let reference = self.apply(field_access.reference_expr());
        if Arc::ptr_eq(&reference, field_access.reference_expr()) {
            Arc::clone(node)
        } else {
            Arc::new(RexNode::FieldAccess(field_access.with_reference_expr(reference)))
        }
    }
}

/// Walk an expression tree in pre-order, calling `visitor` for each node.
///
/// A subtree shared by several parents is visited once per parent.
pub fn walk_rex<V>(node: &RexNode, visitor: &mut V)
where
    V: FnMut(&RexNode),
{
    visitor(node);
    for operand in node.operands() {
        walk_rex(operand, visitor);
    }
}
