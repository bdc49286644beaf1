//! Row-expression nodes.
//!
//! [`RexNode`] is the closed set of expression variants. Every variant
//! implements the same contract:
//!
//! - **kind**: a [`SqlKind`] tag, usable without dispatching a visitor
//! - **type**: the static result type, side-effect free
//! - **digest**: canonical string computed at construction and recomputed by
//!   every permitted mutation, never stale
//! - **accept**: double dispatch to the matching [`RexVisitor`] handler
//!
//! # Sharing
//!
//! Children are held as `Arc<RexNode>`, so one subtree can hang under several
//! parents (common-subexpression sharing) and cloning a node is shallow.
//! Parents never hand out their children mutably; a rewrite either rebuilds
//! the path to the root or goes through [`RexNode::replace_reference_expr`],
//! which detaches a shared node before mutating it.
//!
//! # Identity
//!
//! Equality and hashing use the digest only. Two nodes are the same
//! expression exactly when their digests are equal, for every variant.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::debug;

use crate::call::RexCall;
use crate::error::{Result, RexError};
use crate::field_access::RexFieldAccess;
use crate::kind::SqlKind;
use crate::leaf::{RexCorrelVariable, RexInputRef, RexLiteral};
use crate::types::RelDataType;
use crate::visitor::RexVisitor;

/// A row expression.
#[derive(Debug, Clone)]
pub enum RexNode {
    Literal(RexLiteral),
    InputRef(RexInputRef),
    CorrelVariable(RexCorrelVariable),
    Call(RexCall),
    FieldAccess(RexFieldAccess),
}

impl RexNode {
    pub fn kind(&self) -> SqlKind {
        match self {
            RexNode::Literal(n) => n.kind(),
            RexNode::InputRef(n) => n.kind(),
            RexNode::CorrelVariable(n) => n.kind(),
            RexNode::Call(n) => n.kind(),
            RexNode::FieldAccess(n) => n.kind(),
        }
    }

    pub fn ty(&self) -> &RelDataType {
        match self {
            RexNode::Literal(n) => n.ty(),
            RexNode::InputRef(n) => n.ty(),
            RexNode::CorrelVariable(n) => n.ty(),
            RexNode::Call(n) => n.ty(),
            RexNode::FieldAccess(n) => n.ty(),
        }
    }

    pub fn digest(&self) -> &str {
        match self {
            RexNode::Literal(n) => n.digest(),
            RexNode::InputRef(n) => n.digest(),
            RexNode::CorrelVariable(n) => n.digest(),
            RexNode::Call(n) => n.digest(),
            RexNode::FieldAccess(n) => n.digest(),
        }
    }

    /// Dispatch to the visitor handler for this variant and return its result.
    pub fn accept<R, V: RexVisitor<R> + ?Sized>(&self, visitor: &mut V) -> R {
        match self {
            RexNode::Literal(n) => n.accept(visitor),
            RexNode::InputRef(n) => n.accept(visitor),
            RexNode::CorrelVariable(n) => n.accept(visitor),
            RexNode::Call(n) => n.accept(visitor),
            RexNode::FieldAccess(n) => n.accept(visitor),
        }
    }

    pub fn as_field_access(&self) -> Option<&RexFieldAccess> {
        match self {
            RexNode::FieldAccess(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_correl_variable(&self) -> Option<&RexCorrelVariable> {
        match self {
            RexNode::CorrelVariable(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&RexCall> {
        match self {
            RexNode::Call(n) => Some(n),
            _ => None,
        }
    }

    /// Direct children, left to right.
    pub fn operands(&self) -> &[Arc<RexNode>] {
        match self {
            RexNode::Call(call) => call.operands(),
            RexNode::FieldAccess(field_access) => {
                std::slice::from_ref(field_access.reference_expr())
            }
            RexNode::Literal(_) | RexNode::InputRef(_) | RexNode::CorrelVariable(_) => &[],
        }
    }

    /// Replace the reference expression of the field access held in `node`.
    ///
    /// If `node` is the only handle to the field access it is mutated in
    /// place. Otherwise `node` is first detached onto a private copy, so every
    /// other holder keeps seeing the old reference and the old digest.
    ///
    /// Fails with [`RexError::InvalidArgument`] if `node` is not a field access.
    pub fn replace_reference_expr(node: &mut Arc<RexNode>, expr: Arc<RexNode>) -> Result<()> {
        if node.kind() != SqlKind::FieldAccess {
            return Err(RexError::invalid_argument(format!(
                "cannot replace the reference expression of {} node '{}'",
                node.kind(),
                node.digest()
            )));
        }

        if Arc::strong_count(node) > 1 || Arc::weak_count(node) > 0 {
            debug!(digest = %node.digest(), "detaching shared field access before rewrite");
        }

        if let RexNode::FieldAccess(field_access) = Arc::make_mut(node) {
            field_access.set_reference_expr(expr);
        }
        Ok(())
    }
}

impl PartialEq for RexNode {
    fn eq(&self, other: &Self) -> bool {
        self.digest() == other.digest()
    }
}

impl Eq for RexNode {}

impl Hash for RexNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.digest().hash(state);
    }
}

impl fmt::Display for RexNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.digest())
    }
}

impl From<RexLiteral> for RexNode {
    fn from(value: RexLiteral) -> Self {
        RexNode::Literal(value)
    }
}

impl From<RexInputRef> for RexNode {
    fn from(value: RexInputRef) -> Self {
        RexNode::InputRef(value)
    }
}

impl From<RexCorrelVariable> for RexNode {
    fn from(value: RexCorrelVariable) -> Self {
        RexNode::CorrelVariable(value)
    }
}

impl From<RexCall> for RexNode {
    fn from(value: RexCall) -> Self {
        RexNode::Call(value)
    }
}

impl From<RexFieldAccess> for RexNode {
    fn from(value: RexFieldAccess) -> Self {
        RexNode::FieldAccess(value)
    }
}
