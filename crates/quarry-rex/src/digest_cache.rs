//! Interning of row expressions by digest and type.
//!
//! A digest does not always carry the type: `$0` over an INTEGER input and
//! `$0` over a VARCHAR input print the same, as do the integer `1` and the
//! decimal `1`. Two nodes are therefore only shared when both digest and
//! type agree. Interning every node through a [`DigestCache`] makes equal
//! subexpressions share one `Arc`, which turns plan comparison into pointer
//! comparison and keeps DAG-shaped plans small.

use std::sync::Arc;

use indexmap::IndexMap;
use quarry_foundation::DigestHasher;
use tracing::{debug, warn};

use crate::node::RexNode;
use crate::types::RelDataType;

/// Stable 64-bit key of a node: its digest and its type.
///
/// Independent of process, platform and hasher seed, so it can key a plan
/// cache that outlives the process. Nodes that [`DigestCache`] would share
/// have equal keys.
pub fn digest_key(node: &RexNode) -> u64 {
    DigestHasher::new()
        .chain(node.digest())
        .chain(":")
        .chain(&node.ty().to_string())
        .finish()
}

/// Bounded map from digest to the first node seen with each type.
#[derive(Debug, Clone)]
pub struct DigestCache {
    /// Nodes with the same digest, one per distinct type.
    nodes: IndexMap<String, Vec<Arc<RexNode>>>,
    len: usize,
    capacity: usize,
    overflowed: bool,
}

impl DigestCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            nodes: IndexMap::new(),
            len: 0,
            capacity,
            overflowed: false,
        }
    }

    /// Return the cached node with `node`'s digest and type, caching `node`
    /// if absent.
    ///
    /// Once the cache is full, new nodes are returned without being cached.
    pub fn intern(&mut self, node: RexNode) -> Arc<RexNode> {
        if let Some(existing) = self.get(node.digest(), node.ty()) {
            debug!(digest = %node.digest(), "digest cache hit");
            return Arc::clone(existing);
        }
        self.insert(Arc::new(node))
    }

    /// Like [`DigestCache::intern`] for a node that is already shared.
    pub fn intern_arc(&mut self, node: Arc<RexNode>) -> Arc<RexNode> {
        if let Some(existing) = self.get(node.digest(), node.ty()) {
            debug!(digest = %node.digest(), "digest cache hit");
            return Arc::clone(existing);
        }
        self.insert(node)
    }

    fn insert(&mut self, node: Arc<RexNode>) -> Arc<RexNode> {
        if self.len >= self.capacity {
            if !self.overflowed {
                warn!(
                    capacity = self.capacity,
                    "digest cache full, new expressions are no longer shared"
                );
                self.overflowed = true;
            }
            return node;
        }
        self.nodes
            .entry(node.digest().to_string())
            .or_default()
            .push(Arc::clone(&node));
        self.len += 1;
        node
    }

    /// The cached node with this digest and type.
    pub fn get(&self, digest: &str, ty: &RelDataType) -> Option<&Arc<RexNode>> {
        self.nodes.get(digest)?.iter().find(|n| n.ty() == ty)
    }

    /// Whether any node with this digest is cached, whatever its type.
    pub fn contains(&self, digest: &str) -> bool {
        self.nodes.contains_key(digest)
    }

    /// Number of cached nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Cached digests in insertion order, each listed once.
    pub fn digests(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.len = 0;
        self.overflowed = false;
    }
}
