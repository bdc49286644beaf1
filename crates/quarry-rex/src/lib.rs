#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Quarry Rex
//!
//! Row expressions: the scalar expression IR of the quarry query compiler.
//! Expressions are immutable-by-default trees of [`RexNode`]s whose children
//! are shared through `Arc`, identified by a canonical digest, and visited
//! through [`RexVisitor`] or rewritten through [`RexShuttle`].
//!
//! Build nodes with a [`RexBuilder`]; it resolves field names, checks operand
//! counts and derives result types.

pub mod builder;
pub mod call;
pub mod config;
pub mod decorrelate;
pub mod digest_cache;
pub mod error;
pub mod field_access;
pub mod kind;
pub mod leaf;
pub mod node;
pub mod types;
pub mod visitor;

pub use builder::RexBuilder;
pub use call::{OperandCount, RexCall, SqlOperator, SqlSyntax};
pub use config::RexConfig;
pub use decorrelate::{collect_correlation_ids, correlated_fields, CorrelationRewriter};
pub use digest_cache::{digest_key, DigestCache};
pub use error::{Result, RexError};
pub use field_access::RexFieldAccess;
pub use kind::SqlKind;
pub use leaf::{LiteralValue, RexCorrelVariable, RexInputRef, RexLiteral};
pub use node::RexNode;
pub use types::{RelDataType, RelDataTypeField, RowType, SqlTypeName};
pub use visitor::{walk_rex, RexShuttle, RexVisitor};

pub use quarry_foundation::CorrelationId;
