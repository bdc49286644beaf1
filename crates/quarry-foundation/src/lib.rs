//! Quarry Foundation
//!
//! Primitives shared by the quarry query-compiler crates: stable hashing of
//! canonical digests and typed identifiers for correlation variables.

pub mod ids;
pub mod stable_hash;

pub use ids::CorrelationId;
pub use stable_hash::{digest_hash, DigestHasher};
