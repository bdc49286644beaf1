//! Typed identifiers.
//!
//! Identifiers are thin wrappers that keep different id spaces from being
//! mixed up and give them a consistent serialized form.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix of every correlation variable name.
pub const CORREL_PREFIX: &str = "$cor";

/// Identifier of a correlation variable.
///
/// A correlation variable names the current row of an enclosing query block
/// so that a nested subquery can read its fields. The display form is the
/// variable name used in expression digests, e.g. `$cor0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CorrelationId(u32);

impl CorrelationId {
    /// Creates the correlation id with the given ordinal.
    pub const fn new(ordinal: u32) -> Self {
        Self(ordinal)
    }

    /// Returns the ordinal.
    pub const fn ordinal(&self) -> u32 {
        self.0
    }

    /// Returns the variable name, e.g. `$cor3`.
    pub fn name(&self) -> String {
        format!("{CORREL_PREFIX}{}", self.0)
    }

    /// Parses a variable name of the form `$cor<ordinal>`.
    pub fn parse(name: &str) -> Option<Self> {
        name.strip_prefix(CORREL_PREFIX)?
            .parse::<u32>()
            .ok()
            .map(Self)
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CORREL_PREFIX}{}", self.0)
    }
}

impl From<u32> for CorrelationId {
    fn from(ordinal: u32) -> Self {
        Self(ordinal)
    }
}
