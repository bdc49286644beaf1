//! Row-expression errors

use thiserror::Error;

/// Result type for row-expression operations
pub type Result<T> = std::result::Result<T, RexError>;

/// Row-expression errors
///
/// Only [`RexError::InvalidArgument`] is raised by nodes themselves. The other
/// variants come from the collaborators around them: the builder that checks
/// field lookups against row types, and configuration loading.
#[derive(Debug, Error)]
pub enum RexError {
    /// A required constructor argument was missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Field lookup on a row type found no match.
    #[error("Type '{row_type}' has no field '{field}'")]
    FieldNotFound { row_type: String, field: String },

    /// Field access on an expression whose type is not a row.
    #[error("cannot access field '{field}' of non-row type '{ty}'")]
    NotARowType { ty: String, field: String },

    /// Input or field ordinal past the end of a row type.
    #[error("ordinal {index} out of range for '{row_type}' with {count} fields")]
    InputOutOfRange {
        index: usize,
        count: usize,
        row_type: String,
    },

    #[error("invalid rex config: {0}")]
    InvalidConfig(String),

    #[error("failed to read rex config: {0}")]
    ConfigRead(#[from] std::io::Error),

    #[error("failed to parse rex config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl RexError {
    /// Create an InvalidArgument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
