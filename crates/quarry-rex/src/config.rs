//! Row-expression builder configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RexError};

/// Settings for [`RexBuilder`](crate::builder::RexBuilder).
///
/// Loaded from JSON; missing keys take their default.
///
/// ```
/// # use quarry_rex::RexConfig;
/// let config = RexConfig::from_json_str(r#"{ "case_sensitive": false }"#).unwrap();
/// assert!(!config.case_sensitive);
/// assert!(config.share_common_subexpressions);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RexConfig {
    /// Whether field names are matched case-sensitively in field accesses.
    pub case_sensitive: bool,
    /// Whether structurally equal nodes are interned to one shared node.
    pub share_common_subexpressions: bool,
    /// Upper bound on the number of interned nodes.
    pub max_cache_entries: usize,
}

impl RexConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.max_cache_entries == 0 {
            return Err(RexError::InvalidConfig(
                "max_cache_entries must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

impl Default for RexConfig {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            share_common_subexpressions: true,
            max_cache_entries: 65_536,
        }
    }
}
