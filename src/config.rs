//! Engine configuration
//!
//! ```toml
//! combining = "first-match-wins"   # or "deny-overrides"
//! cache_capacity = 1000
//! ```

use crate::error::{PolicyError, Result};
use serde::{Deserialize, Serialize};

/// Default number of cached decisions (see [`DecisionCache`](crate::iam::DecisionCache))
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// How applicable statements across policies combine into one answer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CombiningAlgorithm {
    /// The first applicable statement, in policy-then-statement order, decides
    #[default]
    FirstMatchWins,
    /// Any applicable Deny wins; otherwise any applicable Allow
    DenyOverrides,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub combining: CombiningAlgorithm,
    pub cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            combining: CombiningAlgorithm::FirstMatchWins,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML configuration document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_combining(mut self, combining: CombiningAlgorithm) -> Self {
        self.combining = combining;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            return Err(PolicyError::InvalidConfig(
                "cache_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.combining, CombiningAlgorithm::FirstMatchWins);
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_parse_full_document() {
        let config = EngineConfig::from_toml_str(
            r#"
            combining = "deny-overrides"
            cache_capacity = 64
            "#,
        )
        .unwrap();

        assert_eq!(config.combining, CombiningAlgorithm::DenyOverrides);
        assert_eq!(config.cache_capacity, 64);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = EngineConfig::from_toml_str("cache_capacity = 0");
        assert!(matches!(result, Err(PolicyError::InvalidConfig(_))));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = EngineConfig::from_toml_str("strategy = \"first\"");
        assert!(matches!(result, Err(PolicyError::Config(_))));
    }
}
