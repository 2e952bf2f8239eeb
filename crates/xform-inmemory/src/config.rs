//! Store configuration

use serde::{Deserialize, Serialize};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Document is not valid TOML or has the wrong shape
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Shard count rejected by the map
    #[error("shard amount must be a power of two greater than one, got {0}")]
    InvalidShardAmount(usize),
}

/// Sizing of the transformation map
///
/// ```toml
/// initial_capacity = 1024
/// shard_amount = 64
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InMemoryConfig {
    /// Transformations to reserve room for
    pub initial_capacity: usize,
    /// Map shards; derived from the CPU count when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard_amount: Option<usize>,
}

impl InMemoryConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With initial capacity
    #[inline]
    #[must_use]
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// With shard amount
    #[inline]
    #[must_use]
    pub fn with_shard_amount(mut self, shards: usize) -> Self {
        self.shard_amount = Some(shards);
        self
    }

    /// Parse from a TOML document
    ///
    /// # Errors
    /// [`ConfigError::Parse`] or [`ConfigError::InvalidShardAmount`]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the map would reject
    ///
    /// # Errors
    /// [`ConfigError::InvalidShardAmount`]
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.shard_amount {
            Some(shards) if shards < 2 || !shards.is_power_of_two() => {
                Err(ConfigError::InvalidShardAmount(shards))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_toml() {
        let config = InMemoryConfig::from_toml_str("initial_capacity = 16\nshard_amount = 8").unwrap();
        assert_eq!(
            config,
            InMemoryConfig::new().with_initial_capacity(16).with_shard_amount(8)
        );
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(InMemoryConfig::from_toml_str("").unwrap(), InMemoryConfig::default());
    }

    #[test]
    fn rejects_bad_shards() {
        for shards in [0, 1, 3, 12] {
            let err = InMemoryConfig::new().with_shard_amount(shards).validate().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidShardAmount(n) if n == shards));
        }
        assert!(InMemoryConfig::from_toml_str("shard_amount = 6").is_err());
    }

    #[test]
    fn rejects_wrong_types() {
        let err = InMemoryConfig::from_toml_str("initial_capacity = \"lots\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
