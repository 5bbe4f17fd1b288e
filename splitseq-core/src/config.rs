//! Configuration for batch-splittable sequences

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sequence::DEFAULT_BATCH_SIZE;

/// Configuration for splitting a sequence into batches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Number of elements split off per batch.
    ///
    /// Pick it so that processing one batch takes about 1 to 10 ms: too
    /// small and dispatch overhead dominates, too large and load balancing
    /// suffers.
    pub batch_size: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl SplitConfig {
    /// Create a configuration with the given batch size
    pub fn with_batch_size(batch_size: usize) -> Self {
        Self { batch_size }
    }

    /// Parse and validate a configuration from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can be used
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidArgument(
                "Batch size must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_batch_size() {
        assert_eq!(SplitConfig::default().batch_size, 64);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = SplitConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SplitConfig::default());

        let config = SplitConfig::from_json_str(r#"{"batch_size": 100}"#).unwrap();
        assert_eq!(config.batch_size, 100);
    }

    #[test]
    fn test_from_json_rejects_zero() {
        let result = SplitConfig::from_json_str(r#"{"batch_size": 0}"#);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let result = SplitConfig::from_json_str("batch_size = 3");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
