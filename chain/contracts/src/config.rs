//! Registry configuration
//!
//! Loaded from JSON; every field has a default so partial files work.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Configuration shared by the escrow and swap registries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustodyConfig {
    /// Smallest escrow deposit accepted. Zero-value escrows are always rejected.
    pub min_deposit: u64,
    /// Largest escrow memo accepted, in bytes.
    pub max_memo_bytes: usize,
    /// Mirror every emitted event into the `tracing` log.
    pub emit_tracing: bool,
}

impl Default for CustodyConfig {
    fn default() -> Self {
        Self {
            min_deposit: 1,
            max_memo_bytes: 1024,
            emit_tracing: true,
        }
    }
}

impl CustodyConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_deposit == 0 {
            return Err(ConfigError::Invalid {
                reason: "min_deposit must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CustodyConfig::default();
        assert_eq!(config.min_deposit, 1);
        assert_eq!(config.max_memo_bytes, 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = CustodyConfig::from_json_str(r#"{ "min_deposit": 100 }"#).unwrap();
        assert_eq!(config.min_deposit, 100);
        assert_eq!(config.max_memo_bytes, 1024);
        assert!(config.emit_tracing);
    }

    #[test]
    fn test_zero_min_deposit_rejected() {
        let result = CustodyConfig::from_json_str(r#"{ "min_deposit": 0 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_malformed_json() {
        let result = CustodyConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "max_memo_bytes": 16, "emit_tracing": false }}"#).unwrap();

        let config = CustodyConfig::from_path(file.path()).unwrap();
        assert_eq!(config.max_memo_bytes, 16);
        assert!(!config.emit_tracing);
    }

    #[test]
    fn test_missing_file() {
        let result = CustodyConfig::from_path("/nonexistent/custody.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
