//! Session configuration

use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Ignore frames whose checksum failed instead of surfacing their values
    pub drop_failed_checksums: bool,
    /// Keep a bounded log of recent session events for late observers
    pub event_history: bool,
    pub weight_decimals: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            drop_failed_checksums: false,
            event_history: true,
            weight_decimals: 2,
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = Self::from_json(&std::fs::read_to_string(path)?)?;
        info!("Loaded session config from {}: {:?}", path.display(), config);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = SessionConfig::default();
        assert!(!config.drop_failed_checksums);
        assert!(config.event_history);
        assert_eq!(config.weight_decimals, 2);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SessionConfig::from_json(r#"{"drop_failed_checksums": true}"#).unwrap();
        assert!(config.drop_failed_checksums);
        assert_eq!(config.weight_decimals, 2);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            SessionConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SessionConfig::load("/nonexistent/crema.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
