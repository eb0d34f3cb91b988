//! Configuration for the sitstand sensor agent.

use crate::core::session::SessionConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Window size, buffer cap, location tag and classifier thresholds
    pub session: SessionConfig,

    /// Directory recording documents are written to
    pub export_path: PathBuf,

    /// Directory for the activity history and other agent state
    pub data_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sitstand-sensor-agent");

        Self {
            session: SessionConfig::default(),
            export_path: data_dir.join("recordings"),
            data_path: data_dir,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sitstand-sensor-agent")
            .join("config.json")
    }

    /// Path of the persisted activity history.
    pub fn history_path(&self) -> PathBuf {
        self.data_path.join("history.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.export_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        std::fs::create_dir_all(&self.data_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::SecondaryAxis;
    use crate::core::session::DEFAULT_EXPORT_CAPACITY;
    use crate::core::window::DEFAULT_WINDOW_SIZE;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.session.window_size, DEFAULT_WINDOW_SIZE);
        assert_eq!(config.session.export_capacity, DEFAULT_EXPORT_CAPACITY);
        assert_eq!(config.session.classifier.motion_threshold, 0.1);
        assert_eq!(config.session.classifier.vertical_threshold, 8.5);
        assert_eq!(config.session.classifier.secondary_axis, SecondaryAxis::Z);
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.session.location = "Labor".to_string();
        config.session.classifier.vertical_threshold = 6.0;

        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.session.location, "Labor");
        assert_eq!(parsed.session.classifier.vertical_threshold, 6.0);
    }
}
