//! Configuration management

use crate::error::{AdminError, AdminResult, ErrorContext};
use crate::logging::LoggingConfig;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for the admin client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Remote API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL for all REST calls, a single configured origin
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

/// Durable storage settings for the credential store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding persisted client state ("~" expands to the home dir)
    pub data_dir: String,
    /// Whether credentials survive process restarts (file-backed store)
    pub persist_credentials: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:3000".to_string(),
                timeout_seconds: 30,
                user_agent: "matchdesk/0.1".to_string(),
            },
            storage: StorageConfig {
                data_dir: "~/.matchdesk".to_string(),
                persist_credentials: true,
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl AdminConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AdminResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AdminError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: AdminConfig = toml::from_str(&content).map_err(|e| AdminError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> AdminResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| AdminError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        std::fs::write(path, content).map_err(|e| AdminError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> AdminResult<()> {
        if self.api.base_url.is_empty() {
            return Err(AdminError::Config {
                message: "API base_url must not be empty".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set api.base_url to the backend origin"),
            });
        }

        if self.api.timeout_seconds == 0 {
            return Err(AdminError::Config {
                message: "API timeout_seconds must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set api.timeout_seconds to a positive value"),
            });
        }

        if self.storage.data_dir.is_empty() {
            return Err(AdminError::Config {
                message: "storage.data_dir must not be empty".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set storage.data_dir to a writable directory"),
            });
        }

        Ok(())
    }

    /// Resolve the data directory, expanding a leading "~"
    pub fn resolved_data_dir(&self) -> PathBuf {
        if let Some(rest) = self.storage.data_dir.strip_prefix("~") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest.trim_start_matches('/'));
            }
        }
        PathBuf::from(&self.storage.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AdminConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.timeout_seconds, 30);
    }

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matchdesk.toml");

        let mut config = AdminConfig::default();
        config.api.base_url = "https://admin-api.example.com".to_string();
        config.save_to_file(&path).unwrap();

        let loaded = AdminConfig::from_file(&path).unwrap();
        assert_eq!(loaded.api.base_url, "https://admin-api.example.com");
        assert!(loaded.storage.persist_credentials);
    }

    #[test]
    fn test_validate_rejects_empty_base_url() {
        let mut config = AdminConfig::default();
        config.api.base_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = AdminConfig::from_file("/nonexistent/matchdesk.toml").unwrap_err();
        assert!(matches!(err, AdminError::Config { .. }));
    }
}
