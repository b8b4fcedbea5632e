//! Configuration Management
//!
//! Persistent configuration for gcecloud, stored as JSON in the user's
//! config directory. Command line flags override these values.

use crate::cloud::{ApiVersion, DEFAULT_CALL_TIMEOUT};
use crate::gcp::{DEFAULT_ENDPOINT, DEFAULT_POLL_INTERVAL};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Project to operate on
    #[serde(default)]
    pub project_id: Option<String>,
    /// Compute API endpoint, e.g. for an emulator
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Upper bound for a single accessor call, in seconds
    #[serde(default)]
    pub call_timeout_secs: Option<u64>,
    /// Delay between operation status polls, in milliseconds
    #[serde(default)]
    pub operation_poll_interval_ms: Option<u64>,
    /// API version used when none is given
    #[serde(default)]
    pub default_version: Option<ApiVersion>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gcecloud").join("config.json"))
    }

    /// Load configuration from disk, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config file {:?}: {:#}", path, e);
                Self::default()
            }
        }
    }

    /// Load configuration from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
    }

    /// Write configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get effective project (CLI > config > gcloud default)
    pub fn effective_project(&self) -> String {
        self.project_id
            .clone()
            .or_else(crate::gcp::auth::get_default_project)
            .unwrap_or_default()
    }

    pub fn effective_endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    pub fn effective_version(&self) -> ApiVersion {
        self.default_version.unwrap_or_default()
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_CALL_TIMEOUT)
    }

    pub fn operation_poll_interval(&self) -> Duration {
        self.operation_poll_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.call_timeout(), DEFAULT_CALL_TIMEOUT);
        assert_eq!(config.operation_poll_interval(), DEFAULT_POLL_INTERVAL);
        assert_eq!(config.effective_endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(config.effective_version(), ApiVersion::Stable);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("gcecloud-config-{}", std::process::id()))
            .join("config.json");
        let config = Config {
            project_id: Some("my-project-1".to_string()),
            endpoint: Some("http://localhost:8080".to_string()),
            call_timeout_secs: Some(30),
            operation_poll_interval_ms: Some(250),
            default_version: Some(ApiVersion::Beta),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.call_timeout(), Duration::from_secs(30));
        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("gcecloud-does-not-exist").join("config.json");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_huge_call_timeout_acquires_scope() {
        use crate::cloud::{CallScopeProvider, FixedTimeout};

        let config: Config = serde_json::from_str(r#"{"call_timeout_secs": 18446744073709551615}"#).unwrap();
        assert_eq!(config.call_timeout(), Duration::from_secs(u64::MAX));
        let scope = FixedTimeout::new(config.call_timeout()).acquire();
        assert!(!scope.is_expired());
    }

    #[test]
    fn test_invalid_version_rejected() {
        let err = serde_json::from_str::<Config>(r#"{"default_version": "gamma"}"#);
        assert!(err.is_err());
    }
}
