//! Router configuration

use area_core::codec::DEFAULT_DENY_LIST;
use area_core::route::HistoryStrategy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Router configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouterConfig {
    /// Strategy for actions that do not choose one
    pub default_history_strategy: HistoryStrategy,
    /// Keys stripped from logged and persisted state
    pub deny_list: Vec<String>,
    /// Sanitize state before writing it to history
    pub sanitize_history: bool,
    /// Capacity of render caches built from this config
    pub render_cache_capacity: usize,
    /// Buffer size of the router event channel
    pub event_capacity: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            default_history_strategy: HistoryStrategy::Push,
            deny_list: DEFAULT_DENY_LIST.iter().map(|s| s.to_string()).collect(),
            sanitize_history: true,
            render_cache_capacity: 64,
            event_capacity: 64,
        }
    }
}

impl RouterConfig {
    /// Create a default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default history strategy
    pub fn default_history_strategy(mut self, strategy: HistoryStrategy) -> Self {
        self.default_history_strategy = strategy;
        self
    }

    /// Replace the deny-list
    pub fn deny_list<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deny_list = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Add a key to the deny-list
    pub fn deny(mut self, key: impl Into<String>) -> Self {
        self.deny_list.push(key.into());
        self
    }

    /// Toggle sanitizing of persisted state
    pub fn sanitize_history(mut self, enabled: bool) -> Self {
        self.sanitize_history = enabled;
        self
    }

    /// Set render cache capacity
    pub fn render_cache_capacity(mut self, capacity: usize) -> Self {
        self.render_cache_capacity = capacity;
        self
    }

    /// Set event channel capacity
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.event_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "eventCapacity",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.render_cache_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "renderCacheCapacity",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Parse a JSON configuration; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path.as_ref()).await?;
        let config = Self::from_json(&contents)?;
        tracing::info!(path = %path.as_ref().display(), "Loaded router configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = RouterConfig::default();
        assert_eq!(config.default_history_strategy, HistoryStrategy::Push);
        assert_eq!(config.deny_list, vec!["password", "token", "secret", "apiKey"]);
        assert!(config.sanitize_history);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = RouterConfig::new()
            .default_history_strategy(HistoryStrategy::Replace)
            .deny_list(["pin"])
            .deny("otp")
            .sanitize_history(false)
            .render_cache_capacity(8);

        assert_eq!(config.default_history_strategy, HistoryStrategy::Replace);
        assert_eq!(config.deny_list, vec!["pin", "otp"]);
        assert!(!config.sanitize_history);
        assert_eq!(config.render_cache_capacity, 8);
    }

    #[test]
    fn test_from_json_partial() {
        let config = RouterConfig::from_json(r#"{"defaultHistoryStrategy": "silent"}"#).unwrap();
        assert_eq!(config.default_history_strategy, HistoryStrategy::Silent);
        assert_eq!(config.event_capacity, 64);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        assert!(matches!(RouterConfig::from_json("not json"), Err(ConfigError::Parse(_))));
        assert!(matches!(
            RouterConfig::from_json(r#"{"eventCapacity": 0}"#),
            Err(ConfigError::Invalid { field: "eventCapacity", .. })
        ));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("router.json");
        tokio::fs::write(&path, r#"{"denyList": ["password"], "renderCacheCapacity": 16}"#)
            .await
            .unwrap();

        let config = RouterConfig::load(&path).await.unwrap();
        assert_eq!(config.deny_list, vec!["password"]);
        assert_eq!(config.render_cache_capacity, 16);

        let missing = RouterConfig::load(temp_dir.path().join("missing.json")).await;
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
