//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Secrets (`llm.api_key`, `github.token`) can be read from config files or
//! the environment but are never written back out.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ai::{PricingTable, ProviderConfig};
use crate::cache::StoreConfig;
use crate::constants::{cache, explain, models, network};
use crate::types::{GlanceError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Repository source settings
    pub github: GitHubConfig,

    /// Server-side explanation stores
    pub cache: CacheConfig,

    /// Bulk explain behavior
    pub explain: ExplainConfig,

    /// Per-tier prices used for estimates and the usage ledger
    pub pricing: PricingTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            github: GitHubConfig::default(),
            cache: CacheConfig::default(),
            explain: ExplainConfig::default(),
            pricing: PricingTable::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `GlanceError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.llm.timeout_secs == 0 {
            return Err(GlanceError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.cache.capacity == 0 {
            return Err(GlanceError::Config(
                "cache.capacity must be greater than 0".to_string(),
            ));
        }

        if self.cache.ttl_secs == 0 {
            return Err(GlanceError::Config(
                "cache.ttl_secs must be greater than 0".to_string(),
            ));
        }

        if self.explain.chunk_size == 0 {
            return Err(GlanceError::Config(
                "explain.chunk_size must be greater than 0".to_string(),
            ));
        }

        self.pricing.validate().map_err(GlanceError::Config)?;

        Ok(())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name
    pub provider: String,

    /// Model for short multi-item explanations
    pub bulk_model: String,

    /// Model for file detail and deep dives
    pub detail_model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Override the provider's API base URL
    pub api_base: Option<String>,

    /// Falls back to `ANTHROPIC_API_KEY` when unset
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            bulk_model: models::BULK_MODEL.to_string(),
            detail_model: models::DETAIL_MODEL.to_string(),
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            api_base: None,
            api_key: None,
        }
    }
}

impl LlmConfig {
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider: self.provider.clone(),
            timeout_secs: self.timeout_secs,
            api_key: self.api_key.clone(),
            api_base: self.api_base.clone(),
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("bulk_model", &self.bulk_model)
            .field("detail_model", &self.detail_model)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// =============================================================================
// GitHub Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_base: String,

    /// Falls back to `GITHUB_TOKEN` when unset
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: network::GITHUB_API_BASE.to_string(),
            token: None,
        }
    }
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_base", &self.api_base)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// =============================================================================
// Cache Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum entries per store
    pub capacity: usize,

    /// Entry lifetime in seconds
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: cache::MAX_ENTRIES,
            ttl_secs: cache::TTL_SECS,
        }
    }
}

impl CacheConfig {
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            capacity: self.capacity,
            ttl: Duration::from_secs(self.ttl_secs),
        }
    }
}

// =============================================================================
// Explain Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainConfig {
    /// Items per bulk provider call
    pub chunk_size: usize,

    /// Child names listed in a folder's context
    pub child_listing_cap: usize,

    /// List dependency and build folders by default
    pub show_hidden: bool,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            chunk_size: explain::CHUNK_SIZE,
            child_listing_cap: explain::CHILD_LISTING_CAP,
            show_hidden: false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.cache.capacity, 5000);
        assert_eq!(config.cache.ttl_secs, 1800);
        assert_eq!(config.explain.chunk_size, 2);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = Config::default();
        config.cache.capacity = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.cache.ttl_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.explain.chunk_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let mut config = Config::default();
        config.pricing.bulk.input_per_mtok = -1.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pricing"));
    }

    #[test]
    fn test_secrets_not_serialized_or_debugged() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-ant-secret".to_string());
        config.github.token = Some("ghp_secretsecretsecret".to_string());

        let toml = toml::to_string(&config).unwrap();
        assert!(!toml.contains("sk-ant-secret"));
        assert!(!toml.contains("ghp_secret"));

        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-ant-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_store_config_conversion() {
        let store = CacheConfig {
            capacity: 10,
            ttl_secs: 60,
        }
        .store_config();
        assert_eq!(store.capacity, 10);
        assert_eq!(store.ttl, Duration::from_secs(60));
    }
}
