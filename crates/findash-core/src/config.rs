//! Explicitly constructed configuration passed into the pipeline's
//! constructors. Nothing here is read from ambient globals after startup,
//! so every component can be built against fakes in tests.

use std::env;
use std::time::Duration;

use crate::error::ConfigError;
use crate::retry::RetryConfig;

pub const FMP_API_KEY_ENV: &str = "FINDASH_FMP_API_KEY";
pub const DEFAULT_FMP_BASE_URL: &str = "https://financialmodelingprep.com/api/v3";

/// Financial Modeling Prep client settings. The API key authenticates every
/// request as a query parameter; it is never logged or embedded in errors.
#[derive(Debug, Clone, PartialEq)]
pub struct FmpConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_ms: u64,
    pub retry: RetryConfig,
}

impl FmpConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: String::from(DEFAULT_FMP_BASE_URL),
            timeout_ms: 5_000,
            retry: RetryConfig::default(),
        }
    }

    /// Read the API key from `FINDASH_FMP_API_KEY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var(FMP_API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey {
                var: FMP_API_KEY_ENV,
            })?;
        Ok(Self::new(api_key))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

/// Provider quota description driving the rate gate.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderPolicy {
    pub quota_window: Duration,
    pub quota_limit: u32,
    /// How long the orchestration holds off after the provider reports a
    /// rate limit.
    pub cooldown: Duration,
}

impl ProviderPolicy {
    /// FMP free tier: generous burst room per minute, one-minute cooldown
    /// once the provider pushes back.
    pub fn fmp_default() -> Self {
        Self {
            quota_window: Duration::from_secs(60),
            quota_limit: 10,
            cooldown: Duration::from_secs(60),
        }
    }
}

/// Orchestration settings for a refresh batch.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestConfig {
    pub policy: ProviderPolicy,
    /// Rate-limit cooldowns tolerated per batch before the remaining work is
    /// failed cleanly instead of waiting again.
    pub max_cooldowns_per_batch: u32,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            policy: ProviderPolicy::fmp_default(),
            max_cooldowns_per_batch: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_requires_a_non_empty_key() {
        env::remove_var(FMP_API_KEY_ENV);
        assert_eq!(
            FmpConfig::from_env(),
            Err(ConfigError::MissingApiKey {
                var: FMP_API_KEY_ENV
            })
        );
    }

    #[test]
    fn fmp_default_policy_cools_down_for_a_minute() {
        let policy = ProviderPolicy::fmp_default();
        assert_eq!(policy.cooldown, Duration::from_secs(60));
        assert_eq!(policy.quota_window, Duration::from_secs(60));
    }
}
