//! Runtime configuration.
//!
//! Everything is read from the process environment once at startup (after
//! `.env` is loaded by the binary). There is no hot reload. Empty variables
//! are treated as unset.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SolarisError};
use crate::providers::Provider;

const DEFAULT_CORS_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:3001",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:3001",
];

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub providers: ProvidersConfig,
    pub cache: CacheConfig,
    pub analysis: AnalysisConfig,
}

/// HTTP listener and CORS settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (default: 0.0.0.0).
    pub host: String,
    pub port: u16,
    /// Origins allowed by the CORS layer.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Credentials and endpoint for one provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API key. `None` leaves the adapter unconfigured.
    pub api_key: Option<String>,
    /// Override for the API base URL (proxies, tests).
    pub api_base: Option<String>,
}

/// Provider adapters and outbound call limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openai: ProviderConfig,
    pub gemini: ProviderConfig,
    /// Per-request timeout for provider HTTP calls.
    pub timeout_secs: u64,
    /// Maximum number of provider calls in flight at once.
    pub max_concurrent_calls: usize,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openai: ProviderConfig::default(),
            gemini: ProviderConfig::default(),
            timeout_secs: 120,
            max_concurrent_calls: 16,
        }
    }
}

impl ProvidersConfig {
    pub fn get(&self, provider: Provider) -> &ProviderConfig {
        match provider {
            Provider::OpenAi => &self.openai,
            Provider::Gemini => &self.gemini,
        }
    }
}

/// Response cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// `redis://…` for Redis, `memory://` for the in-process cache.
    /// `None` disables caching.
    pub url: Option<String>,
    pub ttl_secs: u64,
    /// Capacity of the in-process cache.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: None,
            ttl_secs: 3600,
            max_entries: 500,
        }
    }
}

/// Background analysis queue settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub queue_capacity: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { queue_capacity: 64 }
    }
}

impl Config {
    /// Build configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Config::default();

        if let Some(host) = get("SOLARIS_HOST") {
            config.server.host = host;
        }
        if let Some(port) = get("SOLARIS_PORT") {
            config.server.port = parse_var("SOLARIS_PORT", &port)?;
        }
        if let Some(origins) = get("BACKEND_CORS_ORIGINS") {
            config.server.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }

        config.providers.openai = ProviderConfig {
            api_key: get("OPENAI_API_KEY"),
            api_base: get("OPENAI_API_BASE"),
        };
        config.providers.gemini = ProviderConfig {
            api_key: get("GEMINI_API_KEY"),
            api_base: get("GEMINI_API_BASE"),
        };
        if let Some(v) = get("PROVIDER_TIMEOUT_SECS") {
            config.providers.timeout_secs = parse_var("PROVIDER_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("MAX_CONCURRENT_PROVIDER_CALLS") {
            config.providers.max_concurrent_calls = parse_var("MAX_CONCURRENT_PROVIDER_CALLS", &v)?;
        }

        config.cache.url = get("REDIS_URL");
        if let Some(v) = get("CACHE_TTL_SECS") {
            config.cache.ttl_secs = parse_var("CACHE_TTL_SECS", &v)?;
        }
        if let Some(v) = get("CACHE_MAX_ENTRIES") {
            config.cache.max_entries = parse_var("CACHE_MAX_ENTRIES", &v)?;
        }

        if let Some(v) = get("ANALYSIS_QUEUE_CAPACITY") {
            config.analysis.queue_capacity = parse_var("ANALYSIS_QUEUE_CAPACITY", &v)?;
        }

        config.validate()?;
        debug!(
            openai = config.providers.openai.api_key.is_some(),
            gemini = config.providers.gemini.api_key.is_some(),
            cache = config.cache.url.is_some(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Reject values that would make the service unusable.
    pub fn validate(&self) -> Result<()> {
        if self.providers.max_concurrent_calls == 0 {
            return Err(SolarisError::Config(
                "MAX_CONCURRENT_PROVIDER_CALLS must be at least 1".into(),
            ));
        }
        if self.providers.timeout_secs == 0 {
            return Err(SolarisError::Config(
                "PROVIDER_TIMEOUT_SECS must be at least 1".into(),
            ));
        }
        if self.analysis.queue_capacity == 0 {
            return Err(SolarisError::Config(
                "ANALYSIS_QUEUE_CAPACITY must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// `host:port` string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| SolarisError::Config(format!("{key}='{value}' is invalid: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8000");
        assert_eq!(cfg.server.cors_origins.len(), 4);
        assert!(cfg.providers.openai.api_key.is_none());
        assert!(cfg.providers.gemini.api_key.is_none());
        assert!(cfg.cache.url.is_none());
        assert_eq!(cfg.cache.ttl_secs, 3600);
        assert_eq!(cfg.cache.max_entries, 500);
        assert_eq!(cfg.providers.timeout_secs, 120);
        assert_eq!(cfg.analysis.queue_capacity, 64);
    }

    #[test]
    fn test_reads_credentials_and_cache() {
        let cfg = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-1"),
            ("GEMINI_API_KEY", "g-1"),
            ("REDIS_URL", "redis://cache:6379"),
            ("CACHE_TTL_SECS", "60"),
        ]))
        .unwrap();
        assert_eq!(cfg.providers.get(Provider::OpenAi).api_key.as_deref(), Some("sk-1"));
        assert_eq!(cfg.providers.get(Provider::Gemini).api_key.as_deref(), Some("g-1"));
        assert_eq!(cfg.cache.url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(cfg.cache.ttl_secs, 60);
    }

    #[test]
    fn test_empty_values_are_unset() {
        let cfg = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "  "), ("REDIS_URL", "")])).unwrap();
        assert!(cfg.providers.openai.api_key.is_none());
        assert!(cfg.cache.url.is_none());
    }

    #[test]
    fn test_cors_origins_split() {
        let cfg = Config::from_lookup(lookup(&[(
            "BACKEND_CORS_ORIGINS",
            "https://app.example.com, https://admin.example.com,",
        )]))
        .unwrap();
        assert_eq!(
            cfg.server.cors_origins,
            vec!["https://app.example.com", "https://admin.example.com"]
        );
    }

    #[test]
    fn test_invalid_number_rejected() {
        let err = Config::from_lookup(lookup(&[("SOLARIS_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, SolarisError::Config(msg) if msg.contains("SOLARIS_PORT")));
    }

    #[test]
    fn test_zero_limits_rejected() {
        assert!(Config::from_lookup(lookup(&[("MAX_CONCURRENT_PROVIDER_CALLS", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("ANALYSIS_QUEUE_CAPACITY", "0")])).is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"server": {"port": 9000}}"#).unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.cache.ttl_secs, 3600);
    }
}
