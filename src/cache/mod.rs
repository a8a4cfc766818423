//! Best-effort response cache.
//!
//! ```text
//! ResponseCache (enum)
//!   ├── Redis(RedisCache)    <- shared across instances
//!   ├── Memory(MemoryCache)  <- single process, TTL + LRU
//!   └── NoOp                 <- always miss, always succeed
//! ```
//!
//! Backend errors are logged and swallowed: a failing store looks exactly
//! like an empty one. An unreachable Redis at startup degrades to `NoOp`.

pub mod key;
pub mod memory;
pub mod redis_cache;

use std::time::Duration;

use tracing::{info, warn};

use crate::config::CacheConfig;

pub use self::key::derive_key;
pub use self::memory::{CacheStats, MemoryCache};
pub use self::redis_cache::RedisCache;

/// URL scheme selecting the in-process backend.
pub const MEMORY_URL: &str = "memory://";

/// Cache backend selected at startup.
#[derive(Debug)]
pub enum ResponseCache {
    Redis(RedisCache),
    Memory(MemoryCache),
    NoOp,
}

impl ResponseCache {
    /// Select a backend from configuration. Never fails.
    pub async fn connect(config: &CacheConfig) -> Self {
        let Some(url) = config.url.as_deref() else {
            info!("No cache URL configured, response caching disabled");
            return Self::NoOp;
        };
        if url.starts_with(MEMORY_URL) {
            info!(max_entries = config.max_entries, "Using in-memory response cache");
            return Self::memory(config.max_entries);
        }
        match RedisCache::connect(url).await {
            Ok(cache) => {
                info!("Redis connection established");
                Self::Redis(cache)
            }
            Err(e) => {
                warn!(error = %e, "Redis connection failed, response caching disabled");
                Self::NoOp
            }
        }
    }

    pub fn memory(max_entries: usize) -> Self {
        Self::Memory(MemoryCache::new(max_entries))
    }

    /// Backend name for logs and health output.
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Redis(_) => "redis",
            Self::Memory(_) => "memory",
            Self::NoOp => "none",
        }
    }

    /// Look up a serialized response.
    pub async fn get(&self, key: &str) -> Option<String> {
        match self {
            Self::Redis(cache) => match cache.get(key).await {
                Ok(value) => value,
                Err(e) => {
                    warn!(error = %e, "Cache retrieval error");
                    None
                }
            },
            Self::Memory(cache) => cache.get(key),
            Self::NoOp => None,
        }
    }

    /// Store a serialized response with an expiry.
    pub async fn set(&self, key: &str, value: &str, ttl: Duration) {
        match self {
            Self::Redis(cache) => {
                if let Err(e) = cache.set(key, value, ttl).await {
                    warn!(error = %e, "Cache storage error");
                }
            }
            Self::Memory(cache) => cache.set(key.to_string(), value.to_string(), ttl),
            Self::NoOp => {}
        }
    }

    /// Entry statistics, available for the in-memory backend only.
    pub fn stats(&self) -> Option<CacheStats> {
        match self {
            Self::Memory(cache) => Some(cache.stats()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_url_is_noop() {
        let cache = ResponseCache::connect(&CacheConfig::default()).await;
        assert_eq!(cache.backend(), "none");
        cache.set("k", "v", Duration::from_secs(60)).await;
        assert!(cache.get("k").await.is_none());
        assert!(cache.stats().is_none());
    }

    #[tokio::test]
    async fn test_memory_url_selects_memory_backend() {
        let config = CacheConfig {
            url: Some("memory://".into()),
            ..Default::default()
        };
        let cache = ResponseCache::connect(&config).await;
        assert_eq!(cache.backend(), "memory");
    }

    #[tokio::test]
    async fn test_unreachable_redis_degrades_to_noop() {
        let config = CacheConfig {
            url: Some("redis://127.0.0.1:1/".into()),
            ..Default::default()
        };
        let cache = ResponseCache::connect(&config).await;
        assert_eq!(cache.backend(), "none");
    }

    #[tokio::test]
    async fn test_round_trip_then_forced_expiry() {
        let cache = ResponseCache::memory(10);
        cache.set("k", "value", Duration::from_secs(3600)).await;
        assert_eq!(cache.get("k").await.as_deref(), Some("value"));

        cache.set("k", "value", Duration::ZERO).await;
        assert!(cache.get("k").await.is_none());
    }
}
