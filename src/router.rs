//! Request routing with a best-effort response cache in front of providers.
//!
//! ```text
//! ChatRequest ──> derive_key ──> cache hit? ──yes──> ChatResponse
//!                                     │
//!                                     no
//!                                     ▼
//!                  permit ──> adapter.call ──> cache.set ──> ChatResponse
//! ```
//!
//! Failed provider calls are never cached.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::cache::{derive_key, ResponseCache};
use crate::error::{Result, SolarisError};
use crate::providers::{ChatRequest, ChatResponse, ProviderRegistry};

/// Routes chat requests to provider adapters.
#[derive(Debug, Clone)]
pub struct RequestRouter {
    registry: ProviderRegistry,
    cache: Arc<ResponseCache>,
    ttl: Duration,
    call_permits: Arc<Semaphore>,
}

impl RequestRouter {
    /// `max_concurrent_calls` is clamped to a minimum of 1.
    pub fn new(
        registry: ProviderRegistry,
        cache: Arc<ResponseCache>,
        ttl: Duration,
        max_concurrent_calls: usize,
    ) -> Self {
        Self {
            registry,
            cache,
            ttl,
            call_permits: Arc::new(Semaphore::new(max_concurrent_calls.max(1))),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Serve a request from cache, or from the selected provider on a miss.
    pub async fn process(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let key = derive_key(request);

        if let Some(cached) = self.cache.get(&key).await {
            match serde_json::from_str::<ChatResponse>(&cached) {
                Ok(response) => {
                    info!(provider = %request.provider, "Returning cached response");
                    return Ok(response);
                }
                Err(e) => warn!(error = %e, "Discarding unreadable cache entry"),
            }
        }

        let adapter = self.registry.get(request.provider)?;
        let response = {
            let _permit = self
                .call_permits
                .acquire()
                .await
                .map_err(|e| SolarisError::provider_call(request.provider, e.to_string()))?;
            debug!(provider = %request.provider, messages = request.messages.len(), "Calling provider");
            adapter.call(request).await?
        };

        match serde_json::to_string(&response) {
            Ok(serialized) => self.cache.set(&key, &serialized, self.ttl).await,
            Err(e) => warn!(error = %e, "Failed to serialize response for cache"),
        }
        Ok(response)
    }
}
