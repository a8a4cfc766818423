//! Provider lookup table.
//!
//! Built once at startup from [`ProvidersConfig`] and shared read-only. Every
//! [`Provider`] variant gets an adapter, configured or not, so `/providers`
//! can report which ones have credentials.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::ProvidersConfig;
use crate::error::{Result, SolarisError};

use super::{ChatProvider, GeminiProvider, OpenAiProvider, Provider};

/// Maps each provider to its adapter.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    adapters: HashMap<Provider, Arc<dyn ChatProvider>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers())
            .field("configured", &self.configured())
            .finish()
    }
}

impl ProviderRegistry {
    /// Empty registry. Every lookup fails with `UnsupportedProvider`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one adapter per provider from configuration.
    pub fn from_config(config: &ProvidersConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let mut registry = Self::new();
        for provider in Provider::ALL {
            let cfg = config.get(provider);
            let key = cfg.api_key.as_deref();
            let base = cfg.api_base.as_deref();
            let adapter: Arc<dyn ChatProvider> = match provider {
                Provider::OpenAi => Arc::new(OpenAiProvider::new(key, base, timeout)?),
                Provider::Gemini => Arc::new(GeminiProvider::new(key, base, timeout)?),
            };
            info!(
                provider = %provider,
                configured = adapter.is_configured(),
                "Registered provider adapter"
            );
            registry.register(adapter);
        }
        Ok(registry)
    }

    /// Insert or replace the adapter for `adapter.provider()`.
    pub fn register(&mut self, adapter: Arc<dyn ChatProvider>) {
        self.adapters.insert(adapter.provider(), adapter);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, adapter: Arc<dyn ChatProvider>) -> Self {
        self.register(adapter);
        self
    }

    /// Adapter for `provider`.
    pub fn get(&self, provider: Provider) -> Result<Arc<dyn ChatProvider>> {
        self.adapters
            .get(&provider)
            .cloned()
            .ok_or_else(|| SolarisError::UnsupportedProvider(provider.to_string()))
    }

    /// Registered providers, in [`Provider::ALL`] order.
    pub fn providers(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|p| self.adapters.contains_key(p))
            .collect()
    }

    /// Providers whose adapters have credentials, in [`Provider::ALL`] order.
    pub fn configured(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|p| self.adapters.get(p).is_some_and(|a| a.is_configured()))
            .collect()
    }
}
