//! Error types for the Solaris gateway.
//!
//! Every fallible library operation returns [`Result`]. The API layer maps
//! each variant onto an HTTP status and a stable machine-readable code (see
//! [`SolarisError::code`]) so clients can tell a misconfigured provider from a
//! failing one without parsing the message text.

use thiserror::Error;

use crate::providers::Provider;

/// Errors produced by the gateway core.
#[derive(Debug, Error)]
pub enum SolarisError {
    /// Malformed or out-of-range request input.
    #[error("invalid field '{field}': {message}")]
    Validation { field: String, message: String },

    /// The selected provider has no credential configured.
    #[error("{0} client not initialized")]
    ProviderUnavailable(Provider),

    /// The remote provider API failed (transport, auth, rate limit, bad reply).
    #[error("{provider} API error: {message}")]
    ProviderCall { provider: Provider, message: String },

    /// No adapter is registered for the requested provider.
    #[error("Unsupported AI provider: {0}")]
    UnsupportedProvider(String),

    /// Conversation session id is unknown to the session store.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Cache backend failure. Recovered inside the cache module.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Invalid configuration detected at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SolarisError {
    /// Shorthand for a [`SolarisError::Validation`] error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`SolarisError::ProviderCall`] error.
    pub fn provider_call(provider: Provider, message: impl Into<String>) -> Self {
        Self::ProviderCall {
            provider,
            message: message.into(),
        }
    }

    /// Stable wire code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::ProviderUnavailable(_) => "provider_unavailable",
            Self::ProviderCall { .. } => "provider_call_error",
            Self::UnsupportedProvider(_) => "unsupported_provider",
            Self::SessionNotFound(_) => "session_not_found",
            Self::Cache(_) => "cache_error",
            Self::Config(_) => "config_error",
            Self::Io(_) | Self::Json(_) => "internal_error",
        }
    }
}

impl From<redis::RedisError> for SolarisError {
    fn from(err: redis::RedisError) -> Self {
        Self::Cache(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SolarisError>;
