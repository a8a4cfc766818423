//! LLM provider abstraction.
//!
//! A [`ChatRequest`] is provider-neutral. Each adapter implementing
//! [`ChatProvider`] turns it into its own wire format and normalizes the reply
//! into a [`ChatResponse`]. Adapters are looked up through the
//! [`ProviderRegistry`], which is built once at startup.

pub mod gemini;
pub mod openai;
pub mod registry;

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SolarisError};
use crate::session::{ConversationContext, Message};

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use registry::ProviderRegistry;

/// Lower bound for `temperature`.
pub const MIN_TEMPERATURE: f64 = 0.0;
/// Upper bound for `temperature`.
pub const MAX_TEMPERATURE: f64 = 2.0;
/// Upper bound for `max_tokens`.
pub const MAX_TOKENS_LIMIT: u32 = 4000;

const DEFAULT_TEMPERATURE: f64 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Supported upstream LLM services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Provider {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "gemini")]
    Gemini,
}

impl Provider {
    /// Every provider, in display order.
    pub const ALL: [Provider; 2] = [Provider::OpenAi, Provider::Gemini];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }

    /// Static model catalogue. Not queried from the provider.
    pub fn models(&self) -> &'static [&'static str] {
        match self {
            Self::OpenAi => &["gpt-4o-mini", "gpt-4o", "gpt-3.5-turbo"],
            Self::Gemini => &["gemini-1.5-flash", "gemini-1.5-pro", "gemini-1.0-pro"],
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = SolarisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "gemini" => Ok(Self::Gemini),
            other => Err(SolarisError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Model identifiers for a provider name. Unknown names yield an empty list.
pub fn models_for(name: &str) -> Vec<&'static str> {
    name.parse::<Provider>()
        .map(|p| p.models().to_vec())
        .unwrap_or_default()
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

/// Provider-neutral chat request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub context: ConversationContext,
    pub provider: Provider,
    /// Model override. Each adapter falls back to its default model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl ChatRequest {
    pub fn new(messages: Vec<Message>, context: ConversationContext, provider: Provider) -> Self {
        Self {
            messages,
            context,
            provider,
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Enforce the numeric bounds. Called at the API boundary before routing.
    pub fn validate(&self) -> Result<()> {
        if !self.temperature.is_finite()
            || !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&self.temperature)
        {
            return Err(SolarisError::validation(
                "temperature",
                format!(
                    "must be between {MIN_TEMPERATURE} and {MAX_TEMPERATURE}, got {}",
                    self.temperature
                ),
            ));
        }
        if !(1..=MAX_TOKENS_LIMIT).contains(&self.max_tokens) {
            return Err(SolarisError::validation(
                "max_tokens",
                format!(
                    "must be between 1 and {MAX_TOKENS_LIMIT}, got {}",
                    self.max_tokens
                ),
            ));
        }
        Ok(())
    }
}

/// Normalized reply from any provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    pub model: String,
    pub provider: Provider,
    #[serde(default)]
    pub usage: Option<Map<String, Value>>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub request_id: Option<String>,
}

impl ChatResponse {
    /// Build a response stamped with the current time and a fresh request id.
    pub fn new(content: impl Into<String>, model: impl Into<String>, provider: Provider) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            provider,
            usage: None,
            timestamp: Utc::now(),
            request_id: Some(uuid::Uuid::new_v4().to_string()),
        }
    }

    pub fn with_usage(mut self, usage: Map<String, Value>) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// Adapter between [`ChatRequest`] and one provider's native API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Which provider this adapter talks to.
    fn provider(&self) -> Provider;

    /// Whether a credential is present. Unconfigured adapters fail every call
    /// with [`SolarisError::ProviderUnavailable`].
    fn is_configured(&self) -> bool;

    /// Send the request upstream and normalize the reply.
    async fn call(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

/// Pull a human-readable message out of a provider error body.
///
/// Both OpenAI and Gemini wrap failures as `{"error": {"message": ...}}`;
/// anything else is returned verbatim.
pub(crate) fn provider_error_message(status: u16, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.trim().to_string());
    if detail.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {detail}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Domain;

    fn request() -> ChatRequest {
        ChatRequest::new(
            vec![Message::user("hi")],
            ConversationContext::new(Domain::General),
            Provider::OpenAi,
        )
    }

    #[test]
    fn test_provider_wire_names() {
        assert_eq!(serde_json::to_string(&Provider::OpenAi).unwrap(), r#""openai""#);
        assert_eq!(serde_json::to_string(&Provider::Gemini).unwrap(), r#""gemini""#);
        assert!(serde_json::from_str::<Provider>(r#""anthropic""#).is_err());
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert_eq!(" gemini ".parse::<Provider>().unwrap(), Provider::Gemini);
        assert!(matches!(
            "claude".parse::<Provider>(),
            Err(SolarisError::UnsupportedProvider(_))
        ));
    }

    #[test]
    fn test_models_for_known_and_unknown() {
        assert_eq!(
            models_for("gemini"),
            vec!["gemini-1.5-flash", "gemini-1.5-pro", "gemini-1.0-pro"]
        );
        assert_eq!(models_for("openai").len(), 3);
        assert!(models_for("anthropic").is_empty());
    }

    #[test]
    fn test_request_defaults_from_json() {
        let req: ChatRequest = serde_json::from_str(
            r#"{
                "messages": [{"role": "user", "content": "hi"}],
                "context": {"domain": "aws"},
                "provider": "gemini"
            }"#,
        )
        .unwrap();
        assert_eq!(req.temperature, 0.7);
        assert_eq!(req.max_tokens, 1000);
        assert!(req.model.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_temperature_out_of_range() {
        let err = request().with_temperature(2.5).validate().unwrap_err();
        assert!(matches!(err, SolarisError::Validation { ref field, .. } if field == "temperature"));
        assert!(request().with_temperature(-0.1).validate().is_err());
        assert!(request().with_temperature(f64::NAN).validate().is_err());
        assert!(request().with_temperature(2.0).validate().is_ok());
        assert!(request().with_temperature(0.0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_max_tokens_out_of_range() {
        let err = request().with_max_tokens(0).validate().unwrap_err();
        assert!(matches!(err, SolarisError::Validation { ref field, .. } if field == "max_tokens"));
        assert!(request().with_max_tokens(4001).validate().is_err());
        assert!(request().with_max_tokens(4000).validate().is_ok());
        assert!(request().with_max_tokens(1).validate().is_ok());
    }

    #[test]
    fn test_response_new_generates_request_id() {
        let a = ChatResponse::new("x", "m", Provider::Gemini);
        let b = ChatResponse::new("x", "m", Provider::Gemini);
        assert!(a.request_id.is_some());
        assert_ne!(a.request_id, b.request_id);
    }

    #[test]
    fn test_provider_error_message_extracts_nested_message() {
        let body = r#"{"error": {"message": "Invalid API key", "code": 401}}"#;
        assert_eq!(provider_error_message(401, body), "HTTP 401: Invalid API key");
        assert_eq!(provider_error_message(502, "bad gateway"), "HTTP 502: bad gateway");
        assert_eq!(provider_error_message(500, ""), "HTTP 500");
    }
}
