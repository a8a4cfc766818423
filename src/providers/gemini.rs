//! Native Gemini adapter.
//!
//! Gemini is driven as a single-prompt generator: the system prompt and a
//! plain-text transcript are concatenated into one user turn and sent to
//! `generateContent`. Token usage is approximated by counting
//! whitespace-separated words of that prompt.
//!
//! Thinking models return parts tagged `thought: true`; those are skipped
//! when extracting the answer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};
use tracing::{debug, error};

use crate::error::{Result, SolarisError};
use crate::prompt::build_system_prompt;
use crate::session::{Message, Role};

use super::{provider_error_message, ChatProvider, ChatRequest, ChatResponse, Provider};

/// Gemini v1beta REST API base.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model when the request carries no override.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Credential header. Keeps the key out of URLs, which reqwest errors echo.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Native Gemini provider that speaks the Gemini REST API directly.
pub struct GeminiProvider {
    api_key: Option<String>,
    api_base: String,
    client: Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GeminiProvider {
    /// Build the adapter. An absent or empty `api_key` leaves it unconfigured.
    pub fn new(api_key: Option<&str>, api_base: Option<&str>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SolarisError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            api_key: api_key.filter(|k| !k.is_empty()).map(String::from),
            api_base: api_base
                .filter(|b| !b.is_empty())
                .unwrap_or(GEMINI_API_BASE)
                .trim_end_matches('/')
                .to_string(),
            client,
        })
    }

    pub fn default_model(&self) -> &str {
        DEFAULT_GEMINI_MODEL
    }

    /// Render the transcript as `User: ...` / `Assistant: ...` paragraphs.
    ///
    /// Every non-user role renders as `Assistant`.
    pub fn format_conversation(messages: &[Message]) -> String {
        messages
            .iter()
            .map(|m| {
                let speaker = if m.role == Role::User {
                    "User"
                } else {
                    "Assistant"
                };
                format!("{speaker}: {}", m.content)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Full prompt: system prompt, blank line, transcript.
    pub fn build_prompt(request: &ChatRequest) -> String {
        format!(
            "{}\n\n{}",
            build_system_prompt(&request.context),
            Self::format_conversation(&request.messages)
        )
    }

    /// Whitespace word count of the prompt. An approximation, not a token count.
    pub fn approximate_tokens(prompt: &str) -> usize {
        prompt.split_whitespace().count()
    }

    fn build_body(prompt: &str, request: &ChatRequest) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "temperature": request.temperature,
                "maxOutputTokens": request.max_tokens
            }
        })
    }

    /// Extract final answer text from a Gemini API response.
    ///
    /// Falls back to thought text when no final parts exist.
    pub fn extract_text(response: &Value) -> Option<String> {
        let parts = response["candidates"][0]["content"]["parts"].as_array()?;

        let final_parts: Vec<&str> = parts
            .iter()
            .filter(|p| !p["thought"].as_bool().unwrap_or(false))
            .filter_map(|p| p["text"].as_str())
            .collect();
        if !final_parts.is_empty() {
            return Some(final_parts.join(""));
        }

        let thought_parts: Vec<&str> = parts.iter().filter_map(|p| p["text"].as_str()).collect();
        if thought_parts.is_empty() {
            None
        } else {
            Some(thought_parts.join(""))
        }
    }

    fn api_url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.api_base, model)
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn call(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SolarisError::ProviderUnavailable(Provider::Gemini))?;
        let model = request.model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL);
        let prompt = Self::build_prompt(request);
        let body = Self::build_body(&prompt, request);

        debug!(model = %model, prompt_chars = prompt.len(), "Gemini generateContent request");

        let response = self
            .client
            .post(self.api_url(model))
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                error!(error = %e, "Gemini request failed");
                SolarisError::provider_call(Provider::Gemini, format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(status = %status, "Gemini API error");
            return Err(SolarisError::provider_call(
                Provider::Gemini,
                provider_error_message(status.as_u16(), &error_text),
            ));
        }

        let json: Value = response.json().await.map_err(|e| {
            SolarisError::provider_call(
                Provider::Gemini,
                format!("failed to parse response: {}", e.without_url()),
            )
        })?;
        let content = Self::extract_text(&json).ok_or_else(|| {
            SolarisError::provider_call(Provider::Gemini, "response contained no text")
        })?;

        let mut usage = Map::new();
        usage.insert(
            "total_tokens".into(),
            json!(Self::approximate_tokens(&prompt)),
        );
        Ok(ChatResponse::new(content, model, Provider::Gemini).with_usage(usage))
    }
}
