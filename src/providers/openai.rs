//! OpenAI chat-completions adapter.
//!
//! Sends a role-tagged message list to `/chat/completions`. A system message
//! carrying the domain prompt is prepended only for non-general domains.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::error::{Result, SolarisError};
use crate::prompt::build_system_prompt;
use crate::session::Domain;

use super::{provider_error_message, ChatProvider, ChatRequest, ChatResponse, Provider};

/// Public OpenAI REST API base.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Model used when the request carries no override.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// One entry of the outgoing `messages` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<CompletionChoice>,
    #[serde(default)]
    usage: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Adapter for the OpenAI chat-completions API.
pub struct OpenAiProvider {
    api_key: Option<String>,
    api_base: String,
    client: Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl OpenAiProvider {
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
                .unwrap_or(OPENAI_API_BASE)
                .trim_end_matches('/')
                .to_string(),
            client,
        })
    }

    pub fn default_model(&self) -> &str {
        DEFAULT_OPENAI_MODEL
    }

    /// Translate the request into the OpenAI `messages` array.
    pub fn build_messages(request: &ChatRequest) -> Vec<WireMessage> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if request.context.domain != Domain::General {
            messages.push(WireMessage {
                role: "system",
                content: build_system_prompt(&request.context),
            });
        }
        messages.extend(request.messages.iter().map(|m| WireMessage {
            role: m.role.as_str(),
            content: m.content.clone(),
        }));
        messages
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }

    fn into_response(parsed: CompletionResponse, requested_model: &str) -> Result<ChatResponse> {
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                SolarisError::provider_call(Provider::OpenAi, "response contained no message content")
            })?;
        let model = parsed
            .model
            .unwrap_or_else(|| requested_model.to_string());

        let mut response = ChatResponse::new(content, model, Provider::OpenAi);
        if let Some(usage) = parsed.usage {
            response = response.with_usage(usage);
        }
        Ok(response)
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn call(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SolarisError::ProviderUnavailable(Provider::OpenAi))?;
        let model = request.model.as_deref().unwrap_or(DEFAULT_OPENAI_MODEL);
        let body = CompletionRequest {
            model,
            messages: Self::build_messages(request),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!(
            model = %model,
            messages = body.messages.len(),
            "OpenAI chat completion request"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "OpenAI request failed");
                SolarisError::provider_call(Provider::OpenAi, format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(status = %status, "OpenAI API error");
            return Err(SolarisError::provider_call(
                Provider::OpenAi,
                provider_error_message(status.as_u16(), &error_text),
            ));
        }

        let parsed: CompletionResponse = response.json().await.map_err(|e| {
            SolarisError::provider_call(Provider::OpenAi, format!("failed to parse response: {e}"))
        })?;
        Self::into_response(parsed, model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ConversationContext, Message};
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn aws_request() -> ChatRequest {
        ChatRequest::new(
            vec![Message::user("Help me study for AWS certification")],
            ConversationContext::new(Domain::Aws),
            Provider::OpenAi,
        )
    }

    fn provider(key: Option<&str>, base: &str) -> OpenAiProvider {
        OpenAiProvider::new(key, Some(base), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_build_messages_prepends_system_for_domain() {
        let messages = OpenAiProvider::build_messages(&aws_request());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("AWS development"));
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].content, "Help me study for AWS certification");
    }

    #[test]
    fn test_build_messages_general_has_no_system() {
        let request = ChatRequest::new(
            vec![Message::user("hi"), Message::assistant("hello")],
            ConversationContext::new(Domain::General),
            Provider::OpenAi,
        );
        let messages = OpenAiProvider::build_messages(&request);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[1].role, "assistant");
    }

    #[test]
    fn test_empty_key_is_unconfigured() {
        let p = OpenAiProvider::new(Some(""), None, Duration::from_secs(1)).unwrap();
        assert!(!p.is_configured());
        assert_eq!(p.completions_url(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_debug_redacts_key() {
        let p = provider(Some("sk-secret"), "http://localhost");
        let dbg = format!("{p:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("REDACTED"));
    }

    #[tokio::test]
    async fn test_call_without_key_is_unavailable() {
        let p = provider(None, "http://localhost:1");
        let err = p.call(&aws_request()).await.unwrap_err();
        assert!(matches!(err, SolarisError::ProviderUnavailable(Provider::OpenAi)));
    }

    #[tokio::test]
    async fn test_call_maps_completion_into_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(bearer_token("sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "max_tokens": 1000
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-1",
                "model": "gpt-4o-mini-2024-07-18",
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": "Start with the Cloud Practitioner exam." },
                    "finish_reason": "stop"
                }],
                "usage": { "prompt_tokens": 42, "completion_tokens": 8, "total_tokens": 50 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let p = provider(Some("sk-test"), &server.uri());
        let response = p.call(&aws_request()).await.unwrap();
        assert_eq!(response.provider, Provider::OpenAi);
        assert_eq!(response.content, "Start with the Cloud Practitioner exam.");
        assert_eq!(response.model, "gpt-4o-mini-2024-07-18");
        let usage = response.usage.expect("usage mapped");
        assert_eq!(usage["total_tokens"], 50);
        assert!(response.request_id.is_some());
    }

    #[tokio::test]
    async fn test_call_sends_system_and_user_messages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "messages": [
                    { "role": "system" },
                    { "role": "user", "content": "Help me study for AWS certification" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "ok" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let p = provider(Some("sk-test"), &server.uri());
        let response = p.call(&aws_request().with_model("gpt-4o")).await.unwrap();
        // No model in the reply: the requested model is reported.
        assert_eq!(response.model, "gpt-4o");
        assert!(response.usage.is_none());
    }

    #[tokio::test]
    async fn test_call_surfaces_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": { "message": "Rate limit reached", "type": "requests" }
            })))
            .mount(&server)
            .await;

        let p = provider(Some("sk-test"), &server.uri());
        let err = p.call(&aws_request()).await.unwrap_err();
        match err {
            SolarisError::ProviderCall { provider, message } => {
                assert_eq!(provider, Provider::OpenAi);
                assert_eq!(message, "HTTP 429: Rate limit reached");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_call_without_choices_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": []
            })))
            .mount(&server)
            .await;

        let p = provider(Some("sk-test"), &server.uri());
        let err = p.call(&aws_request()).await.unwrap_err();
        assert_eq!(err.code(), "provider_call_error");
    }
}
