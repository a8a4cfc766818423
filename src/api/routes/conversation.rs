//! Conversation session routes.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::api::error::ApiError;
use crate::api::extract::ApiJson;
use crate::api::server::AppState;
use crate::providers::Provider;
use crate::session::{ConversationContext, ConversationSession, Message};

#[derive(Debug, Deserialize)]
pub struct StartConversation {
    #[serde(default)]
    pub context: ConversationContext,
    #[serde(default = "default_provider")]
    pub provider: Provider,
}

fn default_provider() -> Provider {
    Provider::OpenAi
}

/// POST /api/v1/ai/conversation/start
pub async fn start_conversation(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<StartConversation>,
) -> Json<ConversationSession> {
    let session = state.sessions.create(body.context, body.provider).await;
    info!(session_id = %session.id, domain = %session.context.domain, "Conversation started");
    Json(session)
}

/// POST /api/v1/ai/conversation/{id}/message
///
/// Only ids issued by `/conversation/start` are accepted; an unknown id is
/// rejected with 404 `session_not_found` instead of being acknowledged.
pub async fn add_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(message): ApiJson<Message>,
) -> Result<Json<Value>, ApiError> {
    state
        .sessions
        .append_message(&id, message)
        .await
        .map_err(|e| ApiError::new("Failed to add message", e))?;
    Ok(Json(json!({
        "message": "Message added successfully",
        "session_id": id,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

/// GET /api/v1/ai/conversation/{id}/history
///
/// An unknown id is rejected with 404 `session_not_found` rather than
/// answered with an empty history.
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let messages = state
        .sessions
        .get_history(&id)
        .await
        .map_err(|e| ApiError::new("Failed to get history", e))?;
    Ok(Json(json!({
        "session_id": id,
        "total_messages": messages.len(),
        "messages": messages,
    })))
}
