//! Chat completion route.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use tracing::info;

use crate::analysis::AnalysisJob;
use crate::api::error::ApiError;
use crate::api::extract::ApiJson;
use crate::api::server::AppState;
use crate::providers::{ChatRequest, ChatResponse};
use crate::session::Message;

/// POST /api/v1/ai/chat
///
/// Validates the request, routes it through the cache to the selected
/// provider, then queues the transcript plus reply for background analysis.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    request.validate().map_err(ApiError::invalid)?;
    info!(
        provider = %request.provider,
        domain = %request.context.domain,
        messages = request.messages.len(),
        "Chat request"
    );

    let response = state
        .router
        .process(&request)
        .await
        .map_err(|e| ApiError::new("AI service error", e))?;

    let ChatRequest {
        mut messages,
        context,
        ..
    } = request;
    messages.push(Message::assistant(response.content.clone()));
    state.analysis.submit(AnalysisJob {
        messages,
        context,
        request_id: response.request_id.clone(),
    });

    Ok(Json(response))
}
