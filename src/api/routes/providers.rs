//! Provider and model catalogue routes.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use crate::api::server::AppState;
use crate::providers::models_for;

/// GET /api/v1/ai/providers: providers with credentials configured.
pub async fn list_providers(State(state): State<Arc<AppState>>) -> Json<Vec<&'static str>> {
    Json(
        state
            .router
            .registry()
            .configured()
            .into_iter()
            .map(|p| p.as_str())
            .collect(),
    )
}

/// GET /api/v1/ai/models/{provider}: static model list, empty when unknown.
pub async fn list_models(Path(provider): Path<String>) -> Json<Vec<&'static str>> {
    Json(models_for(&provider))
}
