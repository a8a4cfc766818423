//! Liveness and service banner.

use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "solaris-ai-backend";

/// Every route served, as `(method, path)`.
const ENDPOINTS: &[(&str, &str)] = &[
    ("GET", "/"),
    ("GET", "/health"),
    ("GET", "/docs"),
    ("POST", "/api/v1/ai/chat"),
    ("POST", "/api/v1/ai/analyze"),
    ("GET", "/api/v1/ai/providers"),
    ("GET", "/api/v1/ai/models/{provider}"),
    ("POST", "/api/v1/ai/conversation/start"),
    ("POST", "/api/v1/ai/conversation/{id}/message"),
    ("GET", "/api/v1/ai/conversation/{id}/history"),
];

/// GET /health
pub async fn get_health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// GET /
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "🚀 Solaris AI Assistant Backend",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "docs": "/docs",
    }))
}

/// GET /docs
pub async fn docs() -> Json<Value> {
    let endpoints: Vec<Value> = ENDPOINTS
        .iter()
        .map(|(method, path)| json!({ "method": method, "path": path }))
        .collect();
    Json(json!({ "service": SERVICE_NAME, "endpoints": endpoints }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::server::test_support::{app, get, send};
    use crate::providers::ProviderRegistry;

    #[tokio::test]
    async fn test_get_health_returns_healthy() {
        let Json(body) = get_health().await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "solaris-ai-backend");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_root_over_http() {
        let (app, _) = app(ProviderRegistry::new());
        let (status, body) = send(app, get("/")).await;
        assert_eq!(status, 200);
        assert_eq!(body["message"], "🚀 Solaris AI Assistant Backend");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["status"], "running");
        assert_eq!(body["docs"], "/docs");
    }

    #[tokio::test]
    async fn test_docs_link_resolves() {
        let (app, _) = app(ProviderRegistry::new());
        let (status, body) = send(app, get("/docs")).await;
        assert_eq!(status, 200);
        let endpoints = body["endpoints"].as_array().unwrap();
        assert_eq!(endpoints.len(), ENDPOINTS.len());
        assert!(endpoints
            .iter()
            .any(|e| e["method"] == "POST" && e["path"] == "/api/v1/ai/chat"));
    }
}
