//! Axum API server for the Solaris gateway.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::analysis::AnalysisQueue;
use crate::cache::ResponseCache;
use crate::config::Config;
use crate::error::Result;
use crate::providers::ProviderRegistry;
use crate::router::RequestRouter;
use crate::session::{InMemorySessionStore, SessionStore};

use super::routes;

/// Maximum accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared state for all API handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cache-fronted dispatch to provider adapters.
    pub router: RequestRouter,
    pub sessions: Arc<dyn SessionStore>,
    /// Background analysis fed by `/chat`.
    pub analysis: AnalysisQueue,
}

impl AppState {
    pub fn new(
        router: RequestRouter,
        sessions: Arc<dyn SessionStore>,
        analysis: AnalysisQueue,
    ) -> Self {
        Self {
            router,
            sessions,
            analysis,
        }
    }

    /// Wire every component from configuration and start the analysis worker.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let registry = ProviderRegistry::from_config(&config.providers)?;
        let cache = ResponseCache::connect(&config.cache).await;
        info!(backend = cache.backend(), "Response cache ready");
        let router = RequestRouter::new(
            registry,
            Arc::new(cache),
            Duration::from_secs(config.cache.ttl_secs),
            config.providers.max_concurrent_calls,
        );
        // The worker runs until the last queue handle is dropped.
        let (analysis, _worker) = AnalysisQueue::spawn(config.analysis.queue_capacity);
        Ok(Self::new(
            router,
            Arc::new(InMemorySessionStore::new()),
            analysis,
        ))
    }
}

/// CORS for the configured browser origins. `*` mirrors any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    // Credentials rule out wildcards, so methods and headers are mirrored.
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Build the axum router with all API routes.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let ai = Router::new()
        .route("/chat", post(routes::chat::chat))
        .route("/analyze", post(routes::analyze::analyze_conversation))
        .route("/providers", get(routes::providers::list_providers))
        .route("/models/{provider}", get(routes::providers::list_models))
        .route(
            "/conversation/start",
            post(routes::conversation::start_conversation),
        )
        .route(
            "/conversation/{id}/message",
            post(routes::conversation::add_message),
        )
        .route(
            "/conversation/{id}/history",
            get(routes::conversation::get_history),
        );

    Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::get_health))
        .route("/docs", get(routes::health::docs))
        .nest("/api/v1/ai", ai)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Bind and serve until Ctrl-C.
pub async fn start_server(config: &Config, state: AppState) -> Result<()> {
    let app = build_router(state, &config.server.cors_origins);
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Solaris API server listening on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Solaris API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
