//! HTTP server setup and configuration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use reqwest::Client;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use uuid::Uuid;

use super::handlers;
use crate::config::{Config, ProviderConfig};

/// Response header: correlation ID (UUID v4).
pub const RELAY_REQUEST_ID_HEADER: &str = "x-relay-request-id";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Configured providers keyed by name.
    pub providers: Arc<HashMap<String, ProviderConfig>>,
    pub http_client: Client,
    pub config: Arc<Config>,
}

/// Per-request correlation ID, inserted as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub Uuid);

/// Assign a correlation ID to each request and echo it on the response.
async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = RequestId(Uuid::new_v4());
    let id_value = request_id.0.to_string();
    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id_value) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(RELAY_REQUEST_ID_HEADER), value);
    }
    response
}

/// Create the axum router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    let static_dir = state.config.server.static_dir.clone();

    Router::new()
        // Relay API
        .route("/api/chat", post(handlers::chat))
        .route("/api/providers", get(handlers::list_providers))
        .route("/health", get(handlers::health))
        // Browser client assets
        .fallback_service(ServeDir::new(static_dir))
        // State and middleware
        .with_state(state)
        .layer(middleware::from_fn(request_id_middleware))
        // Browser client may be served from another origin during development
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Build the shared state from a loaded configuration.
pub fn build_state(config: Config) -> anyhow::Result<AppState> {
    let providers: HashMap<String, ProviderConfig> = config
        .providers
        .iter()
        .cloned()
        .map(|p| (p.name.clone(), p))
        .collect();

    // No overall request timeout: streamed completions are long-lived.
    let http_client = Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    Ok(AppState {
        providers: Arc::new(providers),
        http_client,
        config: Arc::new(config),
    })
}

/// Run the HTTP server.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let listen_addr = config.server.listen.clone();
    let state = build_state(config)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(address = %listen_addr, "Starting chat-relay server");

    axum::serve(listener, app).await?;

    Ok(())
}
