//! HTTP request handlers.

use axum::{
    body::Body,
    extract::{Extension, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use super::server::{AppState, RequestId};
use super::stream::token_stream;
use super::types::{ChatRequest, UpstreamChatRequest};
use crate::config::ProviderConfig;
use crate::error::Error;

/// Response header: provider name that handled the request.
pub const RELAY_PROVIDER_HEADER: &str = "x-relay-provider";

/// Handle POST /api/chat
///
/// Looks up the requested provider, forwards the conversation upstream with
/// `stream: true`, and relays the decoded token stream back to the client.
/// Upstream error responses are forwarded verbatim (status + body).
pub async fn chat(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, Error> {
    let provider = select_provider(&state, request.provider.as_deref())?;

    if request.messages.is_empty() {
        return Err(Error::BadRequest("messages must not be empty".to_string()));
    }

    tracing::info!(
        request_id = %request_id.0,
        provider = %provider.name,
        model = %provider.model,
        message_count = request.messages.len(),
        "Received chat request"
    );

    let upstream_body = UpstreamChatRequest::build(&request, provider);

    let mut upstream_request = state
        .http_client
        .post(&provider.url)
        .header(header::CONTENT_TYPE, "application/json")
        .json(&upstream_body);

    if let Some(api_key) = &provider.api_key {
        upstream_request = upstream_request.header(
            header::AUTHORIZATION,
            format!("Bearer {}", api_key.expose_secret()),
        );
    }

    let upstream_response = upstream_request.send().await.map_err(|e| {
        tracing::error!(error = %e, provider = %provider.name, "Failed to reach provider");
        Error::Provider(format!(
            "Failed to reach provider '{}': {}",
            provider.name, e
        ))
    })?;

    let status = upstream_response.status();
    if !status.is_success() {
        let error_body = upstream_response.text().await.unwrap_or_default();
        tracing::error!(
            status = %status,
            provider = %provider.name,
            body = %error_body,
            "Provider returned error"
        );
        // Forward the upstream error verbatim: same status, unmodified body.
        return Response::builder()
            .status(StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY))
            .body(Body::from(error_body))
            .map_err(|e| Error::Internal(e.to_string()));
    }

    let body = Body::from_stream(token_stream(upstream_response.bytes_stream()));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(
            HeaderName::from_static(RELAY_PROVIDER_HEADER),
            HeaderValue::from_str(&provider.name).unwrap_or(HeaderValue::from_static("unknown")),
        )
        .body(body)
        .map_err(|e| Error::Internal(e.to_string()))
}

/// Resolve the request's provider selector against configured providers.
fn select_provider<'a>(
    state: &'a AppState,
    name: Option<&str>,
) -> Result<&'a ProviderConfig, Error> {
    let name = name.ok_or_else(|| Error::BadRequest("no provider specified".to_string()))?;
    state
        .providers
        .get(name)
        .ok_or_else(|| Error::UnknownProvider {
            name: name.to_string(),
        })
}

/// Handle GET /health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "chat-relay"
    }))
}

/// Handle GET /api/providers - list configured providers for the client selector
pub async fn list_providers(State(state): State<AppState>) -> impl IntoResponse {
    let providers: Vec<serde_json::Value> = state
        .config
        .providers
        .iter()
        .map(|p| {
            serde_json::json!({
                "name": p.name,
                "model": p.model,
            })
        })
        .collect();

    Json(serde_json::json!({
        "providers": providers
    }))
}
