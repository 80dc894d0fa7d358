//! HTTP server setup and configuration.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use reqwest::Client;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use super::handlers;
use crate::config::Config;
use crate::router::ModelCandidates;

/// Response header carrying the per-request correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Per-request correlation ID (UUID v4), available to handlers as an extension.
#[derive(Debug, Clone, Copy)]
pub struct RequestId(pub uuid::Uuid);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub http_client: Client,
    pub config: Arc<Config>,
    pub candidates: ModelCandidates,
}

impl AppState {
    /// Build state from configuration.
    ///
    /// No overall timeout is set on the client: streamed completions may run
    /// for as long as the provider keeps sending.
    pub fn new(config: Config) -> reqwest::Result<Self> {
        let http_client = Client::builder()
            .connect_timeout(config.upstream.connect_timeout())
            .build()?;

        Ok(Self::with_client(config, http_client))
    }

    pub fn with_client(config: Config, http_client: Client) -> Self {
        let candidates = ModelCandidates::new(config.upstream.models.clone());
        Self {
            http_client,
            config: Arc::new(config),
            candidates,
        }
    }
}

/// Assign a request ID, expose it to handlers, and echo it on the response.
async fn assign_request_id(mut request: Request, next: Next) -> Response {
    let request_id = RequestId(uuid::Uuid::new_v4());
    request.extensions_mut().insert(request_id);

    let span = tracing::info_span!("request", request_id = %request_id);
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

/// Create the axum router with all endpoints.
///
/// CORS mirrors the caller's origin and allows credentials, which
/// amounts to accepting every origin, method and header.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(handlers::chat))
        .route("/api/health", get(handlers::health))
        // State and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .layer(middleware::from_fn(assign_request_id))
}

/// Run the HTTP server.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let listen_addr = config.server.listen.clone();

    tracing::info!(
        upstream = %config.upstream.base_url,
        models = ?config.upstream.models,
        "Configured model candidates"
    );

    let state = AppState::new(config)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(address = %listen_addr, "Starting chat relay server");

    axum::serve(listener, app).await?;

    Ok(())
}
