//! HTTP request handlers.

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Extension, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::StreamExt;

use super::classify::NO_MODELS_AVAILABLE;
use super::server::{AppState, RequestId};
use super::stream::relay_text_stream;
use super::types::ChatRequest;
use super::upstream::UpstreamClient;
use crate::error::Error;
use crate::router::{probe_candidates, ProbeOutcome};

/// Response header: the model that served a streamed response.
pub const RELAY_MODEL_HEADER: &str = "x-relay-model";

/// Handle POST /api/chat
///
/// Probes the candidate models with the caller's key, then relays the
/// working model's streamed output as plain text. Failures before the
/// first byte become JSON errors; later failures abort the body.
pub async fn chat(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, Error> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Rejected chat request body");
        Error::InvalidRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    })?;

    tracing::info!(
        requested_model = ?request.model,
        developer_message_len = request.developer_message.len(),
        user_message_len = request.user_message.len(),
        "Received chat request"
    );

    let client = UpstreamClient::new(
        state.http_client.clone(),
        &state.config.upstream,
        request.api_key.clone(),
    );
    let client = &client;

    let outcome = probe_candidates(&state.candidates, |model| async move {
        client.probe(&model).await
    })
    .await;

    let model = match outcome {
        ProbeOutcome::Selected { model, .. } => model,
        ProbeOutcome::Exhausted {
            last_error,
            attempts,
        } => {
            let message = last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| NO_MODELS_AVAILABLE.to_string());
            let err = Error::upstream(message);
            tracing::error!(
                attempts,
                status = %err.status(),
                error = %err,
                "All candidate models failed"
            );
            return Err(err);
        }
    };

    let upstream = client
        .open_stream(&model, &request.user_message)
        .await
        .map_err(|e| {
            let err = Error::upstream(e.to_string());
            tracing::error!(
                model = %model,
                status = %err.status(),
                error = %err,
                "Failed to open upstream stream"
            );
            err
        })?;

    tracing::info!(model = %model, "Streaming response from working model");

    let stream_model = model.clone();
    let body = relay_text_stream(upstream).map(move |item| {
        item.map_err(|e| {
            tracing::error!(
                request_id = %request_id,
                model = %stream_model,
                error = %e,
                "Relay stream aborted"
            );
            std::io::Error::from(e)
        })
    });

    let mut response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(body))
        .map_err(|e| Error::Internal(e.to_string()))?;

    if let Ok(value) = HeaderValue::from_str(&model) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(RELAY_MODEL_HEADER), value);
    }

    Ok(response)
}

/// Handle GET /api/health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
