//! Credential-scoped client for the upstream chat completions API.

use axum::http::{header, StatusCode};
use bytes::Bytes;
use futures::Stream;
use reqwest::Client;

use super::types::ChatCompletionRequest;
use crate::config::{ApiKey, UpstreamConfig};

/// Upstream call failure.
///
/// The Display text is what the caller eventually sees as `detail`, and what
/// the classifier matches on, so HTTP failures keep the provider's raw body.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Error code: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Connection error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Client bound to one caller's API key.
///
/// Built per request; the underlying connection pool is shared.
pub struct UpstreamClient {
    http: Client,
    url: String,
    api_key: ApiKey,
}

impl UpstreamClient {
    pub fn new(http: Client, upstream: &UpstreamConfig, api_key: ApiKey) -> Self {
        Self {
            http,
            url: upstream.completions_url(),
            api_key,
        }
    }

    async fn send(
        &self,
        body: &ChatCompletionRequest,
    ) -> Result<reqwest::Response, UpstreamError> {
        let response = self
            .http
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .bearer_auth(self.api_key.expose_secret())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: error_body(status, response.text().await),
            });
        }

        Ok(response)
    }

    /// Send a one-token completion to check that `model` is usable with this key.
    pub async fn probe(&self, model: &str) -> Result<(), UpstreamError> {
        let response = self.send(&ChatCompletionRequest::probe(model)).await?;
        response.bytes().await?;
        Ok(())
    }

    /// Open a streaming completion and return the raw SSE byte stream.
    pub async fn open_stream(
        &self,
        model: &str,
        user_message: &str,
    ) -> Result<impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static, UpstreamError> {
        let response = self
            .send(&ChatCompletionRequest::streaming(model, user_message))
            .await?;
        Ok(response.bytes_stream())
    }
}

/// Text of a non-2xx response body, or a note naming why it could not be read.
fn error_body(status: StatusCode, text: reqwest::Result<String>) -> String {
    match text {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(status = %status, error = %e, "Failed to read upstream error body");
            format!("<unreadable body: {}>", e)
        }
    }
}
