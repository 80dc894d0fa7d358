//! Error types for chat-relay.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Result type alias for chat-relay operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for chat-relay.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request body failed schema validation. No upstream call was made.
    #[error("{message}")]
    InvalidRequest { status: StatusCode, message: String },

    /// Upstream failure, already classified into a status code.
    /// `message` is the raw upstream error text.
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidRequest { status, .. } => *status,
            Error::Upstream { status, .. } => *status,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({ "detail": self.to_string() });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_upstream_error_renders_raw_detail() {
        let err = Error::Upstream {
            status: StatusCode::TOO_MANY_REQUESTS,
            message: "Error code: 429 - insufficient_quota".to_string(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let json = body_json(response).await;
        assert_eq!(json["detail"], "Error code: 429 - insufficient_quota");
    }

    #[tokio::test]
    async fn test_invalid_request_keeps_status() {
        let err = Error::InvalidRequest {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "missing field `api_key`".to_string(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["detail"], "missing field `api_key`");
    }

    #[test]
    fn test_internal_is_500() {
        assert_eq!(
            Error::Internal("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
