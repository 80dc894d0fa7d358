//! Mapping of upstream failure text to HTTP status codes.
//!
//! Providers report failures as free-form text, so classification is a
//! case-insensitive substring match. Rules are checked in order and the
//! first hit wins; a message mentioning both a quota and a bad key is a 429.

use axum::http::StatusCode;

use crate::error::Error;

/// Detail reported when the candidate list produced no error at all.
pub const NO_MODELS_AVAILABLE: &str = "No models available";

const RULES: &[(&[&str], StatusCode)] = &[
    (
        &["insufficient_quota", "quota"],
        StatusCode::TOO_MANY_REQUESTS,
    ),
    (&["model_not_found"], StatusCode::NOT_FOUND),
    (
        &["authentication", "invalid_api_key"],
        StatusCode::UNAUTHORIZED,
    ),
];

/// Classify an upstream error message into the status returned to the caller.
pub fn classify_upstream_error(message: &str) -> StatusCode {
    let lower = message.to_lowercase();
    RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
        .map(|(_, status)| *status)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl Error {
    /// Build a classified upstream error carrying the raw message as detail.
    pub fn upstream(message: impl Into<String>) -> Self {
        let message = message.into();
        Error::Upstream {
            status: classify_upstream_error(&message),
            message,
        }
    }
}
