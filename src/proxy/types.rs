//! Request and response types for the relay API and the upstream provider.

use serde::{Deserialize, Serialize};

use crate::config::ApiKey;

/// Inbound chat request body for `POST /api/chat`.
///
/// `developer_message` and `model` are accepted for client compatibility
/// but do not influence which model serves the request or what is sent upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub developer_message: String,
    pub user_message: String,
    #[serde(default = "default_model")]
    pub model: Option<String>,
    pub api_key: ApiKey,
}

fn default_model() -> Option<String> {
    Some("gpt-4.1".to_string())
}

/// A chat message in OpenAI format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Outbound chat completion request sent to the upstream provider.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

/// Content sent with every probe call.
pub const PROBE_CONTENT: &str = "test";

impl ChatCompletionRequest {
    /// Minimal-cost request used only to check that `model` is accessible.
    pub fn probe(model: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![Message::user(PROBE_CONTENT)],
            max_tokens: Some(1),
            stream: None,
        }
    }

    /// Streaming request carrying the caller's message.
    pub fn streaming(model: &str, user_message: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![Message::user(user_message)],
            max_tokens: None,
            stream: Some(true),
        }
    }
}

/// One `data:` payload of an upstream streaming response.
///
/// Only the fields the relay reads are modelled; everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: Option<ChunkDelta>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionChunk {
    /// Text delta of the first choice, if it carries any content.
    pub fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.delta)
            .and_then(|d| d.content)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_defaults_model() {
        let req: ChatRequest = serde_json::from_str(
            r#"{"developer_message":"","user_message":"hi","api_key":"sk-1"}"#,
        )
        .unwrap();
        assert_eq!(req.model.as_deref(), Some("gpt-4.1"));
        assert_eq!(req.api_key.expose_secret(), "sk-1");
    }

    #[test]
    fn test_chat_request_accepts_null_model() {
        let req: ChatRequest = serde_json::from_str(
            r#"{"developer_message":"d","user_message":"hi","model":null,"api_key":"sk-1"}"#,
        )
        .unwrap();
        assert!(req.model.is_none());
    }

    #[test]
    fn test_chat_request_missing_api_key_rejected() {
        let err = serde_json::from_str::<ChatRequest>(
            r#"{"developer_message":"","user_message":"hi"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn test_chat_request_debug_hides_key() {
        let req: ChatRequest = serde_json::from_str(
            r#"{"developer_message":"","user_message":"hi","api_key":"sk-secret-value"}"#,
        )
        .unwrap();
        let debug = format!("{:?}", req);
        assert!(!debug.contains("sk-secret-value"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_probe_request_shape() {
        let json = serde_json::to_value(ChatCompletionRequest::probe("gpt-4.1-nano")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "gpt-4.1-nano",
                "messages": [{"role": "user", "content": "test"}],
                "max_tokens": 1
            })
        );
    }

    #[test]
    fn test_streaming_request_shape() {
        let json =
            serde_json::to_value(ChatCompletionRequest::streaming("gpt-4.1", "Hello")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "gpt-4.1",
                "messages": [{"role": "user", "content": "Hello"}],
                "stream": true
            })
        );
    }

    #[test]
    fn test_chunk_content_extraction() {
        let chunk: ChatCompletionChunk = serde_json::from_str(
            r#"{"id":"c1","choices":[{"index":0,"delta":{"content":"Hi"},"finish_reason":null}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.into_content().as_deref(), Some("Hi"));
    }

    #[test]
    fn test_chunk_without_content() {
        let role_only: ChatCompletionChunk = serde_json::from_str(
            r#"{"choices":[{"index":0,"delta":{"role":"assistant"}}]}"#,
        )
        .unwrap();
        assert!(role_only.into_content().is_none());

        let null_content: ChatCompletionChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"content":null}}]}"#).unwrap();
        assert!(null_content.into_content().is_none());

        let empty: ChatCompletionChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"content":""}}]}"#).unwrap();
        assert!(empty.into_content().is_none());

        let no_choices: ChatCompletionChunk =
            serde_json::from_str(r#"{"choices":[],"usage":{"prompt_tokens":1}}"#).unwrap();
        assert!(no_choices.into_content().is_none());
    }
}
