//! HTTP relay server module.
//!
//! This module provides the chat API that accepts requests, picks a
//! working upstream model, and relays its streamed output.

pub mod classify;
mod handlers;
mod server;
pub mod stream;
pub mod types;
pub mod upstream;

pub use classify::classify_upstream_error;
pub use handlers::RELAY_MODEL_HEADER;
pub use server::{create_router, run_server, AppState, RequestId, REQUEST_ID_HEADER};
pub use stream::{relay_text_stream, DeltaDecoder, StreamError};
pub use types::{ChatCompletionRequest, ChatRequest, Message};
pub use upstream::{UpstreamClient, UpstreamError};
