//! chat-relay - Streaming chat relay with model-fallback probing
//!
//! This library provides the core functionality for the chat-relay server,
//! including configuration, working-model selection, and the streaming relay.

pub mod config;
pub mod error;
pub mod proxy;
pub mod router;

pub use config::Config;
pub use error::{Error, Result};
