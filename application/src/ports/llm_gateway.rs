//! Chat gateway port
//!
//! Defines the interface for sending chat completion requests to an
//! external model provider.

use async_trait::async_trait;
use thinktank_domain::{Message, Mode, Model};

use thiserror::Error;

/// Errors that can occur during gateway operations
///
/// Providers fail in arbitrary ways (timeouts, rate limits, malformed
/// responses); every failure surfaces as a typed variant, never a panic.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// One chat completion request
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: Model,
    /// Ordered role/content messages
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ChatRequest {
    pub fn new(model: Model, messages: Vec<Message>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            model,
            messages,
            temperature,
            max_tokens,
        }
    }

    /// Build a request using a mode's sampling parameters
    pub fn for_mode(model: Model, messages: Vec<Message>, mode: Mode) -> Self {
        let profile = mode.profile();
        Self::new(model, messages, profile.temperature, profile.max_tokens)
    }
}

/// Gateway for chat completion
///
/// This port defines how the application layer talks to model providers.
/// Implementations (adapters) live in the infrastructure layer and must
/// be safe to call concurrently from the fan-out.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Send a completion request and return the generated text
    async fn complete(&self, request: &ChatRequest) -> Result<String, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use thinktank_domain::Message;

    #[test]
    fn test_for_mode_takes_profile_sampling() {
        let request = ChatRequest::for_mode(
            Model::Gpt4oMini,
            vec![Message::user("hi")],
            Mode::Eco,
        );
        assert_eq!(request.temperature, 0.2);
        assert_eq!(request.max_tokens, 160);
    }
}
