//! OpenRouter gateway adapter
//!
//! Implements `ChatGateway` against OpenRouter's OpenAI-compatible
//! `/chat/completions` endpoint. One adapter reaches every model in the
//! catalog, so no per-vendor routing is needed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thinktank_application::{ChatGateway, ChatRequest, GatewayError};
use tracing::{debug, warn};

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Connection settings for the OpenRouter adapter
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    pub api_key: String,
    pub base_url: String,
    /// Sent as `HTTP-Referer` for OpenRouter app attribution
    pub app_url: Option<String>,
    /// Sent as `X-Title` for OpenRouter app attribution
    pub app_name: Option<String>,
    /// Per-request timeout; a timed-out call degrades like any failure
    pub timeout: Duration,
}

impl OpenRouterConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENROUTER_BASE_URL.to_string(),
            app_url: None,
            app_name: Some("ThinkTank".to_string()),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

pub struct OpenRouterGateway {
    http: reqwest::Client,
    config: OpenRouterConfig,
}

impl OpenRouterGateway {
    pub fn new(config: OpenRouterConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;
        Ok(Self { http, config })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

// -- Wire types ----------------------------------------------------------

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

fn to_wire(request: &ChatRequest) -> CompletionRequest<'_> {
    CompletionRequest {
        model: request.model.as_str(),
        temperature: request.temperature,
        max_tokens: request.max_tokens,
        messages: request
            .messages
            .iter()
            .map(|m| WireMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect(),
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: Option<String>,
}

#[async_trait]
impl ChatGateway for OpenRouterGateway {
    async fn complete(&self, request: &ChatRequest) -> Result<String, GatewayError> {
        debug!(model = %request.model, "Sending completion request");

        let mut builder = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&to_wire(request));

        if let Some(app_url) = &self.config.app_url {
            builder = builder.header("HTTP-Referer", app_url);
        }
        if let Some(app_name) = &self.config.app_name {
            builder = builder.header("X-Title", app_name);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout
            } else {
                GatewayError::ConnectionError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(model = %request.model, %status, "Completion request rejected");
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(GatewayError::ModelNotAvailable(
                    request.model.as_str().to_string(),
                ));
            }
            return Err(GatewayError::RequestFailed(format!("{}: {}", status, body)));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::RequestFailed(format!("malformed response: {}", e)))?;

        if let Some(error) = parsed.error {
            return Err(GatewayError::RequestFailed(
                error.message.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| GatewayError::RequestFailed("empty completion".to_string()))
    }
}
