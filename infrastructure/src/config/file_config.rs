//! Configuration file schema

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thinktank_domain::ScoreWeights;

use crate::providers::openrouter::{OpenRouterConfig, OPENROUTER_BASE_URL};

/// Root configuration loaded from `thinktank.toml` and the environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub gateway: GatewayConfig,
    pub chat: ChatConfig,
    pub cache: CacheConfig,
    pub scoring: ScoreWeights,
}

/// `[gateway]` section: OpenRouter connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub base_url: String,
    /// Falls back to the `OPENROUTER_API_KEY` environment variable
    pub api_key: Option<String>,
    pub app_url: Option<String>,
    pub app_name: String,
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: OPENROUTER_BASE_URL.to_string(),
            api_key: None,
            app_url: None,
            app_name: "ThinkTank".to_string(),
            timeout_secs: 120,
        }
    }
}

impl GatewayConfig {
    /// Resolve the API key from config or environment
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENROUTER_API_KEY").ok())
    }

    /// Build adapter settings for a resolved key
    pub fn to_openrouter(&self, api_key: String) -> OpenRouterConfig {
        OpenRouterConfig {
            api_key,
            base_url: self.base_url.clone(),
            app_url: self.app_url.clone(),
            app_name: Some(self.app_name.clone()),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// `[chat]` section: turn defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Default mode identifier; unknown values fail open to balanced
    pub mode: String,
    /// Participant override applied to new sessions (catalog ids)
    pub participants: Vec<String>,
    /// Whether council turns run the debate round
    pub debate: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            mode: "balanced".to_string(),
            participants: Vec::new(),
            debate: true,
        }
    }
}

/// `[cache]` section: response cache sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_entries: 1024 }
    }
}
