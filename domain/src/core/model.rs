//! Model value object representing an externally-hosted LLM

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Available LLM models (Value Object)
///
/// Identifiers follow the OpenRouter catalog convention of
/// `vendor/model-name`. Unknown identifiers are carried as `Custom` so a
/// user can address any model their account can reach.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    // Anthropic models
    ClaudeSonnet35,
    ClaudeHaiku3,
    // OpenAI models
    Gpt4o,
    Gpt4oMini,
    Gpt41,
    Gpt41Mini,
    // xAI models
    Grok4,
    // Custom
    Custom(String),
}

impl Model {
    /// Get the full catalog identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::ClaudeSonnet35 => "anthropic/claude-3.5-sonnet",
            Model::ClaudeHaiku3 => "anthropic/claude-3-haiku",
            Model::Gpt4o => "openai/gpt-4o",
            Model::Gpt4oMini => "openai/gpt-4o-mini",
            Model::Gpt41 => "openai/gpt-4.1",
            Model::Gpt41Mini => "openai/gpt-4.1-mini",
            Model::Grok4 => "x-ai/grok-4",
            Model::Custom(s) => s,
        }
    }

    /// Short display identifier: the last path segment of the catalog id.
    ///
    /// This is the speaker name used in chat threads, e.g.
    /// `"x-ai/grok-4"` → `"grok-4"`.
    pub fn short_name(&self) -> &str {
        let id = self.as_str();
        id.rsplit('/').next().unwrap_or(id)
    }

    /// Default participant set for a freshly created thread
    pub fn default_participants() -> Vec<Model> {
        vec![Model::Grok4, Model::ClaudeSonnet35, Model::Gpt4oMini]
    }

    /// Check if this is an Anthropic model
    pub fn is_claude(&self) -> bool {
        matches!(self, Model::ClaudeSonnet35 | Model::ClaudeHaiku3)
    }

    /// Check if this is an OpenAI model
    pub fn is_gpt(&self) -> bool {
        matches!(
            self,
            Model::Gpt4o | Model::Gpt4oMini | Model::Gpt41 | Model::Gpt41Mini
        )
    }

    /// Check if this is an xAI model
    pub fn is_grok(&self) -> bool {
        matches!(self, Model::Grok4)
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "anthropic/claude-3.5-sonnet" => Model::ClaudeSonnet35,
            "anthropic/claude-3-haiku" => Model::ClaudeHaiku3,
            "openai/gpt-4o" => Model::Gpt4o,
            "openai/gpt-4o-mini" => Model::Gpt4oMini,
            "openai/gpt-4.1" => Model::Gpt41,
            "openai/gpt-4.1-mini" => Model::Gpt41Mini,
            "x-ai/grok-4" => Model::Grok4,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap())
    }
}
