//! Chat thread entities

use crate::core::model::Model;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Speaker name reserved for the human participant
pub const USER_SPEAKER: &str = "user";

/// Upper bound on a thread's participant set
pub const MAX_PARTICIPANTS: usize = 4;

/// A message in a chat thread (Entity)
///
/// Immutable once created; appended to a thread's ordered log and never
/// mutated afterwards. `confidence` is set once at creation for model
/// replies and absent for user messages and error placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    /// `"user"` or a model's short identifier
    pub speaker: String,
    pub text: String,
    pub ts: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl ChatMessage {
    fn new(speaker: impl Into<String>, text: impl Into<String>, confidence: Option<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            speaker: speaker.into(),
            text: text.into(),
            ts: Utc::now(),
            confidence,
        }
    }

    /// A message typed by the human participant
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(USER_SPEAKER, text, None)
    }

    /// A successful model reply with its heuristic confidence score
    pub fn reply(speaker: impl Into<String>, text: impl Into<String>, confidence: f32) -> Self {
        Self::new(speaker, text, Some(confidence))
    }

    /// Inline placeholder for a failed generation branch.
    ///
    /// Treated identically to a successful reply downstream: stored,
    /// displayed, and counted toward confidence averaging.
    pub fn transport_error(speaker: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        let speaker = speaker.into();
        let text = format!("(error from {}: {})", speaker, detail);
        Self::new(speaker, text, None)
    }

    /// Inline placeholder for a failed debate reaction
    pub fn debate_error(speaker: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        let speaker = speaker.into();
        let text = format!("(debate error from {}: {})", speaker, detail);
        Self::new(speaker, text, None)
    }

    pub fn is_from_user(&self) -> bool {
        self.speaker == USER_SPEAKER
    }

    /// Render this message as one line of conversation context
    pub fn context_line(&self) -> String {
        format!("[{}] {}", self.speaker, self.text)
    }
}

/// A chat thread (Entity)
///
/// Holds the append-only message log and the participant set. The
/// participant set is mutated wholesale via [`Thread::set_participants`]
/// and is independent of the message history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub title: String,
    pub participants: Vec<Model>,
    pub messages: Vec<ChatMessage>,
}

impl Thread {
    /// Create a thread with the default participant selection
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: "New Thread".to_string(),
            participants: Model::default_participants(),
            messages: Vec::new(),
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Replace the participant set, sanitized
    pub fn set_participants(&mut self, participants: Vec<Model>) {
        self.participants = Self::sanitize_participants(participants);
    }

    /// Enforce the participant invariants: duplicates removed (first
    /// occurrence wins), the literal `"user"` excluded, at most
    /// [`MAX_PARTICIPANTS`] entries.
    pub fn sanitize_participants(participants: Vec<Model>) -> Vec<Model> {
        let mut unique: Vec<Model> = Vec::new();
        for model in participants {
            if model.as_str() == USER_SPEAKER {
                continue;
            }
            if !unique.contains(&model) {
                unique.push(model);
            }
            if unique.len() == MAX_PARTICIPANTS {
                break;
            }
        }
        unique
    }

    /// Serialize the full history as `[speaker] text` lines in
    /// chronological order
    pub fn context(&self) -> String {
        self.messages
            .iter()
            .map(ChatMessage::context_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Text of the most recent user message, if any
    pub fn last_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.is_from_user())
            .map(|m| m.text.as_str())
    }
}
