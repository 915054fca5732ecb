//! Console formatting for chat messages

use colored::Colorize;
use thinktank_domain::ChatMessage;

/// Formats chat messages for terminal display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// One message: colored speaker tag, text, and an optional dim
    /// confidence annotation.
    pub fn format_message(message: &ChatMessage) -> String {
        let speaker = if message.is_from_user() {
            format!("[{}]", message.speaker).cyan().bold()
        } else if message.text.starts_with('(') {
            format!("[{}]", message.speaker).red().bold()
        } else {
            format!("[{}]", message.speaker).green().bold()
        };

        match message.confidence {
            Some(confidence) => format!(
                "{} {} {}",
                speaker,
                message.text,
                format!("(confidence {:.2})", confidence).dimmed()
            ),
            None => format!("{} {}", speaker, message.text),
        }
    }

    /// A full turn's replies, one message per block
    pub fn format_replies(replies: &[ChatMessage]) -> String {
        replies
            .iter()
            .map(Self::format_message)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
