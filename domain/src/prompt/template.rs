//! Prompt templates for group chat replies and the debate round

/// Templates for generating prompts at each stage of a turn
pub struct ChatPromptTemplate;

impl ChatPromptTemplate {
    /// System prompt shared by every participant reply
    pub fn group_chat_system() -> &'static str {
        "You are an AI participant in a multi-agent group chat. \
         Be concise (max 5 lines), additive, and practical. \
         If you disagree, add a short counterpoint."
    }

    /// User prompt for a participant reply.
    ///
    /// `reference` is the opaque excerpt string from the document
    /// collaborator; when empty, the reference section is omitted.
    pub fn reply_prompt(context: &str, reference: &str) -> String {
        if reference.is_empty() {
            format!("Thread so far:\n{}\n\nYour reply:", context)
        } else {
            format!(
                "Thread so far:\n{}\n\nReference docs:\n{}\n\nYour reply:",
                context, reference
            )
        }
    }

    /// System prompt for a debate reaction
    pub fn debate_system() -> &'static str {
        "You are participating in a short round-table debate. \
         Provide a succinct (<= 4 lines) reaction that adds a new angle, \
         clarifies a trade-off, or corrects a mistake. \
         Be respectful and concrete."
    }

    /// User prompt for one speaker's debate reaction.
    ///
    /// `context` is the most recent user message plus all of this round's
    /// replies, one `[speaker] text` line each.
    pub fn debate_prompt(context: &str, speaker: &str) -> String {
        format!(
            "Topic and replies so far:\n{}\n\nYour short reaction as {}:",
            context, speaker
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_prompt_without_reference() {
        let prompt = ChatPromptTemplate::reply_prompt("[user] hi", "");
        assert!(prompt.contains("[user] hi"));
        assert!(!prompt.contains("Reference docs"));
        assert!(prompt.ends_with("Your reply:"));
    }

    #[test]
    fn test_reply_prompt_with_reference() {
        let prompt = ChatPromptTemplate::reply_prompt("[user] hi", "# notes\nchunk");
        assert!(prompt.contains("Reference docs:\n# notes\nchunk"));
    }

    #[test]
    fn test_debate_prompt_addresses_speaker() {
        let prompt = ChatPromptTemplate::debate_prompt("[user] topic", "grok-4");
        assert!(prompt.contains("[user] topic"));
        assert!(prompt.ends_with("Your short reaction as grok-4:"));
    }
}
