//! Mention filtering: narrow a participant list when the user's message
//! addresses specific models by name, alias, or `@token`.

use crate::core::model::Model;

/// Alias groups: each key maps to the literal substrings that count as a
/// mention of that model family.
const MENTION_ALIASES: &[(&str, &[&str])] = &[
    ("grok", &["grok", "grok-4"]),
    ("claude", &["claude", "sonnet", "haiku"]),
    ("gpt4o", &["gpt-4o", "gpt-4o-mini"]),
    ("gpt41", &["gpt-4.1", "gpt-4.1-mini"]),
    ("gpt", &["gpt"]),
];

/// Characters allowed inside a mention token
fn is_token_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '_' | '.' | '-')
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !is_token_char(c))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Alias terms matched by the text: the union of the alias values of
/// every group with at least one hit (token match or raw substring).
fn extract_alias_terms(text: &str) -> Vec<&'static str> {
    let lowered = text.to_lowercase();
    let tokens = tokenize(text);

    let mut terms = Vec::new();
    for (_, aliases) in MENTION_ALIASES {
        let hit = aliases
            .iter()
            .any(|a| tokens.iter().any(|t| t == a) || lowered.contains(a));
        if hit {
            for alias in *aliases {
                if !terms.contains(alias) {
                    terms.push(*alias);
                }
            }
        }
    }
    terms
}

/// `@token` extraction: `@` followed by identifier characters
fn extract_at_tokens(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for (i, c) in text.char_indices() {
        if c != '@' {
            continue;
        }
        let rest = &text[i + c.len_utf8()..];
        let token: String = rest
            .chars()
            .take_while(|&c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();
        if !token.is_empty() {
            out.push(token);
        }
    }
    out
}

/// Narrow `participants` to the models the user's text addresses.
///
/// Search terms are the union of matched alias groups and `@tokens`,
/// matched case-insensitively as substrings of each participant's short
/// identifier. Two guarantees hold:
///
/// - No search terms → the list is returned unchanged (no filtering
///   intended).
/// - Terms that match nothing → the list is returned unchanged; a failed
///   or overly narrow mention never silently addresses zero participants.
pub fn filter_by_mentions(text: &str, participants: &[Model]) -> Vec<Model> {
    let mut search_terms: Vec<String> = extract_alias_terms(text)
        .into_iter()
        .map(str::to_string)
        .collect();
    for token in extract_at_tokens(text) {
        if !search_terms.contains(&token) {
            search_terms.push(token);
        }
    }

    if search_terms.is_empty() {
        return participants.to_vec();
    }

    let filtered: Vec<Model> = participants
        .iter()
        .filter(|model| {
            let short = model.short_name().to_lowercase();
            search_terms.iter().any(|term| short.contains(term))
        })
        .cloned()
        .collect();

    if filtered.is_empty() {
        participants.to_vec()
    } else {
        filtered
    }
}
