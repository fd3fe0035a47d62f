//! Display-side transcript filtering.

use agent_contract::Message;

/// Messages whose content contains `query`, ignoring case.
///
/// A blank query matches every message. Surrounding whitespace in a non-blank
/// query is part of the match. The transcript itself is never changed.
pub fn search_messages<'a>(messages: &'a [Message], query: &str) -> Vec<&'a Message> {
    if query.trim().is_empty() {
        return messages.iter().collect();
    }

    let needle = query.to_lowercase();

    messages
        .iter()
        .filter(|message| message.content.to_lowercase().contains(&needle))
        .collect()
}
