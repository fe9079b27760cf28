//! Conversation memory: a bounded log of recent queries plus the last coin
//! the session talked about.
//!
//! One [`ConversationMemory`] per session. It is never persisted; dropping it
//! (or calling [`ConversationMemory::reset`]) forgets the conversation.

use std::collections::VecDeque;

/// Single-word markers that point back at the previously discussed coin.
const ANAPHORIC_WORDS: &[&str] = &["it", "its", "this"];

/// Multi-word marker, matched as a substring.
const ANAPHORIC_PHRASE: &str = "the coin";

/// Per-session conversation state.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    history: VecDeque<String>,
    limit: usize,
    last_entity: Option<String>,
}

impl ConversationMemory {
    /// Create an empty memory holding at most `limit` turns (minimum 1).
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            history: VecDeque::with_capacity(limit),
            limit,
            last_entity: None,
        }
    }

    /// Append a raw query, evicting the oldest turn when full.
    pub fn record_turn(&mut self, query: &str) {
        if self.history.len() == self.limit {
            self.history.pop_front();
        }
        self.history.push_back(query.to_string());
    }

    pub fn set_last_entity(&mut self, symbol: &str) {
        self.last_entity = Some(symbol.to_string());
    }

    pub fn last_entity(&self) -> Option<&str> {
        self.last_entity.as_deref()
    }

    /// Whether the query refers back to an earlier coin ("it", "its", "this",
    /// "the coin").
    ///
    /// Single words are matched as whole words so "bitcoin" or "with" do not
    /// count as a reference.
    pub fn is_follow_up(&self, query: &str) -> bool {
        let lowered = query.to_lowercase();
        lowered.contains(ANAPHORIC_PHRASE)
            || lowered
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| ANAPHORIC_WORDS.contains(&word))
    }

    /// Logged turns, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Forget every turn and the last entity.
    pub fn reset(&mut self) {
        self.history.clear();
        self.last_entity = None;
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(10)
    }
}
