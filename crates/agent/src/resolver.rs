//! Entity resolution: pull a coin identifier out of free text.
//!
//! Three stages, first success wins:
//!
//! 1. **Store match**: each whitespace token, stripped to letters, looked up
//!    in the fact store. Yields the store's canonical symbol.
//! 2. **Phrase patterns**: "price of X", "value of X", "about X",
//!    "tell me about X", "how much is X". Yields the first word of the capture
//!    after dropping "today", "now" and "right now". Not checked against the
//!    store.
//! 3. **Capitalization scan**: the first letters-only token of two or more
//!    characters that is capitalized or all caps and not a stop word.
//!
//! If all three miss, the caller-supplied fallback (the session's last coin
//! for follow-up queries) is returned.

use coinclaw_core::store::FactStore;
use regex_lite::Regex;
use std::sync::Arc;
use tracing::{debug, warn};

const PHRASE_PATTERNS: &[&str] = &[
    r"(?i)price of\s+([a-z\s]+)",
    r"(?i)value of\s+([a-z\s]+)",
    r"(?i)about\s+([a-z\s]+)",
    r"(?i)tell me about\s+([a-z\s]+)",
    r"(?i)how much is\s+([a-z\s]+)",
];

const FILLER_PATTERN: &str = r"(?i)\b(today|now|right now)\b";

/// Words never taken as a coin by the capitalization scan: interrogatives,
/// auxiliaries, imperative lead-ins, articles, pronouns and generic nouns.
const STOP_WORDS: &[&str] = &[
    "WHO", "WHAT", "WHATS", "WHERE", "WHEN", "WHY", "HOW", "WHICH", "IS", "ARE", "WAS", "WERE",
    "DO", "DOES", "DID", "CAN", "COULD", "TELL", "GIVE", "SHOW", "ME", "PLEASE", "AND", "IT",
    "ITS", "THIS", "THAT", "THE", "A", "AN", "PRICE", "VALUE", "OF",
];

/// Phrase captures that point back at the conversation rather than name a coin.
const REFERENCE_WORDS: &[&str] = &["IT", "ITS", "THIS", "THAT", "THE"];

/// Which stage produced a candidate. Logged for debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStage {
    Store,
    Phrase,
    Capitalization,
    Fallback,
}

pub struct EntityResolver {
    store: Arc<dyn FactStore>,
    phrases: Vec<Regex>,
    filler: Option<Regex>,
}

impl EntityResolver {
    pub fn new(store: Arc<dyn FactStore>) -> Self {
        Self {
            store,
            phrases: PHRASE_PATTERNS
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
            filler: Regex::new(FILLER_PATTERN).ok(),
        }
    }

    /// Resolve a coin symbol or name candidate from `query`.
    pub async fn resolve(&self, query: &str, fallback_entity: Option<&str>) -> Option<String> {
        self.resolve_with_stage(query, fallback_entity)
            .await
            .map(|(candidate, _)| candidate)
    }

    /// Like [`resolve`](Self::resolve), also reporting which stage matched.
    pub async fn resolve_with_stage(
        &self,
        query: &str,
        fallback_entity: Option<&str>,
    ) -> Option<(String, ResolutionStage)> {
        let resolved = if let Some(symbol) = self.match_store(query).await {
            Some((symbol, ResolutionStage::Store))
        } else if let Some(candidate) = self.match_phrase(query) {
            Some((candidate, ResolutionStage::Phrase))
        } else if let Some(candidate) = scan_capitalized(query) {
            Some((candidate, ResolutionStage::Capitalization))
        } else {
            fallback_entity
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(|e| (e.to_string(), ResolutionStage::Fallback))
        };

        if let Some((candidate, stage)) = &resolved {
            debug!(candidate = %candidate, ?stage, "Entity resolved");
        }
        resolved
    }

    async fn match_store(&self, query: &str) -> Option<String> {
        for token in query.split_whitespace() {
            let cleaned = letters_only(token);
            if cleaned.is_empty() {
                continue;
            }
            match self.store.get(&cleaned).await {
                Ok(Some(record)) => return Some(record.symbol),
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, token = %cleaned, "Store lookup failed during entity resolution");
                }
            }
        }
        None
    }

    fn match_phrase(&self, query: &str) -> Option<String> {
        for pattern in &self.phrases {
            let Some(capture) = pattern.captures(query).and_then(|c| c.get(1)) else {
                continue;
            };

            let stripped = match &self.filler {
                Some(filler) => filler.replace_all(capture.as_str(), "").into_owned(),
                None => capture.as_str().to_string(),
            };

            // Only the first matching template is consulted.
            return stripped
                .split_whitespace()
                .next()
                .filter(|word| !REFERENCE_WORDS.contains(&word.to_uppercase().as_str()))
                .map(str::to_string);
        }
        None
    }
}

/// Stage three: first capitalized or all-caps non-stop-word token.
fn scan_capitalized(query: &str) -> Option<String> {
    query.split_whitespace().find_map(|word| {
        let cleaned = letters_only(word);
        if cleaned.chars().count() < 2 || STOP_WORDS.contains(&cleaned.to_uppercase().as_str()) {
            return None;
        }

        let capitalized = word.chars().next().is_some_and(char::is_uppercase);
        let all_caps = cleaned.chars().all(char::is_uppercase);
        (capitalized || all_caps).then_some(cleaned)
    })
}

fn letters_only(token: &str) -> String {
    token.chars().filter(char::is_ascii_alphabetic).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinclaw_core::record::CoinRecord;
    use coinclaw_store::InMemoryStore;

    fn resolver_with(records: Vec<CoinRecord>) -> EntityResolver {
        EntityResolver::new(Arc::new(InMemoryStore::with_records(records)))
    }

    fn known_coins() -> Vec<CoinRecord> {
        vec![
            CoinRecord::new("Bitcoin", "BTC", 2009, "Proof of Work"),
            CoinRecord::new("Ethereum", "ETH", 2015, "Proof of Stake"),
        ]
    }

    #[tokio::test]
    async fn store_match_returns_canonical_symbol() {
        let resolver = resolver_with(known_coins());
        let (candidate, stage) = resolver
            .resolve_with_stage("how is bitcoin doing?", None)
            .await
            .unwrap();
        assert_eq!(candidate, "BTC");
        assert_eq!(stage, ResolutionStage::Store);
    }

    #[tokio::test]
    async fn store_match_strips_punctuation() {
        let resolver = resolver_with(known_coins());
        assert_eq!(resolver.resolve("Price of eth?", None).await.as_deref(), Some("ETH"));
    }

    #[tokio::test]
    async fn phrase_pattern_takes_first_word() {
        let resolver = resolver_with(vec![]);
        let (candidate, stage) = resolver
            .resolve_with_stage("what is the price of solana today", None)
            .await
            .unwrap();
        assert_eq!(candidate, "solana");
        assert_eq!(stage, ResolutionStage::Phrase);
    }

    #[tokio::test]
    async fn phrase_pattern_strips_filler() {
        let resolver = resolver_with(vec![]);
        assert_eq!(
            resolver.resolve("how much is right now dogecoin", None).await.as_deref(),
            Some("dogecoin")
        );
    }

    #[tokio::test]
    async fn tell_me_about() {
        let resolver = resolver_with(vec![]);
        assert_eq!(
            resolver.resolve("Tell me about Bitcoin", None).await.as_deref(),
            Some("Bitcoin")
        );
    }

    #[tokio::test]
    async fn capitalization_scan_skips_stop_words() {
        let resolver = resolver_with(vec![]);
        let (candidate, stage) = resolver
            .resolve_with_stage("What is SOL consensus", None)
            .await
            .unwrap();
        assert_eq!(candidate, "SOL");
        assert_eq!(stage, ResolutionStage::Capitalization);
    }

    #[tokio::test]
    async fn capitalization_scan_ignores_short_tokens() {
        let resolver = resolver_with(vec![]);
        assert!(resolver.resolve("is X up", None).await.is_none());
    }

    #[tokio::test]
    async fn fallback_used_only_when_all_stages_miss() {
        let resolver = resolver_with(vec![]);
        assert_eq!(
            resolver.resolve("what is its price?", Some("BTC")).await.as_deref(),
            Some("BTC")
        );
        // An explicit coin beats the fallback
        assert_eq!(
            resolver.resolve("and Cardano?", Some("BTC")).await.as_deref(),
            Some("Cardano")
        );
    }

    #[tokio::test]
    async fn sentence_lead_words_are_not_coins() {
        let resolver = resolver_with(vec![]);
        for query in [
            "Does it use proof of work?",
            "Tell me more about it",
            "Can you give its launch year?",
            "What's its price?",
            "Show me its consensus",
            "Which year did it launch?",
            "It launched when?",
        ] {
            assert_eq!(
                resolver.resolve(query, Some("BTC")).await.as_deref(),
                Some("BTC"),
                "query: {query}"
            );
        }
    }

    #[tokio::test]
    async fn pronoun_capture_falls_through() {
        let resolver = resolver_with(vec![]);
        assert_eq!(
            resolver.resolve("how much is it", Some("ETH")).await.as_deref(),
            Some("ETH")
        );
        assert!(resolver.resolve("tell me more about it", None).await.is_none());
    }

    #[tokio::test]
    async fn nothing_to_resolve() {
        let resolver = resolver_with(known_coins());
        assert!(resolver.resolve("what is the weather like", None).await.is_none());
        assert!(resolver.resolve("", None).await.is_none());
    }

    #[test]
    fn letters_only_drops_digits_and_punctuation() {
        assert_eq!(letters_only("$BTC,"), "BTC");
        assert_eq!(letters_only("2024"), "");
    }
}
