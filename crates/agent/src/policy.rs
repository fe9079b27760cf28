//! Intent policy: refuse predictions and investment advice.
//!
//! Matching is a case-insensitive substring test, so "predictions" and
//! "buying" are caught along with the bare keywords.

use coinclaw_config::DEFAULT_DISALLOWED_KEYWORDS;
use tracing::info;

#[derive(Debug, Clone)]
pub struct IntentPolicy {
    keywords: Vec<String>,
}

impl IntentPolicy {
    pub fn new(keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// The first disallowed keyword found in the query, if any.
    pub fn violation(&self, query: &str) -> Option<&str> {
        let lowered = query.to_lowercase();
        let hit = self
            .keywords
            .iter()
            .find(|k| lowered.contains(k.as_str()))
            .map(String::as_str);
        if let Some(keyword) = hit {
            info!(keyword, "Query rejected by intent policy");
        }
        hit
    }

    pub fn is_allowed(&self, query: &str) -> bool {
        self.violation(query).is_none()
    }
}

impl Default for IntentPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_DISALLOWED_KEYWORDS.iter().copied())
    }
}
