//! Provider chain: ordered fallback over price providers with per-provider
//! timeouts.
//!
//! Each provider is tried exactly once, in order. Any failure (network,
//! non-2xx, malformed body, unlisted symbol, timeout) moves on to the next
//! provider. When every provider fails the chain reports absence; provider
//! errors never escape it.
//!
//! Providers rarely know launch years or consensus mechanisms. The chain
//! fills those gaps and marks them as estimated on the returned facts.

use chrono::Utc;
use coinclaw_config::DEFAULT_POW_SYMBOLS;
use coinclaw_core::error::ProviderError;
use coinclaw_core::provider::{FactProvider, ProviderFacts};
use coinclaw_core::record::{EstimatedFields, FetchedFacts};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Filled in when a provider has no consensus data and no heuristic applies.
pub const UNKNOWN_CONSENSUS: &str = "Unknown";
pub const PROOF_OF_WORK: &str = "Proof of Work";
pub const PROOF_OF_STAKE: &str = "Proof of Stake";

/// How the chain fills a missing consensus mechanism for a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsensusFill {
    /// Report "Unknown"
    Unknown,
    /// Guess from PoW-set membership
    PowHeuristic,
}

/// An ordered list of providers that falls back on failure.
pub struct ProviderChain {
    chain: Vec<ChainEntry>,
    pow_symbols: Vec<String>,
}

/// A single entry in the chain.
struct ChainEntry {
    provider: Arc<dyn FactProvider>,
    timeout: Duration,
    consensus_fill: ConsensusFill,
}

impl ProviderChain {
    /// Create an empty chain with the default PoW set.
    pub fn new() -> Self {
        Self {
            chain: Vec::new(),
            pow_symbols: DEFAULT_POW_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the symbols the PoW heuristic treats as Proof of Work.
    pub fn with_pow_symbols(mut self, symbols: impl IntoIterator<Item = String>) -> Self {
        self.pow_symbols = symbols.into_iter().map(|s| s.to_uppercase()).collect();
        self
    }

    /// Add a provider with a custom timeout.
    pub fn add(
        mut self,
        provider: Arc<dyn FactProvider>,
        timeout: Duration,
        consensus_fill: ConsensusFill,
    ) -> Self {
        self.chain.push(ChainEntry {
            provider,
            timeout,
            consensus_fill,
        });
        self
    }

    /// Add a provider with the default timeout (5s) that reports unknown consensus.
    pub fn add_default(self, provider: Arc<dyn FactProvider>) -> Self {
        self.add(provider, Duration::from_secs(5), ConsensusFill::Unknown)
    }

    /// Number of providers in the chain.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Provider names in fallback order.
    pub fn names(&self) -> Vec<&str> {
        self.chain.iter().map(|e| e.provider.name()).collect()
    }

    /// Static consensus guess from PoW-set membership. Not authoritative.
    pub fn estimate_consensus(&self, symbol: &str) -> &'static str {
        if self.pow_symbols.iter().any(|s| s.eq_ignore_ascii_case(symbol)) {
            PROOF_OF_WORK
        } else {
            PROOF_OF_STAKE
        }
    }

    /// Fetch current facts for a symbol (or coin name) from the first provider
    /// that answers. `None` when every provider fails.
    pub async fn fetch_facts(&self, symbol: &str) -> Option<FetchedFacts> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return None;
        }

        for (i, entry) in self.chain.iter().enumerate() {
            let provider_name = entry.provider.name();

            info!(
                provider = %provider_name,
                symbol = %symbol,
                attempt = i + 1,
                total = self.chain.len(),
                "Fallback: trying provider"
            );

            match tokio::time::timeout(entry.timeout, entry.provider.fetch(symbol)).await {
                Ok(Ok(facts)) => {
                    info!(provider = %provider_name, symbol = %facts.symbol, "Fetched coin facts");
                    return Some(self.complete(facts, entry.consensus_fill));
                }
                Ok(Err(e)) => {
                    warn!(
                        provider = %provider_name,
                        error = %e,
                        "Fallback: provider failed, trying next"
                    );
                }
                Err(_) => {
                    let e = ProviderError::Timeout(format!(
                        "Provider '{}' timed out after {}ms",
                        provider_name,
                        entry.timeout.as_millis()
                    ));
                    warn!(provider = %provider_name, error = %e, "Fallback: provider timed out, trying next");
                }
            }
        }

        warn!(symbol = %symbol, "All providers failed");
        None
    }

    /// True if any provider reports healthy.
    pub async fn health_check(&self) -> bool {
        for entry in &self.chain {
            if let Ok(Ok(true)) = tokio::time::timeout(entry.timeout, entry.provider.health_check()).await {
                return true;
            }
        }
        false
    }

    /// Fill missing static facts and stamp the fetch time.
    fn complete(&self, facts: ProviderFacts, fill: ConsensusFill) -> FetchedFacts {
        let symbol = facts.symbol.trim().to_uppercase();
        let mut estimated = EstimatedFields::default();

        let launch_year = facts.launch_year.unwrap_or_else(|| {
            estimated.launch_year = true;
            0
        });

        let consensus_mechanism = match facts.consensus_mechanism {
            Some(consensus) if !consensus.trim().is_empty() => consensus,
            _ => {
                estimated.consensus_mechanism = true;
                match fill {
                    ConsensusFill::Unknown => UNKNOWN_CONSENSUS.to_string(),
                    ConsensusFill::PowHeuristic => self.estimate_consensus(&symbol).to_string(),
                }
            }
        };

        FetchedFacts {
            display_name: facts.display_name,
            symbol,
            launch_year,
            consensus_mechanism,
            last_price: Some(facts.last_price),
            observed_at: Utc::now(),
            estimated,
        }
    }
}

impl Default for ProviderChain {
    fn default() -> Self {
        Self::new()
    }
}
