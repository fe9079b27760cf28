//! FactProvider trait: the abstraction over external price feeds.
//!
//! A provider knows how to look up one symbol on one public API and return
//! whatever that API knows about it. Providers differ in richness: most only
//! know a name and a price. Filling the gaps is the provider chain's job,
//! not the provider's.
//!
//! Implementations: CoinGecko, CoinCap, Binance.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// What a single provider returned for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderFacts {
    pub display_name: String,
    pub symbol: String,
    pub last_price: f64,

    /// Only some providers know when a coin launched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_year: Option<i32>,

    /// Only some providers know the consensus mechanism
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consensus_mechanism: Option<String>,
}

impl ProviderFacts {
    /// Facts with just a name and a price, the common case.
    pub fn priced(display_name: impl Into<String>, symbol: impl Into<String>, last_price: f64) -> Self {
        Self {
            display_name: display_name.into(),
            symbol: symbol.into(),
            last_price,
            launch_year: None,
            consensus_mechanism: None,
        }
    }
}

/// The core FactProvider trait.
///
/// The provider chain calls `fetch()` without knowing which backend answers.
#[async_trait]
pub trait FactProvider: Send + Sync {
    /// A short, stable name (e.g. "coingecko").
    fn name(&self) -> &str;

    /// Look up current facts for a symbol or coin name.
    async fn fetch(&self, symbol: &str) -> std::result::Result<ProviderFacts, ProviderError>;

    /// Health check: can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}
