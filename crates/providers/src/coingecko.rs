//! CoinGecko provider.
//!
//! Widest coverage of small caps. Prices need a CoinGecko coin id, so every
//! lookup is two calls: `/search` to find the id, then `/simple/price`.

use async_trait::async_trait;
use coinclaw_core::error::ProviderError;
use coinclaw_core::provider::{FactProvider, ProviderFacts};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::http::{build_client, get_json, listing_matches};

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

pub struct CoinGeckoProvider {
    base_url: String,
    client: reqwest::Client,
}

impl CoinGeckoProvider {
    pub fn new(base_url: impl Into<String>, user_agent: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: build_client(user_agent, timeout),
        }
    }

    /// Exact symbol matches are preferred over name matches.
    fn pick<'a>(coins: &'a [SearchCoin], candidate: &str) -> Option<&'a SearchCoin> {
        coins
            .iter()
            .find(|c| c.symbol.eq_ignore_ascii_case(candidate))
            .or_else(|| {
                coins
                    .iter()
                    .find(|c| listing_matches(&c.symbol, &c.name, candidate))
            })
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    coins: Vec<SearchCoin>,
}

#[derive(Debug, Deserialize)]
struct SearchCoin {
    id: String,
    symbol: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct SimplePrice {
    usd: Option<f64>,
}

#[async_trait]
impl FactProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        "coingecko"
    }

    async fn fetch(&self, symbol: &str) -> Result<ProviderFacts, ProviderError> {
        let search: SearchResponse = get_json(
            &self.client,
            self.name(),
            &format!("{}/search", self.base_url),
            &[("query", symbol)],
        )
        .await?;

        let coin = Self::pick(&search.coins, symbol).ok_or_else(|| ProviderError::NotListed {
            provider: self.name().into(),
            symbol: symbol.into(),
        })?;

        let prices: HashMap<String, SimplePrice> = get_json(
            &self.client,
            self.name(),
            &format!("{}/simple/price", self.base_url),
            &[
                ("ids", coin.id.as_str()),
                ("vs_currencies", "usd"),
                ("include_last_updated_at", "true"),
            ],
        )
        .await?;

        let price = prices
            .get(&coin.id)
            .and_then(|p| p.usd)
            .ok_or_else(|| ProviderError::MalformedResponse {
                provider: self.name().into(),
                reason: format!("no USD price for '{}'", coin.id),
            })?;

        Ok(ProviderFacts::priced(&coin.name, coin.symbol.to_uppercase(), price))
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        let response = self
            .client
            .get(format!("{}/ping", self.base_url))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(response.status().is_success())
    }
}
