//! CoinCap provider (`/assets?search=`).
//!
//! Returns names and USD prices; no launch or consensus data.

use async_trait::async_trait;
use coinclaw_core::error::ProviderError;
use coinclaw_core::provider::{FactProvider, ProviderFacts};
use serde::Deserialize;
use std::time::Duration;

use crate::http::{build_client, get_json, listing_matches, parse_price};

pub const DEFAULT_BASE_URL: &str = "https://api.coincap.io/v2";

pub struct CoinCapProvider {
    base_url: String,
    client: reqwest::Client,
}

impl CoinCapProvider {
    pub fn new(base_url: impl Into<String>, user_agent: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: build_client(user_agent, timeout),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AssetsResponse {
    #[serde(default)]
    data: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Asset {
    symbol: String,
    name: String,
    price_usd: Option<String>,
}

#[async_trait]
impl FactProvider for CoinCapProvider {
    fn name(&self) -> &str {
        "coincap"
    }

    async fn fetch(&self, symbol: &str) -> Result<ProviderFacts, ProviderError> {
        let assets: AssetsResponse = get_json(
            &self.client,
            self.name(),
            &format!("{}/assets", self.base_url),
            &[("search", symbol), ("limit", "10")],
        )
        .await?;

        let asset = assets
            .data
            .iter()
            .find(|a| a.symbol.eq_ignore_ascii_case(symbol))
            .or_else(|| {
                assets
                    .data
                    .iter()
                    .find(|a| listing_matches(&a.symbol, &a.name, symbol))
            })
            .ok_or_else(|| ProviderError::NotListed {
                provider: self.name().into(),
                symbol: symbol.into(),
            })?;

        let raw_price = asset
            .price_usd
            .as_deref()
            .ok_or_else(|| ProviderError::MalformedResponse {
                provider: self.name().into(),
                reason: format!("no priceUsd for '{}'", asset.symbol),
            })?;
        let price = parse_price(self.name(), raw_price)?;

        Ok(ProviderFacts::priced(&asset.name, asset.symbol.to_uppercase(), price))
    }

    /// CoinCap has no ping route; a one-asset listing stands in.
    async fn health_check(&self) -> Result<bool, ProviderError> {
        let response = self
            .client
            .get(format!("{}/assets", self.base_url))
            .query(&[("limit", "1")])
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(response.status().is_success())
    }
}
