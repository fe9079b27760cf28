//! Binance spot ticker provider.
//!
//! Last resort: only knows the `{SYMBOL}USDT` pair price, so the display
//! name is the ticker itself.

use async_trait::async_trait;
use coinclaw_core::error::ProviderError;
use coinclaw_core::provider::{FactProvider, ProviderFacts};
use serde::Deserialize;
use std::time::Duration;

use crate::http::{build_client, get_json, parse_price};

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com/api/v3";

pub struct BinanceProvider {
    base_url: String,
    client: reqwest::Client,
}

impl BinanceProvider {
    pub fn new(base_url: impl Into<String>, user_agent: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: build_client(user_agent, timeout),
        }
    }

    fn pair(symbol: &str) -> String {
        format!("{}USDT", symbol.trim().to_uppercase())
    }
}

#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}

#[async_trait]
impl FactProvider for BinanceProvider {
    fn name(&self) -> &str {
        "binance"
    }

    async fn fetch(&self, symbol: &str) -> Result<ProviderFacts, ProviderError> {
        let pair = Self::pair(symbol);
        let ticker: TickerPrice = get_json(
            &self.client,
            self.name(),
            &format!("{}/ticker/price", self.base_url),
            &[("symbol", pair.as_str())],
        )
        .await?;

        let price = parse_price(self.name(), &ticker.price)?;
        let ticker_symbol = symbol.trim().to_uppercase();
        Ok(ProviderFacts::priced(&ticker_symbol, &ticker_symbol, price))
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
