//! Shared HTTP plumbing for the price providers.

use coinclaw_core::error::ProviderError;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Build a client with the given user agent and per-request timeout.
pub(crate) fn build_client(user_agent: &str, timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(user_agent.to_string())
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to a default HTTP client");
            reqwest::Client::new()
        })
}

/// GET `url` with `query` and decode a JSON body.
///
/// Non-2xx statuses become `ApiError`, transport failures `Network` or
/// `Timeout`, and undecodable bodies `MalformedResponse`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    provider: &str,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, ProviderError> {
    debug!(provider, url, "Sending price request");

    let response = client.get(url).query(query).send().await.map_err(|e| {
        if e.is_timeout() {
            ProviderError::Timeout(format!("{provider}: {e}"))
        } else {
            ProviderError::Network(e.to_string())
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::ApiError {
            status_code: status.as_u16(),
            message: body.chars().take(200).collect(),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::MalformedResponse {
            provider: provider.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a decimal price sent as a JSON string (CoinCap, Binance).
pub(crate) fn parse_price(provider: &str, raw: &str) -> Result<f64, ProviderError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .ok_or_else(|| ProviderError::MalformedResponse {
            provider: provider.to_string(),
            reason: format!("price '{raw}' is not a number"),
        })
}

/// True when the listing's symbol or name is the candidate the user typed.
pub(crate) fn listing_matches(symbol: &str, name: &str, candidate: &str) -> bool {
    symbol.eq_ignore_ascii_case(candidate) || name.to_lowercase() == candidate.to_lowercase()
}
