//! Build the provider chain from configuration.

use std::sync::Arc;
use std::time::Duration;

use coinclaw_config::ProvidersConfig;
use coinclaw_core::provider::FactProvider;
use tracing::{debug, warn};

use crate::binance::{self, BinanceProvider};
use crate::chain::{ConsensusFill, ProviderChain};
use crate::coincap::{self, CoinCapProvider};
use crate::coingecko::{self, CoinGeckoProvider};

/// Construct a single provider by name, honoring any `api_url` override.
pub fn build_provider(config: &ProvidersConfig, name: &str) -> Option<Arc<dyn FactProvider>> {
    let endpoint = config.endpoint(name);
    let timeout = Duration::from_secs(config.timeout_secs(name));
    let user_agent = config.user_agent.as_str();

    let provider: Arc<dyn FactProvider> = match name {
        "coingecko" => Arc::new(CoinGeckoProvider::new(
            endpoint.api_url.unwrap_or_else(|| coingecko::DEFAULT_BASE_URL.into()),
            user_agent,
            timeout,
        )),
        "coincap" => Arc::new(CoinCapProvider::new(
            endpoint.api_url.unwrap_or_else(|| coincap::DEFAULT_BASE_URL.into()),
            user_agent,
            timeout,
        )),
        "binance" => Arc::new(BinanceProvider::new(
            endpoint.api_url.unwrap_or_else(|| binance::DEFAULT_BASE_URL.into()),
            user_agent,
            timeout,
        )),
        other => {
            warn!(provider = %other, "Unknown provider in config, skipping");
            return None;
        }
    };

    Some(provider)
}

/// Build the fallback chain in configured order, skipping disabled providers.
pub fn build_chain(config: &ProvidersConfig) -> ProviderChain {
    let mut chain = ProviderChain::new().with_pow_symbols(config.pow_symbols.iter().cloned());

    for name in config.enabled_order() {
        let Some(provider) = build_provider(config, name) else {
            continue;
        };

        let fill = if config.estimates_consensus(name) {
            ConsensusFill::PowHeuristic
        } else {
            ConsensusFill::Unknown
        };

        // The chain's own deadline sits just above the client timeout so the
        // client reports the timeout first.
        let timeout = Duration::from_secs(config.timeout_secs(name)) + Duration::from_millis(500);

        debug!(provider = %name, timeout_ms = timeout.as_millis() as u64, ?fill, "Adding provider to chain");
        chain = chain.add(provider, timeout, fill);
    }

    chain
}
