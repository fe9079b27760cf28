//! Price provider implementations for CoinClaw.
//!
//! All providers implement the `coinclaw_core::FactProvider` trait.
//! The chain tries them in configured order and fills in what they don't know.

pub mod binance;
pub mod builder;
pub mod chain;
pub mod coincap;
pub mod coingecko;
mod http;

pub use binance::BinanceProvider;
pub use builder::{build_chain, build_provider};
pub use chain::{ConsensusFill, ProviderChain};
pub use coincap::CoinCapProvider;
pub use coingecko::CoinGeckoProvider;
