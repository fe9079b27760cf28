//! # CoinClaw Core
//!
//! Domain types, traits, and error definitions for the CoinClaw crypto fact
//! assistant. This crate has **zero framework dependencies**: it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator of the query pipeline is defined as a trait here.
//! Implementations live in their respective crates:
//! - [`FactStore`] is implemented by `coinclaw-store` (in-memory, JSON file)
//! - [`FactProvider`] is implemented by `coinclaw-providers` (CoinGecko, CoinCap, Binance)
//!
//! The orchestrator in `coinclaw-agent` only sees these traits, so tests swap in
//! scripted providers and in-memory stores.

pub mod answer;
pub mod error;
pub mod provider;
pub mod record;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use answer::{AgentAnswer, Provenance};
pub use error::{ProviderError, Rejection, StoreError};
pub use provider::{FactProvider, ProviderFacts};
pub use record::{CoinRecord, EstimatedFields, FetchedFacts, TIMESTAMP_FORMAT};
pub use store::FactStore;
