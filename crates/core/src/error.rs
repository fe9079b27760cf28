//! Error types for the CoinClaw domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum. [`Rejection`] is the
//! user-facing taxonomy: its `Display` output is the reason string shown to
//! the person asking.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures of a single price provider. The provider chain absorbs all of
/// these; they never reach the person asking.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Malformed response from {provider}: {reason}")]
    MalformedResponse { provider: String, reason: String },

    #[error("Symbol '{symbol}' not listed by {provider}")]
    NotListed { provider: String, symbol: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

/// Why a query was answered with a refusal instead of a fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// The query asks for a prediction or investment advice.
    #[error("Investment advice and predictions are not allowed.")]
    PolicyRejected,

    /// No coin could be extracted and there is no follow-up context.
    #[error("INSUFFICIENT DATA - Could not identify cryptocurrency.")]
    EntityUnresolved,

    /// Unknown to the store and every provider failed.
    #[error("INSUFFICIENT DATA - Not found in Knowledge Base or API")]
    NotFound,

    /// The coin is known but the requested fact is missing.
    #[error("INSUFFICIENT DATA - Data point not available.")]
    FieldUnavailable,
}
