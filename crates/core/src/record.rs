//! Coin fact records: the durable fact sheet and the provider payload that
//! refreshes it.
//!
//! A [`CoinRecord`] is keyed by its uppercase `symbol`. Lookups match either
//! the symbol or the display name, case-insensitively.
//!
//! The serialized field names (`coin`, `consensus`, `price_timestamp`) are the
//! on-disk interchange format and must not change.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wire format for `price_timestamp`: UTC, second precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Format an instant the way records store it.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp. `None` when it does not follow [`TIMESTAMP_FORMAT`].
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// The durable fact sheet for one cryptocurrency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinRecord {
    /// Human-readable name, e.g. "Bitcoin"
    #[serde(rename = "coin")]
    pub display_name: String,

    /// Canonical uppercase ticker; unique within a store
    pub symbol: String,

    /// Launch year; `0` means unknown
    pub launch_year: i32,

    /// e.g. "Proof of Work"
    #[serde(rename = "consensus")]
    pub consensus_mechanism: String,

    /// Last observed USD price
    #[serde(default)]
    pub last_price: Option<f64>,

    /// When `last_price` was observed, as written by [`format_timestamp`].
    ///
    /// Kept as text so a record with a mangled timestamp still loads; the
    /// staleness check treats an unparseable value as stale.
    #[serde(default, rename = "price_timestamp")]
    pub price_observed_at: Option<String>,
}

impl CoinRecord {
    /// Create a record with static facts only (no price yet).
    pub fn new(
        display_name: impl Into<String>,
        symbol: impl Into<String>,
        launch_year: i32,
        consensus_mechanism: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            symbol: normalize_symbol(&symbol.into()),
            launch_year,
            consensus_mechanism: consensus_mechanism.into(),
            last_price: None,
            price_observed_at: None,
        }
    }

    /// Attach a price observation.
    pub fn with_price(mut self, price: f64, observed_at: DateTime<Utc>) -> Self {
        self.last_price = Some(price);
        self.price_observed_at = Some(format_timestamp(observed_at));
        self
    }

    /// Build a fresh record from a provider payload, estimates included.
    pub fn from_fetched(facts: &FetchedFacts) -> Self {
        Self {
            display_name: facts.display_name.clone(),
            symbol: normalize_symbol(&facts.symbol),
            launch_year: facts.launch_year,
            consensus_mechanism: facts.consensus_mechanism.clone(),
            last_price: facts.last_price,
            price_observed_at: Some(format_timestamp(facts.observed_at)),
        }
    }

    /// Case-insensitive match on symbol or display name.
    pub fn matches(&self, identifier: &str) -> bool {
        let needle = identifier.trim();
        !needle.is_empty()
            && (self.symbol.eq_ignore_ascii_case(needle)
                || self.display_name.to_lowercase() == needle.to_lowercase())
    }

    /// The parsed price timestamp, if present and well-formed.
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        self.price_observed_at.as_deref().and_then(parse_timestamp)
    }

    /// Merge a provider payload into this record.
    ///
    /// Volatile fields are always overwritten. Static fields are refreshed only
    /// when the provider actually sourced them; an estimate never replaces a
    /// stored fact.
    pub fn apply_fetched(&mut self, facts: &FetchedFacts) {
        self.last_price = facts.last_price;
        self.price_observed_at = Some(format_timestamp(facts.observed_at));

        if !facts.estimated.launch_year {
            self.launch_year = facts.launch_year;
        }
        if !facts.estimated.consensus_mechanism {
            self.consensus_mechanism = facts.consensus_mechanism.clone();
        }
    }

    /// Store-level upsert semantics: take `incoming`'s volatile fields and
    /// refresh the static ones. The display name and symbol are kept.
    pub fn refresh_from(&mut self, incoming: &CoinRecord) {
        self.last_price = incoming.last_price;
        self.price_observed_at = incoming.price_observed_at.clone();
        self.consensus_mechanism = incoming.consensus_mechanism.clone();
        self.launch_year = incoming.launch_year;
    }

    /// Uppercase the symbol and trim whitespace. Stores call this on upsert.
    pub fn normalize(&mut self) {
        self.symbol = normalize_symbol(&self.symbol);
        self.display_name = self.display_name.trim().to_string();
    }
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Which static fields of a [`FetchedFacts`] were filled in by the chain
/// rather than supplied by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatedFields {
    pub launch_year: bool,
    pub consensus_mechanism: bool,
}

/// The provider chain's answer for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedFacts {
    pub display_name: String,
    pub symbol: String,
    pub launch_year: i32,
    pub consensus_mechanism: String,
    pub last_price: Option<f64>,
    /// Fetch time
    pub observed_at: DateTime<Utc>,
    #[serde(default)]
    pub estimated: EstimatedFields,
}
