//! FactStore trait: durable key-value storage of coin records.
//!
//! The store is the single source of truth for [`CoinRecord`] lifetime.
//! Records are keyed by uppercase symbol; `get` also matches the display
//! name, case-insensitively. The core never deletes records.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::record::CoinRecord;

/// The core FactStore trait.
///
/// Implementations: in-memory (for testing), JSON file.
#[async_trait]
pub trait FactStore: Send + Sync {
    /// The backend name (e.g. "file", "in_memory").
    fn name(&self) -> &str;

    /// Find a record by symbol or display name.
    async fn get(&self, identifier: &str) -> std::result::Result<Option<CoinRecord>, StoreError>;

    /// Insert a new record or refresh the existing one with the same symbol,
    /// then persist. Returns the record as stored.
    ///
    /// On a persistence failure the in-memory state has already been updated;
    /// the error only reports that disk may lag behind.
    async fn upsert(&self, record: CoinRecord) -> std::result::Result<CoinRecord, StoreError>;

    /// All records, in insertion order.
    async fn list(&self) -> std::result::Result<Vec<CoinRecord>, StoreError>;

    /// Number of records.
    async fn count(&self) -> std::result::Result<usize, StoreError>;
}
