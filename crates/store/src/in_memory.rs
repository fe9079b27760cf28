//! In-memory store, useful for testing and ephemeral sessions.

use async_trait::async_trait;
use coinclaw_core::error::StoreError;
use coinclaw_core::record::CoinRecord;
use coinclaw_core::store::FactStore;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{find_in, upsert_into};

/// A store that keeps records in a Vec.
/// Useful for testing and sessions where persistence isn't needed.
pub struct InMemoryStore {
    records: Arc<RwLock<Vec<CoinRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Start with pre-populated records.
    pub fn with_records(records: impl IntoIterator<Item = CoinRecord>) -> Self {
        let mut seeded = Vec::new();
        for record in records {
            upsert_into(&mut seeded, record);
        }
        Self {
            records: Arc::new(RwLock::new(seeded)),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FactStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn get(&self, identifier: &str) -> Result<Option<CoinRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(find_in(&records, identifier).cloned())
    }

    async fn upsert(&self, record: CoinRecord) -> Result<CoinRecord, StoreError> {
        let mut records = self.records.write().await;
        Ok(upsert_into(&mut records, record))
    }

    async fn list(&self) -> Result<Vec<CoinRecord>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().await.len())
    }
}
