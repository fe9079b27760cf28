//! Shared test doubles for the pipeline tests.

use async_trait::async_trait;
use coinclaw_core::error::{ProviderError, StoreError};
use coinclaw_core::provider::{FactProvider, ProviderFacts};
use coinclaw_core::record::CoinRecord;
use coinclaw_core::store::FactStore;
use coinclaw_store::InMemoryStore;
use std::sync::Mutex;

/// A provider that answers every request with the same facts, or always fails.
/// Records each requested symbol.
pub struct ScriptedProvider {
    facts: Option<ProviderFacts>,
    requested: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn answering(facts: ProviderFacts) -> Self {
        Self {
            facts: Some(facts),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            facts: None,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requested.lock().unwrap().len()
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl FactProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch(&self, symbol: &str) -> Result<ProviderFacts, ProviderError> {
        self.requested.lock().unwrap().push(symbol.to_string());
        self.facts
            .clone()
            .ok_or_else(|| ProviderError::Network("scripted failure".into()))
    }
}

/// Wraps an [`InMemoryStore`] and counts reads and writes.
pub struct CountingStore {
    inner: InMemoryStore,
    reads: Mutex<usize>,
    upserts: Mutex<usize>,
}

impl CountingStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            reads: Mutex::new(0),
            upserts: Mutex::new(0),
        }
    }

    /// The wrapped store, for assertions that should not be counted.
    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    pub fn reads(&self) -> usize {
        *self.reads.lock().unwrap()
    }

    pub fn upserts(&self) -> usize {
        *self.upserts.lock().unwrap()
    }
}

#[async_trait]
impl FactStore for CountingStore {
    fn name(&self) -> &str {
        "counting"
    }

    async fn get(&self, identifier: &str) -> Result<Option<CoinRecord>, StoreError> {
        *self.reads.lock().unwrap() += 1;
        self.inner.get(identifier).await
    }

    async fn upsert(&self, record: CoinRecord) -> Result<CoinRecord, StoreError> {
        *self.upserts.lock().unwrap() += 1;
        self.inner.upsert(record).await
    }

    async fn list(&self) -> Result<Vec<CoinRecord>, StoreError> {
        self.inner.list().await
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.inner.count().await
    }
}
