//! The query orchestrator: one query in, one [`AgentAnswer`] out.
//!
//! ```text
//! Received -> PolicyChecked -> EntityResolved -> FactsReady -> Answered
//!     \             \                \
//!      `-------------`----------------`--> Rejected
//! ```
//!
//! The store is consulted first. A cached record is refreshed through the
//! provider chain only when its price is stale; an unknown coin is fetched and
//! stored. Provider failures never surface: they fall back to the cached
//! record, or to a `NotFound` rejection when nothing is cached.

use chrono::Utc;
use coinclaw_config::{AppConfig, DEFAULT_HISTORY_LIMIT};
use coinclaw_core::answer::{AgentAnswer, Provenance};
use coinclaw_core::error::Rejection;
use coinclaw_core::record::{CoinRecord, FetchedFacts};
use coinclaw_core::store::FactStore;
use coinclaw_providers::{ProviderChain, build_chain};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::answer::{QuestionKind, render};
use crate::conversation::ConversationMemory;
use crate::policy::IntentPolicy;
use crate::resolver::EntityResolver;
use crate::staleness::StalenessPolicy;

pub struct QueryOrchestrator {
    store: Arc<dyn FactStore>,
    chain: ProviderChain,
    resolver: EntityResolver,
    policy: IntentPolicy,
    staleness: StalenessPolicy,
    history_limit: usize,
}

impl QueryOrchestrator {
    /// Create an orchestrator with the default policies.
    pub fn new(store: Arc<dyn FactStore>, chain: ProviderChain) -> Self {
        Self {
            resolver: EntityResolver::new(store.clone()),
            store,
            chain,
            policy: IntentPolicy::default(),
            staleness: StalenessPolicy::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Build the provider chain and policies from configuration.
    pub fn from_config(config: &AppConfig, store: Arc<dyn FactStore>) -> Self {
        Self::new(store, build_chain(&config.providers))
            .with_policy(IntentPolicy::new(config.agent.disallowed_keywords.iter().cloned()))
            .with_staleness(StalenessPolicy::new(Duration::from_secs(
                config.agent.freshness_window_secs,
            )))
            .with_history_limit(config.agent.history_limit)
    }

    pub fn with_policy(mut self, policy: IntentPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_staleness(mut self, staleness: StalenessPolicy) -> Self {
        self.staleness = staleness;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// A fresh conversation sized for this orchestrator.
    pub fn new_session(&self) -> ConversationMemory {
        ConversationMemory::new(self.history_limit)
    }

    pub fn store(&self) -> &Arc<dyn FactStore> {
        &self.store
    }

    pub fn chain(&self) -> &ProviderChain {
        &self.chain
    }

    /// Answer one query within `session`.
    pub async fn handle(&self, session: &mut ConversationMemory, query: &str) -> AgentAnswer {
        session.record_turn(query);

        if !self.policy.is_allowed(query) {
            return AgentAnswer::rejected(Rejection::PolicyRejected);
        }

        let fallback = if session.is_follow_up(query) {
            session.last_entity().map(str::to_string)
        } else {
            None
        };

        let Some(entity) = self.resolver.resolve(query, fallback.as_deref()).await else {
            info!(query = %query, "Could not identify a coin");
            return AgentAnswer::rejected(Rejection::EntityUnresolved);
        };

        let cached = match self.store.get(&entity).await {
            Ok(record) => record,
            Err(e) => {
                warn!(entity = %entity, error = %e, "Store lookup failed, treating as unknown");
                None
            }
        };

        let (record, provenance) = match cached {
            Some(record) => {
                session.set_last_entity(&record.symbol);
                self.refresh_if_stale(record).await
            }
            None => match self.fetch_new(&entity).await {
                Some(record) => {
                    session.set_last_entity(&record.symbol);
                    (record, Provenance::ExternalFetch)
                }
                None => {
                    info!(entity = %entity, "Coin not found in store or any provider");
                    return AgentAnswer::rejected(Rejection::NotFound);
                }
            },
        };

        let kind = QuestionKind::detect(query);
        match render(kind, &record) {
            Ok(text) => {
                debug!(symbol = %record.symbol, ?kind, ?provenance, "Answered");
                AgentAnswer::answered(text, provenance)
            }
            Err(rejection) => {
                info!(symbol = %record.symbol, ?kind, "Requested fact not available");
                AgentAnswer::rejected(rejection)
            }
        }
    }

    /// Refresh a cached record through the chain if its price is stale. Keeps
    /// the cached copy when the chain has nothing.
    async fn refresh_if_stale(&self, mut record: CoinRecord) -> (CoinRecord, Provenance) {
        if !self.staleness.needs_refresh(&record, Utc::now()) {
            debug!(symbol = %record.symbol, "Cache is fresh");
            return (record, Provenance::Cache);
        }

        info!(symbol = %record.symbol, "Cached price is stale, refreshing");
        match self.chain.fetch_facts(&record.symbol).await {
            Some(facts) => {
                record.apply_fetched(&facts);
                (self.persist(record).await, Provenance::ExternalFetch)
            }
            None => {
                warn!(symbol = %record.symbol, "Refresh failed, answering from cache");
                (record, Provenance::Cache)
            }
        }
    }

    /// Fetch current facts for `symbol` and merge them into the store,
    /// regardless of cache age. Used to pre-populate the store.
    pub async fn fetch_and_store(&self, symbol: &str) -> Option<CoinRecord> {
        self.fetch_new(symbol).await
    }

    /// Fetch a coin the store did not know by `entity`, and store it.
    async fn fetch_new(&self, entity: &str) -> Option<CoinRecord> {
        let facts = self.chain.fetch_facts(entity).await?;
        let record = self.merge_into_existing(&facts).await;
        Some(self.persist(record).await)
    }

    /// The provider may return a symbol the store already has (the query
    /// named the coin differently). Merge into that record rather than
    /// replacing its sourced facts with estimates.
    async fn merge_into_existing(&self, facts: &FetchedFacts) -> CoinRecord {
        match self.store.get(&facts.symbol).await {
            Ok(Some(mut existing)) if existing.symbol.eq_ignore_ascii_case(&facts.symbol) => {
                existing.apply_fetched(facts);
                existing
            }
            _ => CoinRecord::from_fetched(facts),
        }
    }

    /// Upsert the record. A failed write is logged and the in-hand copy is
    /// used for the answer.
    async fn persist(&self, record: CoinRecord) -> CoinRecord {
        match self.store.upsert(record.clone()).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(symbol = %record.symbol, error = %e, "Failed to persist coin record");
                record
            }
        }
    }
}
