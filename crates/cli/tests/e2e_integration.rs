//! End-to-end tests for the CoinClaw query pipeline.
//!
//! These drive the orchestrator against a real JSON file store and scripted
//! providers, from raw query text to the answer and the bytes on disk.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use coinclaw_agent::QueryOrchestrator;
use coinclaw_core::answer::Provenance;
use coinclaw_core::error::{ProviderError, Rejection};
use coinclaw_core::provider::{FactProvider, ProviderFacts};
use coinclaw_core::record::CoinRecord;
use coinclaw_core::store::FactStore;
use coinclaw_providers::{ConsensusFill, ProviderChain};
use coinclaw_store::FileStore;

// ── Mock Providers ───────────────────────────────────────────────────────

/// Answers from a fixed table of coins, keyed by symbol or name.
struct TableProvider {
    name: &'static str,
    coins: Vec<ProviderFacts>,
    call_count: Mutex<usize>,
}

impl TableProvider {
    fn new(name: &'static str, coins: Vec<ProviderFacts>) -> Self {
        Self {
            name,
            coins,
            call_count: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl FactProvider for TableProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch(&self, symbol: &str) -> Result<ProviderFacts, ProviderError> {
        *self.call_count.lock().unwrap() += 1;
        self.coins
            .iter()
            .find(|c| {
                c.symbol.eq_ignore_ascii_case(symbol) || c.display_name.eq_ignore_ascii_case(symbol)
            })
            .cloned()
            .ok_or_else(|| ProviderError::NotListed {
                provider: self.name.into(),
                symbol: symbol.into(),
            })
    }
}

/// Always fails, counting attempts.
struct DownProvider {
    call_count: Mutex<usize>,
}

impl DownProvider {
    fn new() -> Self {
        Self {
            call_count: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl FactProvider for DownProvider {
    fn name(&self) -> &str {
        "down"
    }

    async fn fetch(&self, _symbol: &str) -> Result<ProviderFacts, ProviderError> {
        *self.call_count.lock().unwrap() += 1;
        Err(ProviderError::ApiError {
            status_code: 503,
            message: "Service Unavailable".into(),
        })
    }
}

fn bitcoin() -> ProviderFacts {
    let mut facts = ProviderFacts::priced("Bitcoin", "BTC", 65000.12);
    facts.launch_year = Some(2009);
    facts.consensus_mechanism = Some("Proof of Work".into());
    facts
}

fn solana() -> ProviderFacts {
    ProviderFacts::priced("Solana", "SOL", 151.25)
}

fn temp_store() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("kb.json");
    (dir, path)
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn tell_me_about_bitcoin_fetches_and_persists() {
    let (_dir, path) = temp_store();
    let provider = Arc::new(TableProvider::new("table", vec![bitcoin()]));
    let chain = ProviderChain::new().add_default(provider.clone());
    let orchestrator = QueryOrchestrator::new(Arc::new(FileStore::new(path.clone())), chain);
    let mut session = orchestrator.new_session();

    let answer = orchestrator.handle(&mut session, "Tell me about Bitcoin").await;

    assert!(answer.text.contains("Bitcoin (BTC)"));
    assert!(answer.text.contains("2009"));
    assert!(answer.text.contains("Proof of Work"));
    assert!(answer.text.contains("$65000.12"));
    assert_eq!(answer.provenance, Provenance::ExternalFetch);
    assert_eq!(answer.confidence, 1.0);

    // Persisted in the interchange format
    let raw = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json[0]["coin"], "Bitcoin");
    assert_eq!(json[0]["symbol"], "BTC");
    assert_eq!(json[0]["launch_year"], 2009);
    assert_eq!(json[0]["consensus"], "Proof of Work");
    assert_eq!(json[0]["last_price"], 65000.12);
    assert!(json[0]["price_timestamp"].as_str().unwrap().ends_with('Z'));

    // A second process sees the same record
    let reopened = FileStore::new(path);
    assert_eq!(reopened.count().await.unwrap(), 1);
}

#[tokio::test]
async fn second_question_is_served_from_cache() {
    let (_dir, path) = temp_store();
    let provider = Arc::new(TableProvider::new("table", vec![bitcoin()]));
    let chain = ProviderChain::new().add_default(provider.clone());
    let orchestrator = QueryOrchestrator::new(Arc::new(FileStore::new(path)), chain);
    let mut session = orchestrator.new_session();

    orchestrator.handle(&mut session, "Tell me about Bitcoin").await;
    let answer = orchestrator.handle(&mut session, "What consensus does BTC use?").await;

    assert_eq!(answer.text, "Bitcoin uses Proof of Work consensus.");
    assert_eq!(answer.provenance, Provenance::Cache);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn conversation_follow_ups() {
    let (_dir, path) = temp_store();
    let provider = Arc::new(TableProvider::new("table", vec![bitcoin(), solana()]));
    let chain = ProviderChain::new().add_default(provider);
    let orchestrator = QueryOrchestrator::new(Arc::new(FileStore::new(path)), chain);
    let mut session = orchestrator.new_session();

    let first = orchestrator.handle(&mut session, "What is the price of Solana?").await;
    assert_eq!(first.text, "The price of Solana (SOL) is $151.25.");

    let second = orchestrator.handle(&mut session, "What is its price right now?").await;
    assert_eq!(second.text, "The price of Solana (SOL) is $151.25.");
    assert_eq!(second.provenance, Provenance::Cache);

    // Switching coins moves the context
    orchestrator.handle(&mut session, "Tell me about Bitcoin").await;
    let third = orchestrator.handle(&mut session, "when was this launched?").await;
    assert_eq!(third.text, "Bitcoin was launched in 2009.");
}

#[tokio::test]
async fn fallback_chain_reaches_a_working_provider() {
    let (_dir, path) = temp_store();
    let down = Arc::new(DownProvider::new());
    let table = Arc::new(TableProvider::new("table", vec![solana()]));
    let chain = ProviderChain::new()
        .add(down.clone(), Duration::from_secs(1), ConsensusFill::Unknown)
        .add(table.clone(), Duration::from_secs(1), ConsensusFill::PowHeuristic);
    let orchestrator = QueryOrchestrator::new(Arc::new(FileStore::new(path)), chain);
    let mut session = orchestrator.new_session();

    let answer = orchestrator.handle(&mut session, "What consensus does SOL use?").await;

    assert_eq!(answer.text, "Solana uses Proof of Stake consensus.");
    assert_eq!(answer.provenance, Provenance::ExternalFetch);
    assert_eq!(down.calls(), 1);
    assert_eq!(table.calls(), 1);
}

#[tokio::test]
async fn stale_record_on_disk_is_refreshed() {
    let (_dir, path) = temp_store();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        r#"[
    {
        "coin": "Bitcoin",
        "symbol": "BTC",
        "launch_year": 2009,
        "consensus": "Proof of Work",
        "last_price": 42000.0,
        "price_timestamp": "2024-01-01T00:00:00Z"
    }
]"#,
    )
    .unwrap();

    let provider = Arc::new(TableProvider::new(
        "table",
        vec![ProviderFacts::priced("Bitcoin", "BTC", 65000.12)],
    ));
    let chain = ProviderChain::new().add_default(provider);
    let store = Arc::new(FileStore::new(path.clone()));
    let orchestrator = QueryOrchestrator::new(store.clone(), chain);
    let mut session = orchestrator.new_session();

    let before = Utc::now() - chrono::Duration::seconds(1);
    let answer = orchestrator.handle(&mut session, "price of bitcoin").await;

    assert_eq!(answer.text, "The price of Bitcoin (BTC) is $65000.12.");
    assert_eq!(answer.provenance, Provenance::ExternalFetch);

    let record = FileStore::new(path).get("BTC").await.unwrap().unwrap();
    assert_eq!(record.last_price, Some(65000.12));
    assert!(record.observed_at().unwrap() >= before);
    // The provider had no static facts; the stored ones survive
    assert_eq!(record.consensus_mechanism, "Proof of Work");
    assert_eq!(record.launch_year, 2009);
}

#[tokio::test]
async fn stale_record_with_all_providers_down_answers_from_cache() {
    let (_dir, path) = temp_store();
    let store = Arc::new(FileStore::new(path));
    store
        .upsert(
            CoinRecord::new("Ethereum", "ETH", 2015, "Proof of Stake")
                .with_price(3000.5, Utc::now() - chrono::Duration::hours(1)),
        )
        .await
        .unwrap();

    let down = Arc::new(DownProvider::new());
    let orchestrator = QueryOrchestrator::new(store, ProviderChain::new().add_default(down.clone()));
    let mut session = orchestrator.new_session();

    let answer = orchestrator.handle(&mut session, "price of ETH").await;

    assert_eq!(answer.text, "The price of Ethereum (ETH) is $3000.5.");
    assert_eq!(answer.provenance, Provenance::Cache);
    assert_eq!(down.calls(), 1);
}

#[tokio::test]
async fn unknown_coin_with_providers_down_is_not_found() {
    let (_dir, path) = temp_store();
    let down = Arc::new(DownProvider::new());
    let orchestrator = QueryOrchestrator::new(
        Arc::new(FileStore::new(path.clone())),
        ProviderChain::new().add_default(down),
    );
    let mut session = orchestrator.new_session();

    let answer = orchestrator.handle(&mut session, "price of Zorkcoin").await;

    assert_eq!(answer.rejection, Some(Rejection::NotFound));
    assert_eq!(answer.confidence, 0.0);
    assert!(!path.exists(), "nothing should be written");
}

#[tokio::test]
async fn refusals_never_reach_store_or_providers() {
    let (_dir, path) = temp_store();
    let provider = Arc::new(TableProvider::new("table", vec![bitcoin()]));
    let orchestrator = QueryOrchestrator::new(
        Arc::new(FileStore::new(path.clone())),
        ProviderChain::new().add_default(provider.clone()),
    );
    let mut session = orchestrator.new_session();

    for query in [
        "Predict the price of Bitcoin next week",
        "Should I sell my ETH?",
        "What is the FUTURE of Solana",
    ] {
        let answer = orchestrator.handle(&mut session, query).await;
        assert_eq!(answer.text, "Investment advice and predictions are not allowed.");
        assert_eq!(answer.rejection, Some(Rejection::PolicyRejected));
    }

    let answer = orchestrator.handle(&mut session, "what is going on").await;
    assert_eq!(answer.rejection, Some(Rejection::EntityUnresolved));

    assert_eq!(provider.calls(), 0);
    assert!(!path.exists());
}

#[tokio::test]
async fn populate_then_answer_offline() {
    let (_dir, path) = temp_store();
    let provider = Arc::new(TableProvider::new("table", vec![bitcoin(), solana()]));
    let orchestrator = QueryOrchestrator::new(
        Arc::new(FileStore::new(path.clone())),
        ProviderChain::new().add_default(provider),
    );

    assert!(orchestrator.fetch_and_store("BTC").await.is_some());
    assert!(orchestrator.fetch_and_store("SOL").await.is_some());
    assert!(orchestrator.fetch_and_store("NOPE").await.is_none());

    // New process, providers gone: fresh prices still answer
    let down = Arc::new(DownProvider::new());
    let offline = QueryOrchestrator::new(
        Arc::new(FileStore::new(path)),
        ProviderChain::new().add_default(down.clone()),
    );
    let mut session = offline.new_session();

    let answer = offline.handle(&mut session, "What is the price of SOL?").await;
    assert_eq!(answer.text, "The price of Solana (SOL) is $151.25.");
    assert_eq!(answer.provenance, Provenance::Cache);
    assert_eq!(down.calls(), 0);
}
