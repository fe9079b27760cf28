pub mod ask;
pub mod gateway;
pub mod onboard;
pub mod populate;
pub mod status;

use std::sync::Arc;

use coinclaw_agent::QueryOrchestrator;
use coinclaw_config::AppConfig;
use coinclaw_core::store::FactStore;
use coinclaw_store::{FileStore, InMemoryStore};

pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// Open the configured fact store backend.
pub fn open_store(config: &AppConfig) -> Arc<dyn FactStore> {
    match config.store.backend.as_str() {
        "memory" => Arc::new(InMemoryStore::new()),
        _ => Arc::new(FileStore::new(config.store.resolved_path())),
    }
}

pub fn build_orchestrator(config: &AppConfig) -> Arc<QueryOrchestrator> {
    Arc::new(QueryOrchestrator::from_config(config, open_store(config)))
}
