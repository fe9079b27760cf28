//! `coinclaw populate`: pre-fill the fact store from the provider chain.
//!
//! Public price APIs rate-limit aggressively, so fetches are spaced by
//! `populate.delay_ms`.

use std::time::Duration;
use tracing::warn;

use super::{build_orchestrator, load_config};

pub async fn run(symbols: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let symbols = if symbols.is_empty() {
        config.populate.symbols.clone()
    } else {
        symbols
    };

    let orchestrator = build_orchestrator(&config);
    let delay = Duration::from_millis(config.populate.delay_ms);
    let total = symbols.len();
    let mut stored = 0usize;
    let mut failed = Vec::new();

    println!("Populating fact store ({} coins)...\n", total);

    for (i, symbol) in symbols.iter().enumerate() {
        let symbol = symbol.trim().to_uppercase();
        match orchestrator.fetch_and_store(&symbol).await {
            Some(record) => {
                stored += 1;
                let price = record
                    .last_price
                    .map_or_else(|| "n/a".to_string(), |p| format!("${p}"));
                println!("  [{}/{}] {} ({}): {}", i + 1, total, record.display_name, record.symbol, price);
            }
            None => {
                warn!(symbol = %symbol, "No provider returned data");
                println!("  [{}/{}] {}: not found", i + 1, total, symbol);
                failed.push(symbol);
            }
        }

        if i + 1 < total && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    println!("\nStored {stored}/{total} coins.");
    if !failed.is_empty() {
        println!("Not found: {}", failed.join(", "));
    }
    if config.store.backend == "file" {
        println!("Fact store: {}", config.store.resolved_path().display());
    }

    Ok(())
}
