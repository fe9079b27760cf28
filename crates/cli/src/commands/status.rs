//! `coinclaw status`: show system status.

use coinclaw_config::AppConfig;
use coinclaw_providers::build_chain;

use super::{load_config, open_store};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let store = open_store(&config);

    println!("CoinClaw Status");
    println!("===============");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Store:        {}", config.store.backend);
    if config.store.backend == "file" {
        println!("  Store path:   {}", config.store.resolved_path().display());
    }
    match store.count().await {
        Ok(count) => println!("  Coins stored: {count}"),
        Err(e) => println!("  Coins stored: unavailable ({e})"),
    }
    println!("  Freshness:    {}s", config.agent.freshness_window_secs);
    println!("  History:      {} turns", config.agent.history_limit);
    println!("  Providers:    {}", config.providers.enabled_order().join(" -> "));
    println!("  Gateway:      {}:{}", config.gateway.host, config.gateway.port);

    let chain = build_chain(&config.providers);
    if chain.health_check().await {
        println!("\n  Providers reachable");
    } else {
        println!("\n  No provider reachable; answers will come from the store only");
    }

    if AppConfig::config_path().exists() {
        println!("  Config file found");
    } else {
        println!("  No config file, run `coinclaw onboard` first");
    }

    Ok(())
}
