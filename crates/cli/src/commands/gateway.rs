//! `coinclaw gateway`: start the HTTP API server.

use super::{build_orchestrator, load_config};

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config()?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("CoinClaw Gateway");
    println!("   Listening: http://{}:{}", config.gateway.host, config.gateway.port);
    println!("   Providers: {}", config.providers.enabled_order().join(" -> "));

    let orchestrator = build_orchestrator(&config);
    coinclaw_gateway::start(&config, orchestrator).await?;

    Ok(())
}
