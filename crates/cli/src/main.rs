//! CoinClaw CLI: the main entry point.
//!
//! Commands:
//! - `onboard`   Write a default config file
//! - `ask`       Interactive or single-question mode
//! - `gateway`   Start the HTTP server and web UI
//! - `populate`  Pre-fill the fact store from the price providers
//! - `status`    Show configuration, store and provider status

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "coinclaw",
    about = "CoinClaw: factual answers about cryptocurrencies",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Ask about a cryptocurrency
    Ask {
        /// Ask a single question instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Start the HTTP gateway server
    Gateway {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Fetch coins into the fact store (defaults to the configured list)
    Populate {
        /// Symbols to fetch, e.g. BTC ETH SOL
        symbols: Vec<String>,
    },

    /// Show system status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Ask { message } => commands::ask::run(message).await?,
        Commands::Gateway { port } => commands::gateway::run(port).await?,
        Commands::Populate { symbols } => commands::populate::run(symbols).await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
