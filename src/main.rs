use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use simlens::{Config, Network, PreviewService};

#[tokio::main]
async fn main() -> simlens::Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging (RUST_LOG overrides)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let network = if args.len() > 1 && args[1] == "mainnet" {
        Network::Mainnet
    } else {
        Network::Devnet // Default to devnet for safety
    };

    match network {
        Network::Mainnet => tracing::warn!("Previewing against MAINNET state"),
        Network::Devnet => tracing::info!("Previewing against DEVNET state"),
    }

    // Defaults for the network, then simlens.toml, then SIMLENS_* env vars
    let config = Config::load(network)?;

    let service = Arc::new(PreviewService::new(config)?);
    service.run().await
}
