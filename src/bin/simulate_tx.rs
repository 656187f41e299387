//! Preview one transaction from the command line and print the outcome as JSON.
//!
//! ```text
//! simulate_tx <base64-transaction | signature> [mainnet|devnet]
//! ```

use anyhow::{bail, Context};
use std::io::Read;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use simlens::{Config, Network, PreviewService};

fn looks_like_signature(input: &str) -> bool {
    (80..=90).contains(&input.len()) && bs58::decode(input).into_vec().map_or(false, |b| b.len() == 64)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let input = match args.get(1).map(String::as_str) {
        Some("-") | None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("reading transaction from stdin")?;
            buffer
        }
        Some(arg) => arg.to_string(),
    };
    let input = input.trim();
    if input.is_empty() {
        bail!("usage: simulate_tx <base64-transaction | signature | -> [mainnet|devnet]");
    }

    let network = match args.get(2).map(String::as_str) {
        Some("mainnet") => Network::Mainnet,
        _ => Network::Devnet,
    };

    let config = Config::load(network).context("loading configuration")?;
    let service = Arc::new(PreviewService::new(config)?);
    let engine = service.engine();

    let outcome = if looks_like_signature(input) {
        engine.analyze_signature_str(input).await?
    } else {
        engine.analyze_base64(input).await?
    };

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if !outcome.success {
        eprintln!("{}", outcome.human_summary);
    }

    Ok(())
}
