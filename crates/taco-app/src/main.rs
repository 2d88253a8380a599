//! Command line entry point: mount a provider, wait for the datasets and
//! report them in the requested order

mod cli;

use anyhow::{bail, Context, Result};
use arrow::util::pretty::pretty_format_batches;
use clap::Parser;
use tracing::{info, warn};

use taco_core::{combined_state, RequestState};
use taco_data::{TacoConfig, TacoProvider};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = TacoConfig::from_path(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    let provider = TacoProvider::from_config(&config)?;

    if tokio::time::timeout(cli.wait, provider.settled()).await.is_err() {
        warn!(
            "Datasets still pending after {}",
            humantime::format_duration(cli.wait)
        );
    }

    let ids: Vec<String> = if cli.datasets.is_empty() {
        provider.spec().ids().map(str::to_string).collect()
    } else {
        cli.datasets
    };
    let requests = provider.use_datasets(ids.as_slice())?;

    for request in &requests {
        println!("{request}");
        if cli.show && request.state() == RequestState::Loaded {
            let batch = provider.record_batch(request.id())?;
            println!("{}", pretty_format_batches(&[batch])?);
        }
    }

    provider.unmount();

    let state = combined_state(&requests);
    info!("Combined state: {}", state);
    if state != RequestState::Loaded {
        let missing = requests
            .iter()
            .filter(|request| request.state() != RequestState::Loaded)
            .count();
        bail!("{} of {} datasets not loaded", missing, requests.len());
    }

    Ok(())
}
