use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod config;
mod engine;
mod server;

use config::Config;
use engine::features::seed_examples;
use engine::WinProbabilityEstimator;
use server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let estimator = Arc::new(WinProbabilityEstimator::new());
    if config.skip_training {
        info!("Skipping startup training; predictions use the heuristic path");
    } else {
        estimator.train(&seed_examples());
    }

    if let Some(seed) = config.rng_seed {
        info!("RNG seeded with {} – simulations are reproducible", seed);
    }

    let state = AppState {
        estimator,
        rng_seed: config.rng_seed,
    };
    let app = server::router(state);
    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Courtside API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
