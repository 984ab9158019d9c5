//! # Booster Vault Runtime
//!
//! Headless entry point: loads configuration from the environment, starts
//! the scheduled tasks and runs until Ctrl+C. Price notices go to the log.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;
use vault_runtime::{VaultConfig, VaultRuntime};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = VaultConfig::from_env();
    let runtime = VaultRuntime::new(config).context("Failed to initialize vault runtime")?;
    runtime.start();

    info!("Vault is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;

    Ok(())
}
