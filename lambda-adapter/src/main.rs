//! Hookgate Lambda - GitHub webhook gateway running under a serverless runtime.
//!
//! Receives API Gateway proxy events through `lambda_runtime`, verifies and
//! dispatches each delivery, and answers with the proxy response.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hookgate::{runtime, AdapterOptions, Config, Webhooks};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    tracing::info!("lambda_starting");

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(secret_length = config.webhook_secret.len(), "config_loaded");

    let mut webhooks = Webhooks::new(config.webhook_secret.clone());
    webhooks.log_deliveries();

    runtime::run(Arc::new(webhooks), AdapterOptions::default())
        .await
        .map_err(|e| anyhow!(e))
        .context("Lambda runtime failed")?;

    Ok(())
}
