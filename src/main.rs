//! # Email Sender Controller
//!
//! Process bootstrap: logging, configuration, cluster client, watch loops.

use anyhow::{Context, Result};
use kube::Client;
use tracing::info;

use email_sender_controller::config::ControllerConfig;
use email_sender_controller::runtime;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "email_sender_controller=info".into()),
        )
        .init();

    info!("Starting Email Sender Controller");

    let config = ControllerConfig::from_env();

    // Resolves in-cluster service account credentials first, kubeconfig
    // otherwise.
    let client = Client::try_default()
        .await
        .context("failed to build Kubernetes client")?;

    runtime::run(client, config).await?;

    info!("Controller stopped");
    Ok(())
}
