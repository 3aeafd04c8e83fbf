#![warn(missing_docs)]

//! Whisperbox gateway process entry point.
//!
//! Initializes logging, validates the environment, and prepares the
//! command-registration payload. The chat client and the managed key-value
//! client are wired in by the deployment-specific connector behind the
//! `Publisher`, `Directory` and `KvStore` seams.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use whisperbox_gateway::{registration_payload, GatewayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let config = GatewayConfig::from_env()?;
    tracing::info!(
        "whisperbox gateway starting (table={}, region={})",
        config.table_name,
        config.region
    );
    tracing::debug!("command registration payload: {}", registration_payload());

    Ok(())
}
