//! Screenhook webhook receiver.
//!
//! Main entry point. Loads credentials from the environment once,
//! bootstraps the analytics table, and serves the webhook endpoint
//! until shutdown.

use anyhow::{Context, Result};
use screenhook_api::Config;
use screenhook_core::storage;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("Starting screenhook webhook receiver");

    let config = Config::from_env()?;
    info!(
        database = %config.database.masked(),
        server_addr = %config.server_addr,
        "Configuration loaded"
    );

    storage::ensure_schema(&config.database)
        .await
        .context("Failed to bootstrap the analytics table")?;
    info!("Analytics table ready");

    screenhook_api::start_server(config.database, config.server_addr)
        .await
        .context("Server failed")?;

    info!("Screenhook shutdown complete");
    Ok(())
}

/// Initializes tracing with environment-based configuration.
fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,screenhook=debug,tower_http=debug"))
        .expect("Invalid RUST_LOG environment variable");

    let fmt_layer = fmt::layer().with_target(true).with_file(true).with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
