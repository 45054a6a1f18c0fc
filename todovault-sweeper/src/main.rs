//! # TodoVault Sweeper
//!
//! Standalone background process that deactivates todos whose deadline has
//! passed. Runs alongside the API server against the same database.
//!
//! ## Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `SWEEP_INTERVAL_SECONDS`: Seconds between sweeps (default: 60)
//! - `RUST_LOG`: Log level (default: info)
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p todovault-sweeper
//! ```

use std::time::Duration;
use todovault_shared::db::pool::{create_pool, close_pool, DatabaseConfig};
use todovault_sweeper::sweeper::{ExpirationSweeper, DEFAULT_SWEEP_INTERVAL};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todovault_sweeper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TodoVault Sweeper v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

    let interval = match std::env::var("SWEEP_INTERVAL_SECONDS") {
        Ok(raw) => {
            let secs = raw.parse::<u64>()?;
            if secs == 0 {
                anyhow::bail!("SWEEP_INTERVAL_SECONDS must be positive");
            }
            Duration::from_secs(secs)
        }
        Err(_) => DEFAULT_SWEEP_INTERVAL,
    };

    let db = create_pool(DatabaseConfig {
        url: database_url,
        // The sweeper issues one statement per tick
        max_connections: 2,
        min_connections: 1,
        ..Default::default()
    })
    .await?;

    let sweeper = ExpirationSweeper::new(db.clone(), interval);
    let cancel = CancellationToken::new();

    let loop_handle = {
        let cancel = cancel.clone();
        tokio::spawn(async move { sweeper.run(cancel).await })
    };

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    cancel.cancel();
    loop_handle.await?;

    close_pool(db).await;
    tracing::info!("Shutdown complete");

    Ok(())
}
