//! # TodoVault API Server
//!
//! Multi-user todo service with token authentication, owner-scoped todo
//! management, and file attachments.
//!
//! ## Boot sequence
//!
//! 1. Initialize tracing
//! 2. Load configuration from the environment
//! 3. Create the database if it does not exist, connect, run migrations
//! 4. Seed the default operator account
//! 5. Build the router and serve until ctrl-c
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p todovault-api
//! ```

use std::sync::Arc;
use todovault_api::{
    app::{build_router, AppState},
    config::Config,
    seed,
};
use todovault_shared::{
    db::{migrations, pool},
    storage::disk::DiskAttachmentStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todovault_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TodoVault API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    migrations::ensure_database_exists(&config.database.url).await?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;
    seed::ensure_default_operator(&db, &config.admin).await?;

    let attachments = DiskAttachmentStore::new(&config.storage.upload_dir).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(db.clone(), config, Arc::new(attachments));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool::close_pool(db).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
