//! Webhook relay - Main Application Entry Point
//!
//! Accepts webhook calls under a configurable mount point, authenticates them
//! with API keys, and either manages the key set (admin) or relays a message
//! into a chat channel (admin or member).
//!
//! # Startup Flow
//!
//! 1. Load and validate configuration from environment variables
//! 2. Create the key store pool and run migrations
//! 3. Build the relay and the webhook service
//! 4. Start the request loop and the HTTP listener
//! 5. Run until Ctrl-C or until the request loop stops

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use webhook_relay::{
    config::Config,
    db,
    server::{self, AppState, REQUEST_BUFFER},
    services::{key_registry::KeyRegistry, relay::HttpRelay, webhook_service::WebhookService},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Unable to load config")?;

    // RUST_LOG wins; otherwise DEBUG picks the default level
    let default_level = if config.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .init();
    tracing::info!("Starting webhook relay");

    config.validate()?;
    tracing::info!(
        prefix = %config.path_prefix(),
        channel = %config.channel,
        db_path = %config.db_path,
        "Configuration loaded"
    );

    let pool = db::create_pool(&config.db_path)
        .await
        .with_context(|| format!("Unable to open key store at {}", config.db_path))?;
    db::run_migrations(&pool).await?;
    tracing::info!("Key store ready");

    let relay = HttpRelay::new(config.relay_url.clone(), config.relay_token.clone())?;
    let service = WebhookService::new(&config, KeyRegistry::new(pool.clone()), Arc::new(relay));

    let (requests, stream) = mpsc::channel(REQUEST_BUFFER);
    let mut service_loop = tokio::spawn(service.run(stream));

    let app = server::router(&config.path_prefix(), AppState { pool, requests });

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    tokio::select! {
        result = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()) => {
            result?;
            tracing::info!("Server stopped");
        }
        result = &mut service_loop => {
            result.context("Request loop panicked")?;
            tracing::error!("Request loop ended, shutting down");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Unable to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
