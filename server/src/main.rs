//! Branch Warden Server - Main Entry Point

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use warden_server::auth::{AppIdentity, AuthPipeline, GitHubTokenBroker};
use warden_server::github::{build_http_client, protection::BranchPolicy};
use warden_server::webhooks::dispatch::Dispatcher;
use warden_server::{api, config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warden_server=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        app_id = %config.app_id,
        "Starting Branch Warden Server"
    );

    // A missing or unusable key is fatal: no delivery could ever authenticate.
    let identity = AppIdentity::from_pem(&config.app_id, &config.private_key)
        .context("Failed to load GitHub App identity")?;

    let http = build_http_client(config.token_exchange_timeout)
        .context("Failed to build HTTP client")?;
    let broker = GitHubTokenBroker::new(config.api_url.clone(), http.clone());

    let pipeline = AuthPipeline::new(
        Arc::new(identity),
        config.webhook_secret.as_str(),
        Arc::new(broker),
        http,
        config.api_url.clone(),
    )
    .with_exchange_timeout(config.token_exchange_timeout);

    let policy = BranchPolicy::from_config(config.protected_branch.as_deref());
    info!(?policy, "Branch protection policy");
    let dispatcher = Dispatcher::new(policy);

    // Build application state
    let bind_address = config.bind_address.clone();
    let state = api::AppState::new(config, pipeline, dispatcher);

    // Build router
    let app = api::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    info!(address = %bind_address, "Server listening");

    // Graceful shutdown handler
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");

    Ok(())
}
