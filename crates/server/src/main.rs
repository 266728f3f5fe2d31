//! privai server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use privai_client::{PerplexityClient, PerplexityConfig};
use privai_core::{AnalysisCache, AppConfig, Credentials, KvStore, SqliteStore};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod badge;
mod handler;
mod orchestrator;
mod router;
mod tools;

use badge::Badge;
use orchestrator::Orchestrator;
use router::TabRouter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    tracing::info!(db_path = %config.db_path.display(), model = %config.model, "Starting privai server on stdio transport");

    let store: Arc<dyn KvStore> = Arc::new(
        SqliteStore::open(&config.db_path)
            .await
            .with_context(|| format!("failed to open store at {}", config.db_path.display()))?,
    );

    let credentials = Credentials::new(Arc::clone(&store), config.api_key.clone());
    if !credentials.is_configured().await {
        tracing::warn!("no API key configured: set PRIVAI_API_KEY or call set_api_key, analyses fail until then");
    }

    let analyzer = PerplexityClient::new(PerplexityConfig::from_app_config(&config))
        .context("failed to build Perplexity client")?;

    let badge = Badge::new(config.error_reset());
    let mut badge_rx = badge.subscribe();
    tokio::spawn(async move {
        while badge_rx.changed().await.is_ok() {
            let view = badge_rx.borrow_and_update().view();
            tracing::info!(state = %view.state, text = %view.text, color = ?view.color, "badge");
        }
    });

    let orchestrator = Orchestrator::new(
        AnalysisCache::new(Arc::clone(&store), config.cache_ttl()),
        credentials,
        Arc::new(analyzer),
        badge,
        config.skip_hosts.clone(),
    );

    let handler = handler::PrivacyServer::new(TabRouter::new(orchestrator));
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
