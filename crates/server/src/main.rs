//! revcache MCP server entry point.
//!
//! Boots the revision engine from layered configuration and serves its tools
//! on stdio. Logging goes to stderr to avoid interfering with the JSON-RPC
//! protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use revcache_core::{AppConfig, CacheManager, ConfigRegistry, MemoryRevisionStore, RevisionStore, SqliteRevisionStore};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;

    let store: Arc<dyn RevisionStore> = match &config.db_path {
        Some(path) => {
            let store = SqliteRevisionStore::open(path)
                .await
                .map_err(|e| anyhow::anyhow!("failed to open revision store: {e}"))?;
            Arc::new(store.with_session(config.session.clone()))
        }
        None => Arc::new(MemoryRevisionStore::new()),
    };

    tracing::info!(
        db_path = ?config.db_path,
        session = %config.session,
        base_api_urls = config.cache.base_api_urls.len(),
        "Starting revcache server on stdio transport"
    );

    let manager = Arc::new(CacheManager::new(ConfigRegistry::new(config.cache), store));
    let handler = handler::RevcacheServer::new(manager);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
