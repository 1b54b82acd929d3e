//! Kanban MCP - single-user kanban task board over a snapshot-cached store
//!
//! Store initialization runs in the background so the MCP handshake is never
//! blocked on the database; reads fall back to the snapshot cache until the
//! store is ready.

mod cache;
mod config;
mod error;
mod handlers;
mod params;
mod server;
mod service;
mod store;
#[cfg(test)]
mod tests;
mod types;

use std::sync::Arc;

use rmcp::{transport::io::stdio, ServiceExt};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cache::SnapshotCache;
use config::Config;
use server::KanbanMcpServer;
use service::TaskService;
use store::{SqliteStore, StoreHandle};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging to stderr (MCP uses stdout for the protocol)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(EnvFilter::from_default_env().add_directive("kanban_mcp=info".parse()?))
        .init();

    tracing::info!("Starting Kanban MCP server");

    let config = Config::from_env();
    let store = StoreHandle::new();
    let cache = SnapshotCache::new(config.cache_path.clone());
    let service = TaskService::new(store.clone(), cache, &config);
    let server = KanbanMcpServer::new(service);

    // Open the store in the background; serving starts immediately. A failed
    // init is only logged, and calls that need the store fail individually
    // until it is installed.
    let handle = store.clone();
    let db_path = config.db_path.clone();
    tokio::spawn(async move {
        match SqliteStore::open(&db_path) {
            Ok(opened) => {
                handle.install(Arc::new(opened));
                tracing::info!(path = %db_path.display(), "task store ready");
            }
            Err(err) => {
                tracing::error!(error = %err, "task store initialization failed");
            }
        }
    });

    let service_handle = server.serve(stdio()).await?;

    tracing::info!("Kanban MCP server running");

    service_handle.waiting().await?;

    tracing::info!("Kanban MCP server stopped");

    Ok(())
}
