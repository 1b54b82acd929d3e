//! Kanban MCP Library
//!
//! Single-user kanban task board served over MCP, backed by a persistent
//! store and a single-file JSON snapshot cache.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use kanban_mcp::{Config, KanbanMcpServer, SnapshotCache, StoreHandle, TaskService};
//!
//! let config = Config::from_env();
//! let store = StoreHandle::new();
//! let cache = SnapshotCache::new(config.cache_path.clone());
//! let service = TaskService::new(store, cache, &config);
//! let server = KanbanMcpServer::new(service);
//! // Serve via stdio or an in-memory transport
//! ```
//!
//! - Writes go through to the snapshot cache after every visible mutation
//! - Reads are served from an existing snapshot without consulting the store
//! - Store initialization is decoupled from serving via [`StoreHandle`]

pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod params;
pub mod server;
pub mod service;
pub mod store;
#[cfg(test)]
pub mod tests;
pub mod types;

// Re-export the main surface
pub use cache::SnapshotCache;
pub use config::Config;
pub use error::{CacheError, StoreError, TaskError};
pub use server::KanbanMcpServer;
pub use service::TaskService;
pub use store::{NewTask, SqliteStore, StoreHandle, TaskStore};
pub use types::{Owner, Priority, Task, TaskStats, TaskStatus};

// Re-export parameter types for direct API usage
pub use params::*;
