//! Error taxonomy for the task service and its collaborators
//!
//! Store and cache failures carry their own types; the service folds both
//! into `TaskError`. Handlers collapse `TaskError` into a single coarse MCP
//! failure per operation at the tool boundary.

use thiserror::Error;

/// Failures from the persistent store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Failures from the snapshot cache file
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Service-level error taxonomy
#[derive(Debug, Error)]
pub enum TaskError {
    /// The configured owner does not resolve in the store
    #[error("owner \"{0}\" not found")]
    OwnerNotFound(String),

    /// A task identifier does not resolve in the store
    #[error("task \"{0}\" not found")]
    TaskNotFound(String),

    /// The store has not finished (or failed) background initialization
    #[error("task store is not ready")]
    StoreUnavailable,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}
