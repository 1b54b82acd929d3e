//! Environment configuration
//!
//! Every value has a placeholder default so the server starts in a
//! development shell, but `KANBAN_DB` (or `KANBAN_DB_NAME`) and
//! `KANBAN_USERNAME` must be overridden for real use.

use std::path::PathBuf;

/// Placeholder database name, used when neither `KANBAN_DB` nor
/// `KANBAN_DB_NAME` is set. Replace via environment for real deployments.
pub const DEFAULT_DB_NAME: &str = "your_db_name";

/// Placeholder owner lookup name. Replace via environment for real use.
pub const DEFAULT_USERNAME: &str = "your_kanban_username";

/// Default snapshot cache file, created alongside the server's working files.
pub const DEFAULT_CACHE_FILE: &str = "tasks-cache.json";

/// Runtime configuration for the kanban server
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file; the path is the store's connection string
    pub db_path: PathBuf,
    /// Lookup name of the single owner whose tasks are served
    pub owner_name: String,
    /// Snapshot cache file mirroring the owner's tasks
    pub cache_path: PathBuf,
    /// Serve reads from an existing snapshot without consulting the store.
    /// Disable to force every read through the store.
    pub cache_reads: bool,
}

impl Config {
    /// Build configuration from the environment.
    ///
    /// `KANBAN_DB` points at the database file directly; otherwise the file
    /// is `~/.kanban/<KANBAN_DB_NAME>.db`.
    pub fn from_env() -> Self {
        let db_path = std::env::var("KANBAN_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let db_name =
                    std::env::var("KANBAN_DB_NAME").unwrap_or_else(|_| DEFAULT_DB_NAME.to_string());
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".kanban")
                    .join(format!("{db_name}.db"))
            });

        let owner_name =
            std::env::var("KANBAN_USERNAME").unwrap_or_else(|_| DEFAULT_USERNAME.to_string());

        let cache_path = std::env::var("KANBAN_CACHE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CACHE_FILE));

        let cache_reads = std::env::var("KANBAN_CACHE_READS")
            .map(|v| truthy(&v))
            .unwrap_or(true);

        Config {
            db_path,
            owner_name,
            cache_path,
            cache_reads,
        }
    }
}

/// Interpret a flag-style environment value; anything but an explicit
/// "false"/"0"/"no"/"off" counts as enabled.
fn truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}
