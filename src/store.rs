//! Persistent store for owners and tasks
//!
//! The service talks to the store through the [`TaskStore`] trait and only
//! needs create / find-by-id / save / find-by-filter operations. The
//! production implementation is SQLite-backed; tests open it on `:memory:`.
//!
//! Every task save runs the store-side hook: `updated_at` is refreshed, and
//! a save while the task is in progress (re)stamps `started_at`. Repeated
//! saves in the in-progress state re-stamp it, which callers tolerate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, types::FromSqlError, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use crate::error::{StoreError, TaskError};
use crate::types::{Owner, Priority, Task, TaskStatus};

/// New task input; everything else is assigned by the store
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
}

/// Async seam between the task service and the persistent store
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persist a new task with status todo and priority medium, assigning
    /// its id and timestamps.
    async fn insert_task(&self, new: NewTask) -> Result<Task, StoreError>;

    /// Fetch a task by id.
    async fn find_task(&self, id: &str) -> Result<Option<Task>, StoreError>;

    /// Persist a task's current state, applying the save hook. The passed
    /// task is updated in place with the stamped timestamps.
    async fn save_task(&self, task: &mut Task) -> Result<(), StoreError>;

    /// Resolve an owner by lookup name.
    async fn find_owner(&self, username: &str) -> Result<Option<Owner>, StoreError>;

    /// Persist an owner's current state.
    async fn save_owner(&self, owner: &Owner) -> Result<(), StoreError>;

    /// All tasks belonging to the given owner, in creation order.
    async fn tasks_for_owner(&self, owner_id: &str) -> Result<Vec<Task>, StoreError>;

    /// Create an owner. Owners are normally created out-of-band; this exists
    /// for provisioning and tests.
    async fn insert_owner(&self, username: &str) -> Result<Owner, StoreError>;

    /// Delete a task and detach it from its owner's task list. Not exposed
    /// through the service's operation set.
    async fn remove_task(&self, id: &str) -> Result<(), StoreError>;
}

/// Save hook applied by every [`TaskStore`] implementation.
///
/// Refreshes `updated_at`, stamps `started_at` when saving in the
/// in-progress state, and normalizes tags to trimmed lowercase.
pub(crate) fn stamp_for_save(task: &mut Task) {
    let now = Utc::now();
    task.updated_at = now;
    if task.status == TaskStatus::InProgress {
        task.started_at = Some(now);
    }
    for tag in &mut task.tags {
        *tag = tag.trim().to_lowercase();
    }
}

/// Cloneable readiness cell for the store.
///
/// Constructed empty in `main` and installed by the background init task;
/// operations that need the store fail with [`TaskError::StoreUnavailable`]
/// until then.
#[derive(Clone, Default)]
pub struct StoreHandle {
    inner: Arc<OnceLock<Arc<dyn TaskStore>>>,
}

impl StoreHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the initialized store. Returns false if one was already
    /// installed (the newcomer is dropped).
    pub fn install(&self, store: Arc<dyn TaskStore>) -> bool {
        self.inner.set(store).is_ok()
    }

    pub fn ready(&self) -> bool {
        self.inner.get().is_some()
    }

    pub fn get(&self) -> Result<Arc<dyn TaskStore>, TaskError> {
        self.inner
            .get()
            .cloned()
            .ok_or(TaskError::StoreUnavailable)
    }
}

/// SQLite-backed store holding the owners and tasks collections
#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        ensure_tables(&conn)?;

        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }
}

/// Ensure the owners and tasks tables exist
fn ensure_tables(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        -- Owners collection
        CREATE TABLE IF NOT EXISTS owners (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            tasks TEXT NOT NULL DEFAULT '[]'
        );

        -- Tasks collection
        CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'todo',
            priority TEXT NOT NULL DEFAULT 'medium',
            tags TEXT NOT NULL DEFAULT '[]',
            due_date TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            started_at TEXT,
            owner_id TEXT REFERENCES owners(id)
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_owner
        ON tasks(owner_id, created_at);
        "#,
    )?;

    Ok(())
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, FromSqlError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| FromSqlError::Other(format!("Invalid timestamp: {e}").into()))
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    let status_str: String = row.get(3)?;
    let status = status_str
        .parse::<TaskStatus>()
        .map_err(|e| FromSqlError::Other(format!("Invalid status: {e}").into()))?;

    let priority_str: String = row.get(4)?;
    let priority = priority_str
        .parse::<Priority>()
        .map_err(|e| FromSqlError::Other(format!("Invalid priority: {e}").into()))?;

    let tags_json: String = row.get(5)?;
    let tags: Vec<String> = serde_json::from_str(&tags_json)
        .map_err(|e| FromSqlError::Other(format!("Invalid tags: {e}").into()))?;

    let due_date: Option<String> = row.get(6)?;
    let created_at: String = row.get(7)?;
    let updated_at: String = row.get(8)?;
    let started_at: Option<String> = row.get(9)?;

    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status,
        priority,
        tags,
        due_date: due_date.as_deref().map(parse_timestamp).transpose()?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
        started_at: started_at.as_deref().map(parse_timestamp).transpose()?,
        owner_id: row.get(10)?,
    })
}

const TASK_COLUMNS: &str = "id, title, description, status, priority, tags, \
                            due_date, created_at, updated_at, started_at, owner_id";

fn row_to_owner(row: &Row<'_>) -> rusqlite::Result<Owner> {
    let tasks_json: String = row.get(2)?;
    let tasks: Vec<String> = serde_json::from_str(&tasks_json)
        .map_err(|e| FromSqlError::Other(format!("Invalid owner task list: {e}").into()))?;

    Ok(Owner {
        id: row.get(0)?,
        username: row.get(1)?,
        tasks,
    })
}

#[async_trait]
impl TaskStore for SqliteStore {
    async fn insert_task(&self, new: NewTask) -> Result<Task, StoreError> {
        let conn = self.db.lock().unwrap();
        let now = Utc::now();

        let task = Task {
            id: uuid::Uuid::new_v4().to_string(),
            title: new.title,
            description: new.description,
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            tags: Vec::new(),
            due_date: None,
            created_at: now,
            updated_at: now,
            started_at: None,
            owner_id: None,
        };

        conn.execute(
            r#"
            INSERT INTO tasks (
                id, title, description, status, priority, tags,
                due_date, created_at, updated_at, started_at, owner_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                &task.id,
                &task.title,
                &task.description,
                task.status.as_str(),
                task.priority.as_str(),
                serde_json::to_string(&task.tags)
                    .map_err(|e| StoreError::Corrupt(e.to_string()))?,
                Option::<String>::None,
                task.created_at.to_rfc3339(),
                task.updated_at.to_rfc3339(),
                Option::<String>::None,
                Option::<String>::None,
            ],
        )?;

        Ok(task)
    }

    async fn find_task(&self, id: &str) -> Result<Option<Task>, StoreError> {
        let conn = self.db.lock().unwrap();

        let task = conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                row_to_task,
            )
            .optional()?;

        Ok(task)
    }

    async fn save_task(&self, task: &mut Task) -> Result<(), StoreError> {
        stamp_for_save(task);

        let conn = self.db.lock().unwrap();
        let changed = conn.execute(
            r#"
            UPDATE tasks
            SET title = ?2, description = ?3, status = ?4, priority = ?5,
                tags = ?6, due_date = ?7, updated_at = ?8, started_at = ?9,
                owner_id = ?10
            WHERE id = ?1
            "#,
            params![
                &task.id,
                &task.title,
                &task.description,
                task.status.as_str(),
                task.priority.as_str(),
                serde_json::to_string(&task.tags)
                    .map_err(|e| StoreError::Corrupt(e.to_string()))?,
                task.due_date.map(|d| d.to_rfc3339()),
                task.updated_at.to_rfc3339(),
                task.started_at.map(|d| d.to_rfc3339()),
                &task.owner_id,
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::Corrupt(format!(
                "task {} does not exist in the store",
                task.id
            )));
        }

        Ok(())
    }

    async fn find_owner(&self, username: &str) -> Result<Option<Owner>, StoreError> {
        let conn = self.db.lock().unwrap();

        let owner = conn
            .query_row(
                "SELECT id, username, tasks FROM owners WHERE username = ?1",
                params![username],
                row_to_owner,
            )
            .optional()?;

        Ok(owner)
    }

    async fn save_owner(&self, owner: &Owner) -> Result<(), StoreError> {
        let conn = self.db.lock().unwrap();

        let changed = conn.execute(
            "UPDATE owners SET username = ?2, tasks = ?3 WHERE id = ?1",
            params![
                &owner.id,
                &owner.username,
                serde_json::to_string(&owner.tasks)
                    .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::Corrupt(format!(
                "owner {} does not exist in the store",
                owner.id
            )));
        }

        Ok(())
    }

    async fn tasks_for_owner(&self, owner_id: &str) -> Result<Vec<Task>, StoreError> {
        let conn = self.db.lock().unwrap();

        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = ?1 \
             ORDER BY created_at ASC, rowid ASC"
        ))?;

        let tasks = stmt
            .query_map(params![owner_id], row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    async fn insert_owner(&self, username: &str) -> Result<Owner, StoreError> {
        let conn = self.db.lock().unwrap();

        let owner = Owner {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            tasks: Vec::new(),
        };

        conn.execute(
            "INSERT INTO owners (id, username, tasks) VALUES (?1, ?2, '[]')",
            params![&owner.id, &owner.username],
        )?;

        Ok(owner)
    }

    async fn remove_task(&self, id: &str) -> Result<(), StoreError> {
        let conn = self.db.lock().unwrap();

        let owner_id: Option<String> = conn
            .query_row(
                "SELECT owner_id FROM tasks WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?
            .flatten();

        conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;

        // Pull the id out of the owner's informational task list
        if let Some(owner_id) = owner_id {
            let owner = conn
                .query_row(
                    "SELECT id, username, tasks FROM owners WHERE id = ?1",
                    params![&owner_id],
                    row_to_owner,
                )
                .optional()?;

            if let Some(mut owner) = owner {
                owner.tasks.retain(|t| t != id);
                conn.execute(
                    "UPDATE owners SET tasks = ?2 WHERE id = ?1",
                    params![
                        &owner.id,
                        serde_json::to_string(&owner.tasks)
                            .map_err(|e| StoreError::Corrupt(e.to_string()))?,
                    ],
                )?;
            }
        }

        Ok(())
    }
}
